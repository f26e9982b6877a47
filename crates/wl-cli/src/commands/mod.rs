//! CLI subcommand implementations.

pub mod best;
pub mod exercises;
pub mod history;
pub mod import;
pub mod log;
pub mod session;
pub mod util;
pub mod workouts;
