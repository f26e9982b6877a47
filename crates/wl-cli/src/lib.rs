//! Workout log CLI library.
//!
//! This crate provides the CLI interface for the workout log.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ExercisesAction, SessionAction, WorkoutsAction};
pub use config::Config;
