//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Workout log.
///
/// Records sets of exercises into training sessions and answers questions
/// about them: history by day, exercise or session, totals and personal bests.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage the exercise catalog.
    #[command(subcommand)]
    Exercises(ExercisesAction),

    /// Start, end or inspect the current session.
    #[command(subcommand)]
    Session(SessionAction),

    /// Record a set in the current session.
    Log {
        /// Exercise name; unknown names are added to the catalog.
        exercise: String,

        /// Number of repetitions.
        #[arg(allow_negative_numbers = true)]
        reps: i64,

        /// Weight in kilograms.
        #[arg(allow_negative_numbers = true)]
        weight: f64,
    },

    /// Show logged sets, most recent first.
    History {
        /// Only sets logged on this local date (YYYY-MM-DD).
        #[arg(long, conflicts_with_all = ["exercise", "session"])]
        day: Option<NaiveDate>,

        /// Only sets of this exercise.
        #[arg(long, conflicts_with = "session")]
        exercise: Option<String>,

        /// Only sets from this session, in the order they were logged.
        #[arg(long)]
        session: Option<i64>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the all-time heaviest set of an exercise.
    Best {
        exercise: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Import sets from an exported CSV file.
    Import {
        /// CSV file with a header row.
        file: PathBuf,
    },

    /// Manage workout templates.
    #[command(subcommand)]
    Workouts(WorkoutsAction),
}

#[derive(Debug, Subcommand)]
pub enum ExercisesAction {
    /// List exercises by name.
    List {
        /// Include archived exercises.
        #[arg(long)]
        all: bool,
    },
    /// Add a user-defined exercise.
    Add { name: String },
    /// Hide an exercise from the default list.
    Archive {
        name: String,

        /// Restore an archived exercise.
        #[arg(long)]
        undo: bool,
    },
    /// Delete an exercise together with its logged sets.
    Delete { name: String },
    /// Remove every user-defined exercise and its sets.
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum SessionAction {
    /// Start a new session, ending any open one.
    Start,
    /// End the open session.
    End,
    /// Show the open session's sets and per-exercise totals.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum WorkoutsAction {
    /// List workout templates.
    List,
    /// Create an empty workout template.
    Create { name: String },
    /// Add an exercise to a workout template.
    Add {
        workout: String,
        exercise: String,

        /// Position within the workout.
        #[arg(long, default_value_t = 0)]
        order: u32,
    },
    /// Show a workout's exercises in order.
    Show { workout: String },
}
