use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::commands::history::HistoryFilter;
use wl_cli::commands::{best, exercises, history, import, log, session, workouts};
use wl_cli::{Cli, Commands, Config, ExercisesAction, SessionAction, WorkoutsAction};
use wl_core::SessionId;

/// Load config and open database, ensuring the parent directory exists.
///
/// A newly created database is seeded with the built-in exercises unless the
/// configuration turns that off.
fn open_database(config_path: Option<&Path>) -> Result<(wl_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let fresh = !config.database_path.exists();
    let mut db = wl_db::Database::open(&config.database_path).context("failed to open database")?;
    if fresh && config.seed_factory_defaults {
        let seeded = db
            .seed_factory_defaults()
            .context("failed to seed factory defaults")?;
        tracing::info!(?seeded, "seeded new database");
    }
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, _config) = open_database(cli.config.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Exercises(action) => match action {
            ExercisesAction::List { all } => exercises::list(&mut out, &db, *all)?,
            ExercisesAction::Add { name } => exercises::add(&mut out, &mut db, name)?,
            ExercisesAction::Archive { name, undo } => {
                exercises::archive(&mut out, &mut db, name, *undo)?;
            }
            ExercisesAction::Delete { name } => exercises::delete(&mut out, &mut db, name)?,
            ExercisesAction::Reset => exercises::reset(&mut out, &mut db)?,
        },
        Commands::Session(action) => match action {
            SessionAction::Start => session::start(&mut out, &mut db, Utc::now(), &Local)?,
            SessionAction::End => session::end(&mut out, &mut db, Utc::now())?,
            SessionAction::Show => session::show(&mut out, &mut db, Utc::now(), &Local)?,
        },
        Commands::Log {
            exercise,
            reps,
            weight,
        } => log::run(&mut out, &mut db, exercise, *reps, *weight, Utc::now())?,
        Commands::History {
            day,
            exercise,
            session,
            json,
        } => {
            let filter = match (day, exercise, session) {
                (Some(day), _, _) => HistoryFilter::Day(*day),
                (_, Some(name), _) => HistoryFilter::Exercise(name.clone()),
                (_, _, Some(id)) => HistoryFilter::Session(SessionId::new(*id)),
                (None, None, None) => HistoryFilter::All,
            };
            history::run(&mut out, &db, &filter, *json, &Local)?;
        }
        Commands::Best { exercise, json } => best::run(&mut out, &db, exercise, *json, &Local)?,
        Commands::Import { file } => {
            import::run(&mut out, &mut db, file, Local, Utc::now())?;
        }
        Commands::Workouts(action) => match action {
            WorkoutsAction::List => workouts::list(&mut out, &db)?,
            WorkoutsAction::Create { name } => workouts::create(&mut out, &mut db, name)?,
            WorkoutsAction::Add {
                workout,
                exercise,
                order,
            } => workouts::add(&mut out, &mut db, workout, exercise, *order)?,
            WorkoutsAction::Show { workout } => workouts::show(&mut out, &db, workout)?,
        },
    }

    Ok(())
}
