use crate::app::{App, Session, UnrecoverableError};
use crate::args::{Args, Command, Parser};
use crate::notification::{Bell, SilentBell, SoundBell};
use crate::form::Form;
use crate::segment::SegmentName;
use crate::store::{load_defaults, FileStore, TimerDefaults};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod args;
mod event;
mod form;
mod notification;
mod segment;
mod sequencer;
mod store;
mod tui;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), UnrecoverableError> {
    let command = args.command.unwrap_or(Command::Pray);
    let mut store = FileStore::open(args.store.unwrap_or_else(store::default_store_path));

    match command {
        Command::Pray => {
            let log_file = args
                .log_file
                .unwrap_or_else(|| store::config_dir().join("lectio.log"));
            init_file_logging(&log_file)?;

            let defaults = load_defaults(&store)?;
            info!(store = %store.path().display(), "opening timer");

            let bell: Arc<dyn Bell> = if args.mute {
                Arc::new(SilentBell)
            } else {
                Arc::new(SoundBell)
            };
            let session = Session::new(&defaults, store, bell).desktop_notifications(!args.no_notify);

            App::new(session)?.run().await
        }
        Command::Show => {
            init_stderr_logging();
            print_defaults(&load_defaults(&store)?);
            Ok(())
        }
        Command::Set {
            lectio,
            meditatio,
            oratio,
            contemplatio,
            enable_lectio,
            enable_contemplatio,
        } => {
            init_stderr_logging();
            let mut form = Form::from_defaults(&load_defaults(&store)?);

            let inputs = [lectio, meditatio, oratio, contemplatio];
            for (name, input) in SegmentName::ALL.into_iter().zip(inputs) {
                if let Some(input) = input {
                    let _ = form.set_input(name, &input);
                }
            }
            if let Some(enabled) = enable_lectio {
                let _ = form.set_enabled(SegmentName::Lectio, enabled);
            }
            if let Some(enabled) = enable_contemplatio {
                let _ = form.set_enabled(SegmentName::Contemplatio, enabled);
            }

            form.persist(&mut store)?;
            info!(store = %store.path().display(), "saved defaults");
            print_defaults(&form.defaults());
            Ok(())
        }
        Command::Schedule => {
            init_stderr_logging();
            let defaults = load_defaults(&store)?;

            for entry in sequencer::schedule(&defaults.enabled_segments()) {
                println!(
                    "{:<13} bell at {:>6}{}",
                    entry.segment.to_string(),
                    tui::format_remaining(entry.offset),
                    if entry.is_final { "  (final)" } else { "" }
                );
            }
            Ok(())
        }
    }
}

fn print_defaults(defaults: &TimerDefaults) {
    for segment in defaults.segments() {
        let state = match (segment.name.is_optional(), segment.enabled) {
            (false, _) => "",
            (true, true) => "  enabled",
            (true, false) => "  disabled",
        };
        println!(
            "{:<13} {:>3} min{state}",
            segment.name.to_string(),
            segment.duration.get()
        );
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// The terminal ui owns stdout, so logs go to a file while it is open.
fn init_file_logging(path: &Path) -> Result<(), UnrecoverableError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| UnrecoverableError::LogFile(path.to_path_buf(), e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| UnrecoverableError::LogFile(path.to_path_buf(), e))?;

    // a subscriber may already be installed; keep that one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(())
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .try_init();
}
