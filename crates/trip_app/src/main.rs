mod app;
mod cli;
mod commands;
mod config;
mod effects;
mod render;

use std::io;
use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use trip_logging::{trip_info, LogDestination};

use crate::app::{spawn_stdin_reader, App};
use crate::cli::Args;
use crate::effects::EffectRunner;

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args);

    let cwd = std::env::current_dir().context("could not determine working directory")?;
    let config = config::load(&args, &cwd)?;
    trip_info!(
        "trip-planner starting: api={} output={:?}",
        config.client.base_url,
        config.output_dir
    );

    let (input_tx, input_rx) = mpsc::channel();
    let interactive = !args.no_chat;
    if interactive {
        spawn_stdin_reader(input_tx)?;
    } else {
        drop(input_tx);
    }

    let runner = EffectRunner::new(config.engine_config());
    let app = App::new(runner, args.preferences(), interactive, io::stdout())
        .with_plan_links(&config.client.base_url);
    let succeeded = app.run(input_rx)?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// The terminal only gets log lines below warning level when `-v` is given,
/// so they do not interleave with the transcript.
fn init_logging(args: &Args) {
    let level = args.log_level();
    match &args.log_file {
        Some(path) if args.verbose > 0 => {
            trip_logging::initialize(LogDestination::Both(path.clone()), level);
        }
        Some(path) => {
            trip_logging::initialize(LogDestination::File(path.clone()), level);
        }
        None => {
            let level = if args.verbose == 0 {
                LevelFilter::Warn
            } else {
                level
            };
            trip_logging::initialize(LogDestination::Terminal, level);
        }
    }
}
