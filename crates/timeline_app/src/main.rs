mod cli;
mod config;
mod run;

use clap::Parser;
use engine_logging::LogDestination;
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(LogDestination::Both, level, &cli.log_file);
    run::run(cli)
}
