use std::sync::Arc;

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use timeline_core::StopReason;
use timeline_engine::{login, ChromeSession, HarvestOutcome, Harvester, RandomPacer, Subject};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::config::AppConfig;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    cli.apply_overrides(&mut config);
    let subject = Subject::new(&cli.subject)?;
    let credentials = cli.credentials()?;

    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?,
    );
    let cancel = CancellationToken::new();
    watch_interrupt(&runtime, cancel.clone());

    let mut session = ChromeSession::launch(runtime.clone(), &config.session)
        .context("failed to launch browser")?;
    if let Some(credentials) = &credentials {
        login(&mut session, credentials, &config.session.login, &RandomPacer)
            .context("login failed")?;
    }

    engine_info!("Harvesting @{}", subject);
    let mut harvester = Harvester::new(session, config.harvest).with_cancel_token(cancel);
    let progress = |status: &str| eprintln!("{status}");
    let outcome = harvester.run(&subject, &progress);
    if let Err(err) = harvester.close() {
        engine_warn!("Browser did not close cleanly: {}", err);
    }

    println!("{}", summary(&outcome));
    if outcome.stop == StopReason::DriverError {
        bail!("harvest aborted: {}", outcome.stop);
    }
    Ok(())
}

/// Exit status after a second interrupt (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Finish the current step, keep what was saved.
    Stop,
    /// The user asked twice; do not wait for the browser.
    ForceQuit,
}

fn interrupt_action(count: u32) -> Interrupt {
    if count <= 1 {
        Interrupt::Stop
    } else {
        Interrupt::ForceQuit
    }
}

fn watch_interrupt(runtime: &Runtime, cancel: CancellationToken) {
    runtime.spawn(async move {
        let mut count = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            count += 1;
            match interrupt_action(count) {
                Interrupt::Stop => {
                    engine_warn!("Interrupt received; stopping after the current step");
                    engine_warn!("Press Ctrl-C again to quit immediately");
                    cancel.cancel();
                }
                Interrupt::ForceQuit => {
                    engine_warn!("Second interrupt; quitting");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
    });
}

fn summary(outcome: &HarvestOutcome) -> String {
    let found = outcome.records.len();
    if found == 0 {
        return "No tweets were found".to_string();
    }

    let mut text = match &outcome.output_path {
        Some(path) => format!("Saved {} tweets to {}", outcome.saved, path.display()),
        None => format!("Found {found} tweets but no output file could be created"),
    };
    let unsaved = found.saturating_sub(outcome.saved);
    if unsaved > 0 && outcome.output_path.is_some() {
        text.push_str(&format!(" ({unsaved} of {found} could not be written)"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use timeline_core::{Metrics, Record};

    fn outcome(found: usize, saved: usize, output_path: Option<PathBuf>) -> HarvestOutcome {
        let records = (0..found)
            .map(|n| {
                Record::new(format!("post {n}"), "2024-02-10T08:15:00Z", Metrics::default())
            })
            .collect::<Option<Vec<_>>>()
            .unwrap();
        HarvestOutcome {
            records,
            saved,
            output_path,
            stop: StopReason::NoGrowth,
        }
    }

    #[test]
    fn summary_reports_count_and_path() {
        let text = summary(&outcome(12, 12, Some(PathBuf::from("data/tweets/a.txt"))));
        assert_eq!(text, "Saved 12 tweets to data/tweets/a.txt");
    }

    #[test]
    fn summary_for_nothing_found() {
        let text = summary(&outcome(0, 0, Some(PathBuf::from("data/tweets/a.txt"))));
        assert_eq!(text, "No tweets were found");
    }

    #[test]
    fn summary_for_unwritable_output() {
        let text = summary(&outcome(4, 0, None));
        assert_eq!(text, "Found 4 tweets but no output file could be created");
    }

    #[test]
    fn summary_counts_failed_writes() {
        let text = summary(&outcome(5, 3, Some(PathBuf::from("out/a.txt"))));
        assert_eq!(text, "Saved 3 tweets to out/a.txt (2 of 5 could not be written)");
    }

    #[test]
    fn second_interrupt_forces_exit() {
        assert_eq!(interrupt_action(1), Interrupt::Stop);
        assert_eq!(interrupt_action(2), Interrupt::ForceQuit);
        assert_eq!(interrupt_action(3), Interrupt::ForceQuit);
    }
}
