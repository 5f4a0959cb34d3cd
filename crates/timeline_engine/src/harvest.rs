use std::collections::VecDeque;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info, engine_trace, engine_warn};
use timeline_core::{update, Effect, HarvestState, Msg, PauseKind, Record, SeenSet, StopReason};
use tokio_util::sync::CancellationToken;

use crate::{
    system_clock, BrowserError, BrowserSession, Clock, HarvestOutcome, HarvestSettings,
    IncrementalPersister, MetricClassifier, Pacer, PauseRange, RandomPacer, RecordExtractor,
    ScrollController, Subject,
};

/// Receives human-readable status lines, at most once per scan.
pub trait ProgressSink {
    fn emit(&self, status: &str);
}

impl<F: Fn(&str)> ProgressSink for F {
    fn emit(&self, status: &str) {
        self(status)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _status: &str) {}
}

/// Per-run collaborators that live only as long as one `run` call.
struct RunContext {
    seen: SeenSet,
    records: Vec<Record>,
    persister: IncrementalPersister,
}

/// Drives one browser session through the harvest state machine.
pub struct Harvester<S: BrowserSession> {
    session: S,
    settings: HarvestSettings,
    extractor: RecordExtractor,
    scroll: ScrollController,
    pacer: Box<dyn Pacer>,
    clock: Clock,
    cancel: CancellationToken,
}

impl<S: BrowserSession> Harvester<S> {
    pub fn new(session: S, settings: HarvestSettings) -> Self {
        let extractor = RecordExtractor::new(settings.selectors.clone());
        let scroll = ScrollController::new(&settings);
        Self {
            session,
            settings,
            extractor,
            scroll,
            pacer: Box::new(RandomPacer),
            clock: system_clock(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Clock used for the run timestamp and timestamp fallbacks.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.extractor = self.extractor.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn MetricClassifier>) -> Self {
        self.extractor = self.extractor.with_classifier(classifier);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Closes the browser session.
    pub fn close(mut self) -> Result<(), BrowserError> {
        self.session.close()
    }

    /// Harvests `subject`'s timeline until the feed ends, the run is
    /// cancelled, or the driver fails. Records are written to disk as they
    /// are accepted, so the returned list is already persisted.
    pub fn run(&mut self, subject: &Subject, progress: &dyn ProgressSink) -> HarvestOutcome {
        let mut persister =
            IncrementalPersister::new(self.settings.output_dir.clone(), self.clock.clone());
        if let Err(err) = persister.initialize(subject) {
            engine_error!("Output file unavailable, records will not be saved: {}", err);
        }
        let mut run = RunContext {
            seen: SeenSet::new(),
            records: Vec::new(),
            persister,
        };

        let initial = HarvestState::new(self.settings.retry_ceiling);
        let (mut state, effects) = update(initial, Msg::Start);
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            if self.cancel.is_cancelled() && !state.is_done() {
                engine_info!("Interrupted; stopping harvest");
                queue.clear();
                let (next, effects) = update(state, Msg::CancelRequested);
                state = next;
                queue.extend(effects);
                continue;
            }

            let msg = match effect {
                Effect::LoadTimeline => self.load_timeline(subject),
                Effect::Scan => {
                    engine_logging::set_scan_iteration(state.scans() + 1);
                    self.scan(&mut run)
                }
                Effect::ReportProgress => {
                    progress.emit(&state.view().status_text());
                    continue;
                }
                Effect::Scroll => Msg::ScrollAttempted {
                    progressed: self.scroll.advance(&self.session, self.pacer.as_ref()),
                },
                Effect::Pause(kind) => {
                    self.pacer.pause(self.pause_range(kind));
                    continue;
                }
                Effect::Finish(reason) => {
                    if reason == StopReason::EmptyProfile {
                        progress.emit(&state.view().status_text());
                    }
                    continue;
                }
            };

            let (next, effects) = update(state, msg);
            state = next;
            queue.extend(effects);
        }
        engine_logging::set_scan_iteration(0);

        let stop = state.stop_reason().unwrap_or(StopReason::DriverError);
        let saved = run.persister.saved();
        let output_path = run.persister.close();
        match stop {
            StopReason::Cancelled => engine_info!("Harvest interrupted after {} records", saved),
            StopReason::DriverError => engine_error!("Harvest aborted after {} records", saved),
            reason => engine_info!("Harvest finished ({}): {} records saved", reason, saved),
        }

        HarvestOutcome {
            records: run.records,
            saved,
            output_path,
            stop,
        }
    }

    fn load_timeline(&mut self, subject: &Subject) -> Msg {
        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), subject);
        engine_info!("Opening {}", url);
        if let Err(err) = self.session.navigate(&url) {
            engine_error!("Navigation to {} failed: {}", url, err);
            return Msg::DriverFailed;
        }

        match self
            .session
            .wait_for(&self.settings.selectors.item, self.settings.load_timeout())
        {
            Ok(_) => Msg::TimelineReady,
            Err(BrowserError::Timeout { .. }) => {
                engine_warn!("No tweets found on profile {}", subject);
                Msg::TimelineMissing
            }
            Err(err) => {
                engine_warn!("Timeline for {} never rendered: {}", subject, err);
                Msg::TimelineMissing
            }
        }
    }

    fn scan(&mut self, run: &mut RunContext) -> Msg {
        let items = match self.session.find_all(&self.settings.selectors.item) {
            Ok(items) => items,
            Err(err) => {
                engine_warn!("Item query failed: {}", err);
                Vec::new()
            }
        };
        let extent = match self.scroll.page_extent(&self.session) {
            Ok(extent) => Some(extent),
            Err(err) => {
                engine_warn!("Page extent unavailable: {}", err);
                None
            }
        };

        let visible = items.len();
        let mut accepted = 0;
        for item in &items {
            let Some(extraction) = self.extractor.extract(item) else {
                engine_trace!("Skipped item without text");
                continue;
            };
            for fallback in &extraction.fallbacks {
                engine_trace!("{:?} defaulted: {}", fallback.field, fallback.reason);
            }

            let record = extraction.record;
            if !run.seen.admit(&record) {
                continue;
            }
            accepted += 1;
            if let Err(err) = run.persister.append(&record) {
                engine_warn!("Record {} not saved: {}", record.id(), err);
            }
            run.records.push(record);
        }

        engine_debug!(
            "{} visible, {} new, extent {:?}, {} total",
            visible,
            accepted,
            extent,
            run.records.len()
        );
        Msg::ScanCompleted {
            visible,
            accepted,
            extent,
        }
    }

    fn pause_range(&self, kind: PauseKind) -> PauseRange {
        match kind {
            PauseKind::InitialSettle => self.settings.initial_settle,
            PauseKind::Rescan => self.settings.rescan_pause,
            PauseKind::ScrollRetry => self.settings.scroll_retry_pause,
        }
    }
}
