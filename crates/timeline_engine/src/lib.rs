//! Timeline engine: browser binding, extraction, persistence and the harvest loop.
mod browser;
mod chrome;
mod classify;
mod extract;
mod filename;
mod format;
mod harvest;
mod login;
mod pacing;
mod persist;
mod scroll;
mod settings;
mod types;

pub use browser::{BrowserError, BrowserSession, PageElement};
pub use chrome::{ChromeElement, ChromeSession};
pub use classify::{count_digits, LabelClassifier, LabelRule, MetricClassifier};
pub use extract::RecordExtractor;
pub use filename::output_filename;
pub use format::{
    format_header, format_metrics, format_record, human_timestamp, parse_iso8601, separator,
};
pub use harvest::{Harvester, NullProgress, ProgressSink};
pub use login::{login, Credentials, LoginError};
pub use pacing::{Pacer, RandomPacer};
pub use persist::{ensure_output_dir, IncrementalPersister, OutputSink, PersistError};
pub use scroll::{
    scroll_by_script, PageMetrics, ScrollController, EXTENT_SCRIPT, OFFSET_SCRIPT,
    VIEWPORT_SCRIPT,
};
pub use settings::{
    HarvestSettings, LoginSettings, PauseRange, SessionSettings, TimelineSelectors,
    DEFAULT_CHROME_ARGS, DEFAULT_USER_AGENTS,
};
pub use types::{
    system_clock, Clock, Extraction, Fallback, Field, HarvestOutcome, InvalidSubject, Subject,
};
