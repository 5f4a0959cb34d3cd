use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use timeline_core::{MetricKind, Record, StopReason};

/// Wall-clock source, injected so tests can pin "now".
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Profile handle whose timeline is harvested. Never empty, no leading `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subject identifier must not be empty")]
pub struct InvalidSubject;

impl Subject {
    pub fn new(raw: &str) -> Result<Self, InvalidSubject> {
        let trimmed = raw.trim().trim_start_matches('@').trim();
        if trimmed.is_empty() {
            return Err(InvalidSubject);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Timestamp,
    Metric(MetricKind),
    /// A grouped engagement control that could not be read at all.
    MetricControl,
}

/// A field that was defaulted during extraction, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub field: Field,
    pub reason: String,
}

impl Fallback {
    pub(crate) fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub record: Record,
    pub fallbacks: Vec<Fallback>,
}

impl Extraction {
    pub fn defaulted(&self, field: Field) -> bool {
        self.fallbacks.iter().any(|fallback| fallback.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    /// Accepted records in acceptance order; each was handed to the persister.
    pub records: Vec<Record>,
    /// Records actually written to the output file.
    pub saved: usize,
    pub output_path: Option<PathBuf>,
    pub stop: StopReason,
}
