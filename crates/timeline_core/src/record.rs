use std::fmt;

use sha2::{Digest, Sha256};

/// Engagement counter kinds shown under a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Comments,
    Retweets,
    Likes,
    Views,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Comments => write!(f, "comments"),
            MetricKind::Retweets => write!(f, "retweets"),
            MetricKind::Likes => write!(f, "likes"),
            MetricKind::Views => write!(f, "views"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub comments: u64,
    pub retweets: u64,
    pub likes: u64,
    pub views: u64,
}

impl Metrics {
    pub fn get(&self, kind: MetricKind) -> u64 {
        match kind {
            MetricKind::Comments => self.comments,
            MetricKind::Retweets => self.retweets,
            MetricKind::Likes => self.likes,
            MetricKind::Views => self.views,
        }
    }

    pub fn set(&mut self, kind: MetricKind, value: u64) {
        match kind {
            MetricKind::Comments => self.comments = value,
            MetricKind::Retweets => self.retweets = value,
            MetricKind::Likes => self.likes = value,
            MetricKind::Views => self.views = value,
        }
    }
}

/// One extracted post. Immutable once built; `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    text: String,
    timestamp: String,
    metrics: Metrics,
}

impl Record {
    /// Returns `None` when `text` is empty after trimming.
    pub fn new(
        text: impl Into<String>,
        timestamp: impl Into<String>,
        metrics: Metrics,
    ) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            text,
            timestamp: timestamp.into(),
            metrics,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn id(&self) -> RecordId {
        RecordId::compute(&self.text, &self.timestamp)
    }
}

/// Content identity of a record: digest of the raw text followed by the raw timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn compute(text: &str, timestamp: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(timestamp.as_bytes());
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(32);
        for byte in digest.iter().take(16) {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(Record::new("   \n", "2024-01-01T00:00:00Z", Metrics::default()).is_none());
        assert!(Record::new("", "2024-01-01T00:00:00Z", Metrics::default()).is_none());
    }

    #[test]
    fn identity_ignores_metrics() {
        let a = Record::new("hello", "2024-01-01T00:00:00Z", Metrics::default()).unwrap();
        let b = Record::new(
            "hello",
            "2024-01-01T00:00:00Z",
            Metrics {
                likes: 9,
                ..Metrics::default()
            },
        )
        .unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id().as_str().len(), 32);
    }

    #[test]
    fn identity_depends_on_timestamp() {
        let a = RecordId::compute("hello", "2024-01-01T00:00:00Z");
        let b = RecordId::compute("hello", "2024-01-02T00:00:00Z");
        assert_ne!(a, b);
    }
}
