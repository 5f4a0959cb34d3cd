use chrono::{DateTime, NaiveDateTime, Utc};
use timeline_core::{Metrics, Record};

const SEPARATOR_WIDTH: usize = 80;
const HUMAN_FORMAT: &str = "%B %d, %Y at %I:%M %p";
/// ISO-8601 date-times without an offset; `%.f` also matches no fraction.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn separator() -> String {
    "─".repeat(SEPARATOR_WIDTH)
}

/// Header block written once when the output file is opened.
pub fn format_header(subject: &str, run_time: DateTime<Utc>) -> String {
    format!(
        "Tweets from @{subject}\nScraped on {run} UTC\n{sep}\n\n",
        subject = subject,
        run = run_time.format(HUMAN_FORMAT),
        sep = separator(),
    )
}

/// One record block: timestamp, blank, text, blank, metrics, separator, blank.
pub fn format_record(record: &Record) -> String {
    format!(
        "{time}\n\n{text}\n\n{metrics}\n{sep}\n\n",
        time = human_timestamp(record.timestamp()),
        text = record.text(),
        metrics = format_metrics(&record.metrics()),
        sep = separator(),
    )
}

pub fn format_metrics(metrics: &Metrics) -> String {
    format!(
        "{} Comments  •  {} Retweets  •  {} Likes  •  {} Views",
        metrics.comments, metrics.retweets, metrics.likes, metrics.views
    )
}

/// Renders an ISO-8601 timestamp in its own wall-clock time; anything else is returned raw.
pub fn human_timestamp(raw: &str) -> String {
    match parse_iso8601(raw) {
        Some(parsed) => parsed.format(HUMAN_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Parses an ISO-8601 date-time with or without an offset. Offset values
/// keep their own wall-clock time.
pub fn parse_iso8601(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
