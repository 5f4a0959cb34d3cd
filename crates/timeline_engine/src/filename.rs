use chrono::{DateTime, Utc};

const MAX_SUBJECT_LEN: usize = 64;

/// Filesystem-safe output name: `{subject}_tweets_{YYYYmmdd_HHMMSS}.txt`.
pub fn output_filename(subject: &str, run_time: DateTime<Utc>) -> String {
    format!(
        "{}_tweets_{}.txt",
        sanitize_subject(subject),
        run_time.format("%Y%m%d_%H%M%S")
    )
}

fn sanitize_subject(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "profile".to_string();
    }
    if cleaned.chars().count() > MAX_SUBJECT_LEN {
        cleaned = cleaned.chars().take(MAX_SUBJECT_LEN).collect();
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}
