use timeline_core::MetricKind;

/// Maps an engagement control's accessible label to the counter it shows.
///
/// The page markup and its wording change independently of this crate, so the
/// mapping is swappable per locale or markup version.
pub trait MetricClassifier: Send + Sync {
    /// Classifies a grouped engagement control by its label.
    fn classify(&self, label: &str) -> Option<MetricKind>;

    /// Whether the analytics control's label carries a view count.
    fn is_view_label(&self, label: &str) -> bool {
        label.to_lowercase().contains("view")
    }
}

/// Labels containing any of `needles` (case-insensitive) map to `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRule {
    pub needles: Vec<String>,
    pub kind: MetricKind,
}

impl LabelRule {
    pub fn new(kind: MetricKind, needles: &[&str]) -> Self {
        Self {
            needles: needles.iter().map(|n| n.to_lowercase()).collect(),
            kind,
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.needles.iter().any(|needle| lowered.contains(needle.as_str()))
    }
}

/// Ordered substring rules; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelClassifier {
    rules: Vec<LabelRule>,
    view_needle: String,
}

impl LabelClassifier {
    pub fn new(rules: Vec<LabelRule>, view_needle: &str) -> Self {
        Self {
            rules,
            view_needle: view_needle.to_lowercase(),
        }
    }
}

impl Default for LabelClassifier {
    /// English labels. "repl" precedes "like" so "Reply. 3 replies, liked"
    /// counts as comments.
    fn default() -> Self {
        Self::new(
            vec![
                LabelRule::new(MetricKind::Comments, &["repl"]),
                LabelRule::new(MetricKind::Retweets, &["repost", "retweet"]),
                LabelRule::new(MetricKind::Likes, &["like"]),
            ],
            "view",
        )
    }
}

impl MetricClassifier for LabelClassifier {
    fn classify(&self, label: &str) -> Option<MetricKind> {
        let lowered = label.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.kind)
    }

    fn is_view_label(&self, label: &str) -> bool {
        label.to_lowercase().contains(self.view_needle.as_str())
    }
}

/// Concatenates every ASCII digit in `label` into one count.
/// `None` when the label has no digits or the count overflows.
pub fn count_digits(label: &str) -> Option<u64> {
    let digits: String = label.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_follow_priority() {
        let classifier = LabelClassifier::default();
        assert_eq!(classifier.classify("12 Replies. Reply"), Some(MetricKind::Comments));
        assert_eq!(classifier.classify("5 reposts. Repost"), Some(MetricKind::Retweets));
        assert_eq!(classifier.classify("5 Retweets"), Some(MetricKind::Retweets));
        assert_eq!(classifier.classify("40 Likes. Like"), Some(MetricKind::Likes));
        assert_eq!(classifier.classify("3 replies, liked"), Some(MetricKind::Comments));
        assert_eq!(classifier.classify("Bookmark"), None);
    }

    #[test]
    fn digits_are_concatenated() {
        assert_eq!(count_digits("1,234 Likes"), Some(1234));
        assert_eq!(count_digits("Like"), None);
        assert_eq!(count_digits("99999999999999999999999 views"), None);
    }

    #[test]
    fn custom_rules_replace_english() {
        let classifier = LabelClassifier::new(
            vec![
                LabelRule::new(MetricKind::Comments, &["Antwort"]),
                LabelRule::new(MetricKind::Likes, &["gefällt"]),
            ],
            "aufrufe",
        );
        assert_eq!(classifier.classify("3 Antworten"), Some(MetricKind::Comments));
        assert_eq!(classifier.classify("7 Gefällt mir"), Some(MetricKind::Likes));
        assert!(classifier.is_view_label("120 Aufrufe"));
        assert!(!classifier.is_view_label("120 views"));
    }
}
