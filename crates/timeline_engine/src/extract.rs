use std::sync::Arc;

use chrono::SecondsFormat;
use engine_logging::engine_trace;
use timeline_core::{MetricKind, Metrics, Record};

use crate::{
    count_digits, parse_iso8601, system_clock, BrowserError, Clock, Extraction, Fallback, Field,
    LabelClassifier, MetricClassifier, PageElement, TimelineSelectors,
};

const GROUP_KINDS: [MetricKind; 3] = [
    MetricKind::Comments,
    MetricKind::Retweets,
    MetricKind::Likes,
];

/// Turns one rendered timeline item into a [`Record`].
///
/// - text comes from the primary text region, else the first language-tagged
///   region with non-blank text; no text means no record
/// - timestamp is the `time` element's raw `datetime` when it parses as
///   ISO-8601 (offset optional), else the clock's current time
/// - counters come from labelled engagement controls, defaulting to 0
///
/// Reads only; never fails past its boundary.
pub struct RecordExtractor {
    selectors: TimelineSelectors,
    classifier: Arc<dyn MetricClassifier>,
    clock: Clock,
}

impl RecordExtractor {
    pub fn new(selectors: TimelineSelectors) -> Self {
        Self {
            selectors,
            classifier: Arc::new(LabelClassifier::default()),
            clock: system_clock(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn MetricClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn extract<E: PageElement>(&self, item: &E) -> Option<Extraction> {
        let text = self.extract_text(item)?;
        let mut fallbacks = Vec::new();

        let timestamp = match self.extract_timestamp(item) {
            Ok(timestamp) => timestamp,
            Err(reason) => {
                fallbacks.push(Fallback::new(Field::Timestamp, reason));
                (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true)
            }
        };

        let metrics = self.extract_metrics(item, &mut fallbacks);
        let record = Record::new(text, timestamp, metrics)?;
        Some(Extraction { record, fallbacks })
    }

    fn extract_text<E: PageElement>(&self, item: &E) -> Option<String> {
        let primary = item
            .find(&self.selectors.text)
            .ok()
            .flatten()
            .and_then(|region| non_blank_text(&region));
        if primary.is_some() {
            return primary;
        }

        let regions = match item.find_all(&self.selectors.text_fallback) {
            Ok(regions) => regions,
            Err(err) => {
                engine_trace!("language-tagged regions unavailable: {}", err);
                return None;
            }
        };
        regions.iter().find_map(non_blank_text)
    }

    fn extract_timestamp<E: PageElement>(&self, item: &E) -> Result<String, String> {
        let time = item
            .find(&self.selectors.time)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("no `{}` element", self.selectors.time))?;
        let raw = time
            .attribute(&self.selectors.time_attribute)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("no `{}` attribute", self.selectors.time_attribute))?;
        let raw = raw.trim();
        if parse_iso8601(raw).is_none() {
            return Err(format!("unparsable `{raw}`"));
        }
        Ok(raw.to_string())
    }

    fn extract_metrics<E: PageElement>(
        &self,
        item: &E,
        fallbacks: &mut Vec<Fallback>,
    ) -> Metrics {
        let mut metrics = Metrics::default();
        let mut found = Vec::with_capacity(GROUP_KINDS.len());

        match item.find_all(&self.selectors.metric_group) {
            Ok(groups) => {
                for group in &groups {
                    if let Err(err) = self.scan_group(group, &mut metrics, &mut found, fallbacks) {
                        fallbacks.push(Fallback::new(Field::MetricControl, err.to_string()));
                    }
                }
            }
            Err(err) => fallbacks.push(Fallback::new(Field::MetricControl, err.to_string())),
        }

        for kind in GROUP_KINDS {
            if !found.contains(&kind) {
                fallbacks.push(Fallback::new(Field::Metric(kind), "no labelled control"));
            }
        }

        match self.read_views(item) {
            Ok(views) => metrics.views = views,
            Err(reason) => {
                fallbacks.push(Fallback::new(Field::Metric(MetricKind::Views), reason));
            }
        }

        metrics
    }

    fn scan_group<E: PageElement>(
        &self,
        group: &E,
        metrics: &mut Metrics,
        found: &mut Vec<MetricKind>,
        fallbacks: &mut Vec<Fallback>,
    ) -> Result<(), BrowserError> {
        for control in group.find_all(&self.selectors.metric_control)? {
            let label = match control.attribute(&self.selectors.label_attribute) {
                Ok(label) => label.unwrap_or_default(),
                Err(err) => {
                    fallbacks.push(Fallback::new(Field::MetricControl, err.to_string()));
                    continue;
                }
            };
            let Some(kind) = self.classifier.classify(&label) else {
                continue;
            };
            found.push(kind);
            match count_digits(&label) {
                Some(count) => metrics.set(kind, count),
                None => {
                    metrics.set(kind, 0);
                    fallbacks.push(Fallback::new(
                        Field::Metric(kind),
                        format!("no count in label `{label}`"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn read_views<E: PageElement>(&self, item: &E) -> Result<u64, String> {
        let control = item
            .find(&self.selectors.analytics)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| "no analytics control".to_string())?;
        let label = control
            .attribute(&self.selectors.label_attribute)
            .map_err(|err| err.to_string())?
            .unwrap_or_default();
        if !self.classifier.is_view_label(&label) {
            return Err(format!("analytics label `{label}` has no view count"));
        }
        count_digits(&label).ok_or_else(|| format!("no count in label `{label}`"))
    }
}

fn non_blank_text<E: PageElement>(element: &E) -> Option<String> {
    element
        .text()
        .ok()
        .flatten()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
