#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use timeline_engine::{
    BrowserError, BrowserSession, Clock, PageElement, Pacer, PauseRange, TimelineSelectors,
    EXTENT_SCRIPT, OFFSET_SCRIPT, VIEWPORT_SCRIPT,
};

pub const VIEWPORT: f64 = 800.0;

pub fn fixed_clock() -> Clock {
    Arc::new(|| Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
}

/// Advances one second on every call, like a real clock between scans.
pub fn ticking_clock() -> Clock {
    let ticks = AtomicI64::new(0);
    Arc::new(move || {
        let start = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        start + chrono::Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst))
    })
}

pub type EventLog = Rc<RefCell<Vec<String>>>;

/// In-memory element tree. Children are keyed by the selector that finds them.
#[derive(Clone, Default)]
pub struct FakeElement {
    name: String,
    text: Option<String>,
    attrs: HashMap<String, String>,
    children: Vec<(String, FakeElement)>,
    broken: Vec<String>,
    reads: Rc<Cell<usize>>,
    events: EventLog,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, selector: &str, child: FakeElement) -> Self {
        self.children.push((selector.to_string(), child));
        self
    }

    /// Queries for `selector` on this element fail with a protocol error.
    pub fn broken(mut self, selector: &str) -> Self {
        self.broken.push(selector.to_string());
        self
    }

    /// Shares one read counter across this element and all its descendants.
    pub fn share_reads(mut self, reads: Rc<Cell<usize>>) -> Self {
        self.reads = reads.clone();
        self.children = self
            .children
            .into_iter()
            .map(|(selector, child)| (selector, child.share_reads(reads.clone())))
            .collect();
        self
    }

    pub fn log_to(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    /// Number of `text()` calls on this tree.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl PageElement for FakeElement {
    fn find(&self, selector: &str) -> Result<Option<Self>, BrowserError> {
        Ok(self.find_all(selector)?.into_iter().next())
    }

    fn find_all(&self, selector: &str) -> Result<Vec<Self>, BrowserError> {
        if self.broken.iter().any(|s| s == selector) {
            return Err(BrowserError::Protocol(format!("node detached: {selector}")));
        }
        Ok(self
            .children
            .iter()
            .filter(|(key, _)| key == selector)
            .map(|(_, child)| child.clone())
            .collect())
    }

    fn text(&self) -> Result<Option<String>, BrowserError> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.text.clone())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.attrs.get(name).cloned())
    }

    fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        self.events
            .borrow_mut()
            .push(format!("{} <- {}", self.name, text));
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        self.events
            .borrow_mut()
            .push(format!("{} <- [{}]", self.name, key));
        Ok(())
    }
}

/// A timeline item laid out with the default selectors.
pub fn tweet(text: &str, datetime: &str, labels: &[&str], views: Option<&str>) -> FakeElement {
    let selectors = TimelineSelectors::default();

    let mut group = FakeElement::new();
    for label in labels {
        group = group.child(
            &selectors.metric_control,
            FakeElement::new().attr(&selectors.label_attribute, label),
        );
    }

    let mut item = FakeElement::new()
        .child(&selectors.text, FakeElement::new().text(text))
        .child(
            &selectors.time,
            FakeElement::new().attr(&selectors.time_attribute, datetime),
        )
        .child(&selectors.metric_group, group);
    if let Some(views) = views {
        item = item.child(
            &selectors.analytics,
            FakeElement::new().attr(&selectors.label_attribute, views),
        );
    }
    item.share_reads(Rc::new(Cell::new(0)))
}

pub fn simple_tweet(n: usize) -> FakeElement {
    tweet(
        &format!("tweet number {n}"),
        &format!("2024-03-0{}T10:00:00.000Z", 1 + n % 5),
        &["3 Replies. Reply", "1 repost. Repost", "12 Likes. Like"],
        Some("250 views. View post analytics"),
    )
}

/// What the page renders while the scroll offset is at or past `min_offset`.
#[derive(Clone)]
pub struct Frame {
    pub min_offset: f64,
    pub extent: f64,
    pub items: Vec<FakeElement>,
}

impl Frame {
    pub fn new(min_offset: f64, extent: f64, items: Vec<FakeElement>) -> Self {
        Self {
            min_offset,
            extent,
            items,
        }
    }
}

/// Scripted page: the visible frame follows the scroll offset.
pub struct FakePage {
    frames: Vec<Frame>,
    offset: Cell<f64>,
    item_selector: String,
    fixed: HashMap<String, FakeElement>,
    fail_navigation: bool,
    pub visited: Vec<String>,
    pub closed: bool,
}

impl FakePage {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            offset: Cell::new(0.0),
            item_selector: TimelineSelectors::default().item,
            fixed: HashMap::new(),
            fail_navigation: false,
            visited: Vec::new(),
            closed: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![Frame::new(0.0, VIEWPORT, Vec::new())])
    }

    /// An element that `wait_for`/`find_all` always return for `selector`.
    pub fn with_element(mut self, selector: &str, element: FakeElement) -> Self {
        self.fixed.insert(selector.to_string(), element);
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn offset(&self) -> f64 {
        self.offset.get()
    }

    fn frame(&self) -> &Frame {
        let offset = self.offset.get();
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.min_offset <= offset)
            .unwrap_or(&self.frames[0])
    }

    fn scroll_by(&self, pixels: f64) {
        let max = (self.frame().extent - VIEWPORT).max(0.0);
        let next = (self.offset.get() + pixels).clamp(0.0, max);
        self.offset.set(next);
    }
}

impl BrowserSession for FakePage {
    type Element = FakeElement;

    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.fail_navigation {
            return Err(BrowserError::Protocol("net::ERR_CONNECTION_RESET".into()));
        }
        self.visited.push(url.to_string());
        Ok(())
    }

    fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, BrowserError> {
        if selector == self.item_selector {
            return Ok(self.frame().items.clone());
        }
        Ok(self.fixed.get(selector).cloned().into_iter().collect())
    }

    fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        match script {
            EXTENT_SCRIPT => Ok(json!(self.frame().extent)),
            VIEWPORT_SCRIPT => Ok(json!(VIEWPORT)),
            OFFSET_SCRIPT => Ok(json!(self.offset.get())),
            other => {
                let pixels = other
                    .strip_prefix("window.scrollBy(0, ")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .and_then(|n| n.parse::<f64>().ok())
                    .ok_or_else(|| BrowserError::Script(format!("unknown script {other}")))?;
                self.scroll_by(pixels);
                Ok(Value::Null)
            }
        }
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<FakeElement, BrowserError> {
        self.find(selector)?.ok_or_else(|| BrowserError::Timeout {
            selector: selector.to_string(),
            timeout,
        })
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        Ok(())
    }
}

/// Pacer that never sleeps; counts pauses and records the ranges it saw.
#[derive(Clone, Default)]
pub struct NoPause {
    pub ranges: Rc<RefCell<Vec<PauseRange>>>,
}

impl Pacer for NoPause {
    fn pause(&self, range: PauseRange) {
        self.ranges.borrow_mut().push(range);
    }
}

/// Pacer that fires `action` once, on its `after`-th pause.
pub struct TriggerPause<F: Fn()> {
    pub after: usize,
    pub count: Cell<usize>,
    pub action: F,
}

impl<F: Fn()> TriggerPause<F> {
    pub fn new(after: usize, action: F) -> Self {
        Self {
            after,
            count: Cell::new(0),
            action,
        }
    }
}

impl<F: Fn()> Pacer for TriggerPause<F> {
    fn pause(&self, _range: PauseRange) {
        let count = self.count.get() + 1;
        self.count.set(count);
        if count == self.after {
            (self.action)();
        }
    }
}
