//! Browser capability consumed by the harvester.
//!
//! Every call blocks the calling thread until the browser answers or a bound
//! elapses. Element handles are only valid until the next render mutation, so
//! callers drop them before scrolling.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("browser protocol error: {0}")]
    Protocol(String),
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    Timeout { selector: String, timeout: Duration },
    #[error("browser session closed")]
    Closed,
}

/// One rendered element inside the page.
pub trait PageElement: Sized {
    /// First descendant matching `selector`, if any.
    fn find(&self, selector: &str) -> Result<Option<Self>, BrowserError>;

    fn find_all(&self, selector: &str) -> Result<Vec<Self>, BrowserError>;

    /// Rendered text of the element.
    fn text(&self) -> Result<Option<String>, BrowserError>;

    fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError>;

    fn type_text(&self, text: &str) -> Result<(), BrowserError>;

    /// Sends a single named key such as `"Enter"`.
    fn press_key(&self, key: &str) -> Result<(), BrowserError>;
}

/// A live page in a browser, exclusively owned by one harvest run.
pub trait BrowserSession {
    type Element: PageElement;

    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, BrowserError>;

    fn find(&self, selector: &str) -> Result<Option<Self::Element>, BrowserError> {
        Ok(self.find_all(selector)?.into_iter().next())
    }

    /// Evaluates a JavaScript expression. `undefined` results map to `Null`.
    fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// Waits until `selector` matches, failing with [`BrowserError::Timeout`].
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Self::Element, BrowserError>;

    fn close(&mut self) -> Result<(), BrowserError>;
}
