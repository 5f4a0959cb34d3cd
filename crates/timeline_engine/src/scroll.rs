use engine_logging::{engine_debug, engine_warn};
use serde_json::Value;

use crate::{BrowserError, BrowserSession, HarvestSettings, Pacer, PauseRange};

pub const EXTENT_SCRIPT: &str = "document.documentElement.scrollHeight";
pub const VIEWPORT_SCRIPT: &str = "window.innerHeight";
pub const OFFSET_SCRIPT: &str = "window.pageYOffset";

pub fn scroll_by_script(pixels: f64) -> String {
    format!("window.scrollBy(0, {pixels})")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub viewport: f64,
    pub extent: f64,
    pub offset: f64,
}

/// Moves the viewport down in small, randomly paced steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollController {
    increment: f64,
    steps: u32,
    step_pause: PauseRange,
    settle_pause: PauseRange,
}

impl ScrollController {
    pub fn new(settings: &HarvestSettings) -> Self {
        Self {
            increment: settings.scroll_increment,
            steps: settings.scroll_steps.max(1),
            step_pause: settings.step_pause,
            settle_pause: settings.settle_pause,
        }
    }

    /// One advance. `true` when the offset moved down or the page grew;
    /// script failures count as no progress.
    pub fn advance<S: BrowserSession>(&self, session: &S, pacer: &dyn Pacer) -> bool {
        match self.try_advance(session, pacer) {
            Ok(progressed) => progressed,
            Err(err) => {
                engine_warn!("Scroll error: {}", err);
                false
            }
        }
    }

    pub fn measure<S: BrowserSession>(&self, session: &S) -> Result<PageMetrics, BrowserError> {
        Ok(PageMetrics {
            viewport: read_number(session, VIEWPORT_SCRIPT)?,
            extent: read_number(session, EXTENT_SCRIPT)?,
            offset: read_number(session, OFFSET_SCRIPT)?,
        })
    }

    /// Full scrollable height of the page, in pixels.
    pub fn page_extent<S: BrowserSession>(&self, session: &S) -> Result<u64, BrowserError> {
        let extent = read_number(session, EXTENT_SCRIPT)?;
        Ok(extent.max(0.0).round() as u64)
    }

    fn try_advance<S: BrowserSession>(
        &self,
        session: &S,
        pacer: &dyn Pacer,
    ) -> Result<bool, BrowserError> {
        let before = self.measure(session)?;

        let distance = (before.viewport * self.increment).floor();
        let step = distance / f64::from(self.steps);
        for _ in 0..self.steps {
            session.evaluate(&scroll_by_script(step))?;
            pacer.pause(self.step_pause);
        }
        pacer.pause(self.settle_pause);

        let extent = read_number(session, EXTENT_SCRIPT)?;
        let offset = read_number(session, OFFSET_SCRIPT)?;
        engine_debug!(
            "Scrolled {}px: offset {} -> {}, extent {} -> {}",
            distance,
            before.offset,
            offset,
            before.extent,
            extent
        );
        Ok(offset > before.offset || extent > before.extent)
    }
}

fn read_number<S: BrowserSession>(session: &S, script: &str) -> Result<f64, BrowserError> {
    match session.evaluate(script)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| BrowserError::Script(format!("`{script}` returned {n}"))),
        other => Err(BrowserError::Script(format!(
            "`{script}` returned {other}, expected a number"
        ))),
    }
}
