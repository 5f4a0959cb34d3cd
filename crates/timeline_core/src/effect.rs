use crate::StopReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Navigate to the subject's timeline and wait for the first item.
    LoadTimeline,
    /// Query visible items, extract, dedupe, persist, read the page extent.
    Scan,
    /// Send the current status line to the progress observer.
    ReportProgress,
    /// Advance the viewport once.
    Scroll,
    Pause(PauseKind),
    Finish(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseKind {
    /// After the first item appears, before the first scan.
    InitialSettle,
    /// Before re-scanning a screen that showed no items.
    Rescan,
    /// Between failed scroll attempts.
    ScrollRetry,
}
