#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Run started; the profile still has to be opened.
    Start,
    /// At least one timeline item rendered within the load bound.
    TimelineReady,
    /// Nothing rendered within the load bound.
    TimelineMissing,
    /// The browser failed in a way retrying cannot fix (e.g. navigation).
    DriverFailed,
    /// A scan finished. `extent` is `None` when the page height could not be read.
    ScanCompleted {
        visible: usize,
        accepted: usize,
        extent: Option<u64>,
    },
    /// One scroll advance finished.
    ScrollAttempted { progressed: bool },
    /// External interrupt.
    CancelRequested,
}
