use std::fmt;

use crate::view_model::HarvestView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Scanning,
    Scrolling,
    Done(StopReason),
}

/// Why a harvest run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No timeline item rendered within the load bound.
    EmptyProfile,
    /// Consecutive scans found no items at all.
    NoItems,
    /// Consecutive scans saw the page extent unchanged.
    NoGrowth,
    /// Every scroll attempt in one scrolling phase failed to move the page.
    ScrollStalled,
    Cancelled,
    DriverError,
}

impl StopReason {
    /// Feed exhaustion and empty profiles are normal endings.
    pub fn is_exhaustion(self) -> bool {
        matches!(
            self,
            StopReason::EmptyProfile
                | StopReason::NoItems
                | StopReason::NoGrowth
                | StopReason::ScrollStalled
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyProfile => write!(f, "no tweets found on profile"),
            StopReason::NoItems => write!(f, "no items rendered after repeated scans"),
            StopReason::NoGrowth => write!(f, "page stopped growing"),
            StopReason::ScrollStalled => write!(f, "scrolling made no progress"),
            StopReason::Cancelled => write!(f, "interrupted by user"),
            StopReason::DriverError => write!(f, "browser driver error"),
        }
    }
}

/// Per-run counters. Created fresh for every run and never reset mid-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestState {
    phase: Phase,
    retry_ceiling: u32,
    empty_scans: u32,
    no_growth_scans: u32,
    scroll_attempts: u32,
    last_extent: Option<u64>,
    accepted: usize,
    scans: u64,
}

impl Default for HarvestState {
    fn default() -> Self {
        Self::new(3)
    }
}

impl HarvestState {
    /// A ceiling of 0 is treated as 1.
    pub fn new(retry_ceiling: u32) -> Self {
        Self {
            phase: Phase::Loading,
            retry_ceiling: retry_ceiling.max(1),
            empty_scans: 0,
            no_growth_scans: 0,
            scroll_attempts: 0,
            last_extent: None,
            accepted: 0,
            scans: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn retry_ceiling(&self) -> u32 {
        self.retry_ceiling
    }

    pub fn empty_scans(&self) -> u32 {
        self.empty_scans
    }

    pub fn no_growth_scans(&self) -> u32 {
        self.no_growth_scans
    }

    pub fn scroll_attempts(&self) -> u32 {
        self.scroll_attempts
    }

    pub fn last_extent(&self) -> Option<u64> {
        self.last_extent
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            Phase::Done(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    pub fn view(&self) -> HarvestView {
        HarvestView {
            phase: self.phase,
            accepted: self.accepted,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn finish(&mut self, reason: StopReason) {
        self.phase = Phase::Done(reason);
    }

    pub(crate) fn begin_scan(&mut self) {
        self.scans += 1;
    }

    /// Returns `true` once the empty-scan ceiling is reached.
    pub(crate) fn note_empty_scan(&mut self) -> bool {
        self.empty_scans += 1;
        self.empty_scans >= self.retry_ceiling
    }

    /// New records count as progress: both counters restart and a readable
    /// extent becomes the new baseline.
    pub(crate) fn note_accepted(&mut self, accepted: usize, extent: Option<u64>) {
        if accepted > 0 {
            self.empty_scans = 0;
            self.no_growth_scans = 0;
            if extent.is_some() {
                self.last_extent = extent;
            }
            self.accepted += accepted;
        } else {
            self.empty_scans += 1;
        }
    }

    /// Compares `extent` with the previous scan. Returns `true` once the
    /// no-growth ceiling is reached. An unreadable extent counts as unchanged.
    pub(crate) fn note_extent(&mut self, extent: Option<u64>) -> bool {
        match extent {
            Some(current) if self.last_extent != Some(current) => {
                self.no_growth_scans = 0;
                self.last_extent = Some(current);
                false
            }
            _ => {
                self.no_growth_scans += 1;
                self.no_growth_scans >= self.retry_ceiling
            }
        }
    }

    pub(crate) fn reset_scroll_attempts(&mut self) {
        self.scroll_attempts = 0;
    }

    /// Returns `true` once the scroll retry ceiling is reached.
    pub(crate) fn note_failed_scroll(&mut self) -> bool {
        self.scroll_attempts += 1;
        self.scroll_attempts >= self.retry_ceiling
    }
}
