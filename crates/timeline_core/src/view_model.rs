use crate::{Phase, StopReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestView {
    pub phase: Phase,
    pub accepted: usize,
}

impl HarvestView {
    /// Human-readable status line for the progress observer.
    pub fn status_text(&self) -> String {
        match self.phase {
            Phase::Loading => "Loading timeline...".to_string(),
            Phase::Scanning | Phase::Scrolling => {
                format!("Collecting tweets... ({} found)", self.accepted)
            }
            Phase::Done(StopReason::EmptyProfile) => {
                "No tweets found on profile. Please check the username.".to_string()
            }
            Phase::Done(reason) => format!("Finished: {} ({} saved)", reason, self.accepted),
        }
    }
}
