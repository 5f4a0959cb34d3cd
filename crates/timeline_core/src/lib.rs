//! Timeline core: records, deduplication and the pure harvest state machine.
mod dedupe;
mod effect;
mod msg;
mod record;
mod state;
mod update;
mod view_model;

pub use dedupe::SeenSet;
pub use effect::{Effect, PauseKind};
pub use msg::Msg;
pub use record::{MetricKind, Metrics, Record, RecordId};
pub use state::{HarvestState, Phase, StopReason};
pub use update::update;
pub use view_model::HarvestView;
