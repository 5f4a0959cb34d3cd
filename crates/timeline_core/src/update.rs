use crate::{Effect, HarvestState, Msg, PauseKind, Phase, StopReason};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not belong to the current phase are ignored. Once the
/// state is `Done`, every message is a no-op.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    if state.is_done() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Start => match state.phase() {
            Phase::Loading => vec![Effect::LoadTimeline],
            _ => Vec::new(),
        },
        Msg::TimelineReady => match state.phase() {
            Phase::Loading => {
                state.set_phase(Phase::Scanning);
                vec![Effect::Pause(PauseKind::InitialSettle), Effect::Scan]
            }
            _ => Vec::new(),
        },
        Msg::TimelineMissing => match state.phase() {
            Phase::Loading => finish(&mut state, StopReason::EmptyProfile),
            _ => Vec::new(),
        },
        Msg::DriverFailed => finish(&mut state, StopReason::DriverError),
        Msg::ScanCompleted {
            visible,
            accepted,
            extent,
        } => match state.phase() {
            Phase::Scanning => apply_scan(&mut state, visible, accepted, extent),
            _ => Vec::new(),
        },
        Msg::ScrollAttempted { progressed } => match state.phase() {
            Phase::Scrolling => apply_scroll(&mut state, progressed),
            _ => Vec::new(),
        },
        Msg::CancelRequested => finish(&mut state, StopReason::Cancelled),
    };

    (state, effects)
}

fn apply_scan(
    state: &mut HarvestState,
    visible: usize,
    accepted: usize,
    extent: Option<u64>,
) -> Vec<Effect> {
    state.begin_scan();

    if visible == 0 {
        if state.note_empty_scan() {
            return finish(state, StopReason::NoItems);
        }
        return vec![Effect::Pause(PauseKind::Rescan), Effect::Scan];
    }

    state.note_accepted(accepted, extent);
    let mut effects = vec![Effect::ReportProgress];

    if accepted == 0 && state.note_extent(extent) {
        effects.extend(finish(state, StopReason::NoGrowth));
        return effects;
    }

    state.set_phase(Phase::Scrolling);
    state.reset_scroll_attempts();
    effects.push(Effect::Scroll);
    effects
}

fn apply_scroll(state: &mut HarvestState, progressed: bool) -> Vec<Effect> {
    if progressed {
        state.set_phase(Phase::Scanning);
        return vec![Effect::Scan];
    }
    if state.note_failed_scroll() {
        return finish(state, StopReason::ScrollStalled);
    }
    vec![Effect::Pause(PauseKind::ScrollRetry), Effect::Scroll]
}

fn finish(state: &mut HarvestState, reason: StopReason) -> Vec<Effect> {
    state.finish(reason);
    vec![Effect::Finish(reason)]
}
