//! The loop must stop within `2 * retry_ceiling` consecutive scans that make
//! no progress (no new record, no page growth), whatever mix of empty and
//! stalled screens the browser shows.
use timeline_core::{update, Effect, HarvestState, Msg, StopReason};

#[derive(Clone, Copy)]
enum Screen {
    /// No items rendered.
    Empty,
    /// Items rendered, nothing new, page height unchanged.
    Stalled,
}

const EXTENT: u64 = 4000;

/// Drives the state machine after one progressing scan, answering scans
/// from `pattern` (cycled) and letting every scroll succeed. Returns the
/// number of non-progressing scans and the stop reason.
fn drive(retry_ceiling: u32, pattern: &[Screen]) -> (usize, StopReason) {
    let (state, _) = update(HarvestState::new(retry_ceiling), Msg::Start);
    let (state, _) = update(state, Msg::TimelineReady);
    let (mut state, mut effects) = update(
        state,
        Msg::ScanCompleted {
            visible: 1,
            accepted: 1,
            extent: Some(EXTENT),
        },
    );

    let mut scans = 0usize;
    let limit = 100;
    while scans < limit {
        let msg = if effects.contains(&Effect::Scroll) {
            Msg::ScrollAttempted { progressed: true }
        } else if effects.contains(&Effect::Scan) {
            let screen = pattern[scans % pattern.len()];
            scans += 1;
            match screen {
                Screen::Empty => Msg::ScanCompleted {
                    visible: 0,
                    accepted: 0,
                    extent: Some(EXTENT),
                },
                Screen::Stalled => Msg::ScanCompleted {
                    visible: 3,
                    accepted: 0,
                    extent: Some(EXTENT),
                },
            }
        } else {
            break;
        };
        let (next, next_effects) = update(state, msg);
        state = next;
        effects = next_effects;
    }

    let reason = state.stop_reason().expect("loop must have finished");
    (scans, reason)
}

#[test]
fn stops_within_twice_the_ceiling() {
    let patterns: [&[Screen]; 5] = [
        &[Screen::Empty],
        &[Screen::Stalled],
        &[Screen::Empty, Screen::Stalled],
        &[Screen::Stalled, Screen::Empty, Screen::Empty],
        &[Screen::Stalled, Screen::Stalled, Screen::Empty],
    ];
    for ceiling in 1..=5u32 {
        for pattern in patterns {
            let (scans, reason) = drive(ceiling, pattern);
            assert!(
                scans <= 2 * ceiling as usize,
                "ceiling {ceiling}: {scans} scans before {reason}"
            );
            assert!(reason.is_exhaustion());
        }
    }
}

#[test]
fn empty_screens_end_via_no_items() {
    let (scans, reason) = drive(3, &[Screen::Empty]);
    assert_eq!(reason, StopReason::NoItems);
    assert_eq!(scans, 3);
}

#[test]
fn stalled_screens_end_via_no_growth() {
    let (scans, reason) = drive(3, &[Screen::Stalled]);
    assert_eq!(reason, StopReason::NoGrowth);
    assert_eq!(scans, 3);
}
