use std::thread;

use crate::PauseRange;

/// Blocking pause between browser interactions.
pub trait Pacer {
    fn pause(&self, range: PauseRange);
}

/// Sleeps the calling thread for a uniformly random time in the range.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPacer;

impl Pacer for RandomPacer {
    fn pause(&self, range: PauseRange) {
        let duration = range.sample(&mut rand::thread_rng());
        thread::sleep(duration);
    }
}
