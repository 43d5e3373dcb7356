use slotmap::SlotMap;

use super::{FrameRequest, FrameScheduler};

/// A scheduler whose refresh callbacks fire only when told to.
///
/// Counts every request and cancellation, which makes leaked loops visible.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    outstanding: SlotMap<FrameRequest, ()>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every outstanding request, returning how many there were.
    ///
    /// The caller then runs the matching ticks.
    pub fn fire(&mut self) -> usize {
        let count = self.outstanding.len();
        self.outstanding.clear();
        count
    }

    /// Requests not yet fired or cancelled.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.requested += 1;
        self.outstanding.insert(())
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.cancelled += 1;
        self.outstanding.remove(request);
    }
}
