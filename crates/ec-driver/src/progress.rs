//! Progress reporting (`spec.md` §5: "the time-series driver may yield
//! between periods to a user-supplied progress callback; the callback must
//! not mutate the model").

/// One progress tick, emitted after a period finishes evaluating.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    pub period_index: usize,
    pub total_periods: usize,
}

/// A progress sink. Must be `Sync` because periods may evaluate
/// concurrently (`spec.md` §5 "parallel across periods is permitted").
pub trait ProgressSink: Sync {
    fn on_period_complete(&self, event: ProgressEvent);
}

impl<F: Fn(ProgressEvent) + Sync> ProgressSink for F {
    fn on_period_complete(&self, event: ProgressEvent) {
        self(event)
    }
}
