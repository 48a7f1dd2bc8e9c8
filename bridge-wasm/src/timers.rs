//! Browser interval timers as [`TimerHandle`]s.

use bridge_traits::TimerHandle;
use gloo_timers::callback::Interval;

/// `setInterval` wrapper that the proxy can own and cancel.
pub struct IntervalTimer {
    interval: Option<Interval>,
}

impl IntervalTimer {
    /// Run `callback` every `millis` milliseconds until cancelled or dropped.
    pub fn new(millis: u32, callback: impl FnMut() + 'static) -> Self {
        Self {
            interval: Some(Interval::new(millis, callback)),
        }
    }

    /// Whether the interval is still scheduled.
    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }
}

impl TimerHandle for IntervalTimer {
    fn cancel(&mut self) {
        if let Some(interval) = self.interval.take() {
            let _ = interval.cancel();
        }
    }
}
