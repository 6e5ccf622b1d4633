use std::time::Duration;

/// Minimum gap between two accepted triggers
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    last_trigger: Option<Duration>,
}

impl Cooldown {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    /// True once strictly more than `window` has passed since the last trigger
    #[must_use]
    pub fn ready(&self, now: Duration) -> bool {
        self.last_trigger
            .map_or(true, |last| now.saturating_sub(last) > self.window)
    }

    pub fn record(&mut self, now: Duration) {
        self.last_trigger = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_trigger = None;
    }

    #[must_use]
    pub const fn last_trigger(&self) -> Option<Duration> {
        self.last_trigger
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}
