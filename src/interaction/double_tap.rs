use std::time::Duration;

/// Turns hand appearance edges into taps and pairs of taps into double-taps
#[derive(Debug, Clone)]
pub struct DoubleTapDetector {
    window: Duration,
    was_present: bool,
    last_tap: Option<Duration>,
}

impl DoubleTapDetector {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            was_present: false,
            last_tap: None,
        }
    }

    /// Feed this frame's presence; true when a second tap lands inside the window
    pub fn update(&mut self, present: bool, now: Duration) -> bool {
        let rising = present && !self.was_present;
        self.was_present = present;
        if !rising {
            return false;
        }

        match self.last_tap {
            Some(first) if now.saturating_sub(first) <= self.window => {
                self.last_tap = None;
                true
            }
            _ => {
                self.last_tap = Some(now);
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.was_present = false;
        self.last_tap = None;
    }
}
