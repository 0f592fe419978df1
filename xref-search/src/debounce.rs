use std::time::Duration;
use std::time::Instant;

/// Suppresses repeat triggers inside a fixed window.
///
/// The first trigger always fires; later triggers fire only once the
/// window has elapsed since the last accepted one.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn try_trigger(&mut self) -> bool {
        self.try_trigger_at(Instant::now())
    }

    pub fn try_trigger_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(previous) if now.duration_since(previous) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
