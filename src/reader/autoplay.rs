use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);
pub const MIN_INTERVAL_SECS: u64 = 1;
pub const MAX_INTERVAL_SECS: u64 = 60;

/// Recurring page-turn timer.
///
/// The timer is a single deadline polled by the session, so stopping it
/// clears the only pending firing and nothing can fire afterwards.
#[derive(Debug)]
pub struct Autoplay {
    interval: Duration,
    next_fire: Option<Instant>,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Autoplay {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_fire: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_fire.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_fire
    }

    /// Start (or restart) with the first firing one interval from `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_fire = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_fire = None;
    }

    /// Change the period. A running timer restarts from `now` with the new
    /// period instead of keeping its old deadline.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.is_running() {
            self.start(now);
        }
    }

    pub fn set_interval_secs(&mut self, seconds: u64, now: Instant) {
        let seconds = seconds.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
        self.set_interval(Duration::from_secs(seconds), now);
    }

    /// Returns true when the timer is due, and schedules the next firing.
    /// At most one firing is reported per call, however late the poll is.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_fire {
            Some(deadline) if now >= deadline => {
                self.next_fire = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::new(Duration::from_secs(3));
        autoplay.start(t0);
        assert!(!autoplay.poll(t0 + Duration::from_millis(2999)));
        assert!(autoplay.poll(t0 + Duration::from_secs(3)));
        assert!(!autoplay.poll(t0 + Duration::from_secs(3)));
        assert!(autoplay.poll(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn late_poll_does_not_burst() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::new(Duration::from_secs(1));
        autoplay.start(t0);
        let late = t0 + Duration::from_secs(10);
        assert!(autoplay.poll(late));
        assert!(!autoplay.poll(late));
    }

    #[test]
    fn interval_change_restarts_without_double_fire() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::new(Duration::from_secs(3));
        autoplay.start(t0);
        let t1 = t0 + Duration::from_millis(2900);
        autoplay.set_interval_secs(5, t1);
        // The old deadline at t0 + 3s is gone.
        assert!(!autoplay.poll(t0 + Duration::from_secs(3)));
        assert!(!autoplay.poll(t1 + Duration::from_millis(4999)));
        assert!(autoplay.poll(t1 + Duration::from_secs(5)));
    }

    #[test]
    fn stop_cancels_pending_firing() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::new(Duration::from_secs(1));
        autoplay.start(t0);
        autoplay.stop();
        assert!(!autoplay.poll(t0 + Duration::from_secs(5)));
        assert_eq!(autoplay.next_deadline(), None);
    }

    #[test]
    fn interval_change_while_stopped_does_not_start() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::default();
        autoplay.set_interval_secs(0, t0);
        assert!(!autoplay.is_running());
        assert_eq!(autoplay.interval(), Duration::from_secs(1));
    }
}
