use std::time::{Duration, Instant};

use super::types::{PageDirection, Slide};

/// A page change waiting for its exit animation to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    pub target: usize,
    pub direction: PageDirection,
    pub commit_at: Instant,
}

impl PendingTransition {
    pub fn new(target: usize, direction: PageDirection, now: Instant, delay: Duration) -> Self {
        Self {
            target,
            direction,
            commit_at: now + delay,
        }
    }

    pub fn exit_slide(&self) -> Slide {
        Slide::exit(self.direction)
    }

    pub fn enter_slide(&self) -> Slide {
        Slide::enter(self.direction)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.commit_at
    }
}

/// Direction of a jump from `from` to `to`. Jumping in place counts as
/// backward, like any non-forward jump.
pub fn jump_direction(from: usize, to: usize) -> PageDirection {
    if to > from {
        PageDirection::Forward
    } else {
        PageDirection::Backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_is_due_after_delay() {
        let now = Instant::now();
        let t = PendingTransition::new(3, PageDirection::Forward, now, Duration::from_millis(300));
        assert!(!t.is_due(now + Duration::from_millis(299)));
        assert!(t.is_due(now + Duration::from_millis(300)));
        assert_eq!(t.exit_slide(), Slide::OutRight);
        assert_eq!(t.enter_slide(), Slide::InLeft);
    }

    #[test]
    fn jump_direction_follows_target() {
        assert_eq!(jump_direction(2, 5), PageDirection::Forward);
        assert_eq!(jump_direction(5, 2), PageDirection::Backward);
    }
}
