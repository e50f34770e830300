/// Lifecycle of a crawl session
///
/// `Idle -> Running -> Draining -> Done`. A session that fails to open never
/// becomes a coordinator, so there is no shortcut out of `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Session built, frontier holds only the seed
    Idle,

    /// Taking URLs off the frontier
    Running,

    /// No more work will be dequeued (frontier empty, page limit, or cancellation)
    Draining,

    /// Render session released; terminal
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Done)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CrawlPhase::Idle.can_transition_to(CrawlPhase::Running));
        assert!(CrawlPhase::Running.can_transition_to(CrawlPhase::Draining));
        assert!(CrawlPhase::Draining.can_transition_to(CrawlPhase::Done));
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Idle));
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Done));
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Done));
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Draining));
        assert!(!CrawlPhase::Done.can_transition_to(CrawlPhase::Running));
        assert!(!CrawlPhase::Draining.can_transition_to(CrawlPhase::Running));
    }
}
