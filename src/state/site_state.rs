/// Site state definitions for tracking crawl progress
///
/// This module defines the states a site's crawl loop moves through.
use std::fmt;

/// Represents the current state of one site's crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SiteState {
    /// Adapter has not yet produced seed URLs
    #[default]
    Seed,

    /// Frontier is being drained
    Running,

    /// Frontier is empty, the page budget is spent, the adapter is
    /// unsupported, or the run was cancelled. No further fetches happen.
    Exhausted,
}

impl SiteState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    /// Checks if a transition to `next` is valid
    ///
    /// `Seed` may jump straight to `Exhausted` (unsupported adapter or
    /// cancellation before seeding). Nothing leaves `Exhausted`.
    pub fn can_transition_to(&self, next: SiteState) -> bool {
        matches!(
            (self, next),
            (Self::Seed, Self::Running)
                | (Self::Seed, Self::Exhausted)
                | (Self::Running, Self::Exhausted)
        )
    }

    /// Performs a transition, rejecting invalid ones
    pub fn transition(&mut self, next: SiteState) -> crate::Result<()> {
        if !self.can_transition_to(next) {
            return Err(crate::JobsweepError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Running => "running",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
