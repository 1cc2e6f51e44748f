//! Story workflow state machine.
//!
//! Encodes the canonical transition table and the location rule that depends on
//! workflow state. All operations are pure: they take a story by reference and
//! return an updated copy, so a rejected change can never leave a story
//! half-modified.
//!
//! # Transition Table
//!
//! ```text
//! unstarted ─► started ─► finished ─► delivered ─► accepted ─► done
//!                 ▲                       │
//!                 └────── rejected ◄──────┘
//! ```
//!
//! Every state may also "transition" to itself, which is a no-op.

use crate::domain::error::{Result, TrackerError};
use crate::domain::story::{Location, Story, StoryState, StoryType};
use chrono::{DateTime, Utc};

/// Tunable workflow rules that sit on top of the fixed transition table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// When set, an unestimated feature cannot leave `unstarted`.
    pub require_estimate: bool,
}

/// Validates and applies state and location changes for a single story.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoryStateMachine {
    policy: WorkflowPolicy,
}

impl StoryStateMachine {
    #[must_use]
    pub const fn new(policy: WorkflowPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> WorkflowPolicy {
        self.policy
    }

    /// Returns `true` if `from → to` is in the transition table.
    ///
    /// Same-state pairs are always allowed.
    #[must_use]
    pub const fn can_transition(from: StoryState, to: StoryState) -> bool {
        use StoryState::{Accepted, Delivered, Done, Finished, Rejected, Started, Unstarted};

        if from as u8 == to as u8 {
            return true;
        }

        matches!(
            (from, to),
            (Unstarted, Started)
                | (Started, Finished)
                | (Finished, Delivered)
                | (Delivered, Accepted | Rejected)
                | (Rejected, Started)
                | (Accepted, Done)
        )
    }

    /// Lists the states reachable from `from` in one step, excluding `from` itself.
    #[must_use]
    pub fn next_states(from: StoryState) -> Vec<StoryState> {
        StoryState::ALL
            .into_iter()
            .filter(|to| *to != from && Self::can_transition(from, *to))
            .collect()
    }

    /// Checks whether `story` may move to `to` without applying anything.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidTransition`] if the pair is not in the table.
    /// - [`TrackerError::EstimateRequired`] if the policy demands an estimate
    ///   before an unestimated feature is started.
    pub fn check_transition(&self, story: &Story, to: StoryState) -> Result<()> {
        let from = story.state;

        if !Self::can_transition(from, to) {
            return Err(TrackerError::InvalidTransition { from, to });
        }

        if self.policy.require_estimate
            && from == StoryState::Unstarted
            && to != StoryState::Unstarted
            && story.story_type == StoryType::Feature
            && story.estimate.is_none()
        {
            return Err(TrackerError::EstimateRequired(story.id.clone()));
        }

        Ok(())
    }

    /// Applies a state transition and returns the updated story.
    ///
    /// Entering `started`, `delivered`, `accepted`, `rejected` or `done` stamps the
    /// matching timestamp with `now`, overwriting any earlier entry. Timestamps of
    /// other states are left as they were. A same-state request returns an
    /// unchanged copy and stamps nothing.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::check_transition`]; `story` is not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use trackboard::domain::{Location, Story, StoryState, StoryStateMachine, StoryType};
    ///
    /// let machine = StoryStateMachine::default();
    /// let story = Story::new("7", "Export CSV", StoryType::Chore, Location::Backlog);
    ///
    /// let started = machine.transition(&story, StoryState::Started, Utc::now())?;
    /// assert_eq!(started.state, StoryState::Started);
    /// assert!(started.started_at.is_some());
    ///
    /// assert!(machine.transition(&started, StoryState::Accepted, Utc::now()).is_err());
    /// # Ok::<(), trackboard::TrackerError>(())
    /// ```
    pub fn transition(&self, story: &Story, to: StoryState, now: DateTime<Utc>) -> Result<Story> {
        let _span = tracing::debug_span!("story_transition",
            story_id = %story.id,
            from = %story.state,
            to = %to
        ).entered();

        if let Err(e) = self.check_transition(story, to) {
            tracing::debug!(error = %e, "transition rejected");
            return Err(e);
        }

        let mut updated = story.clone();
        if story.state == to {
            tracing::trace!("same-state transition, nothing to apply");
            return Ok(updated);
        }

        updated.state = to;
        updated.updated_at = Some(now);
        match to {
            StoryState::Started => updated.started_at = Some(now),
            StoryState::Delivered => updated.delivered_at = Some(now),
            StoryState::Accepted => updated.accepted_at = Some(now),
            StoryState::Rejected => updated.rejected_at = Some(now),
            StoryState::Done => updated.done_at = Some(now),
            StoryState::Unstarted | StoryState::Finished => {}
        }

        tracing::debug!("transition applied");
        Ok(updated)
    }

    /// Checks the location rule for moving `story` to `to`.
    ///
    /// Backlog → icebox is only allowed while the story is `unstarted`. Every
    /// other move, including staying put, is unrestricted.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidLocationChange`] when the rule is violated.
    pub fn check_location_change(story: &Story, to: Location) -> Result<()> {
        if story.location == Location::Backlog
            && to == Location::Icebox
            && story.state != StoryState::Unstarted
        {
            return Err(TrackerError::InvalidLocationChange {
                from: story.location,
                to,
                state: story.state,
            });
        }
        Ok(())
    }

    /// Returns a copy of `story` relocated to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidLocationChange`]; `story` keeps its location.
    pub fn move_to(story: &Story, to: Location) -> Result<Story> {
        if let Err(e) = Self::check_location_change(story, to) {
            tracing::debug!(story_id = %story.id, error = %e, "location change rejected");
            return Err(e);
        }

        let mut moved = story.clone();
        moved.location = to;
        Ok(moved)
    }
}
