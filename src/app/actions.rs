//! Actions representing side effects to be executed against the persistence
//! collaborator.
//!
//! The event handler never talks to a backend itself. After applying an event to
//! the board it returns a `Vec<Action>` describing what must be persisted; the
//! embedder hands those to a [`crate::worker::PersistWorker`] (or its own
//! transport) and feeds the resulting responses back in as events.
//!
//! # Example
//!
//! ```
//! use trackboard::app::Action;
//! use trackboard::domain::{Location, StoryState};
//! use trackboard::storage::{ReorderRequest, UpdateStoryRequest};
//!
//! let actions = vec![
//!     Action::PersistOrder(ReorderRequest::new(Location::Backlog, vec!["D".into(), "A".into()])),
//!     Action::UpdateStory {
//!         story_id: "A".into(),
//!         request: UpdateStoryRequest::state(StoryState::Started),
//!     },
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use crate::domain::story::StoryId;
use crate::storage::models::{ReorderRequest, UpdateStoryRequest};

/// Persistence commands produced by the event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the stored ordering of one location.
    ///
    /// Emitted once per location whose ordering changed. For cross-location moves
    /// the source location's request precedes the destination's.
    PersistOrder(ReorderRequest),

    /// Apply a partial update to one story.
    UpdateStory {
        /// Story being updated.
        story_id: StoryId,
        /// Fields to change; absent fields are left untouched.
        request: UpdateStoryRequest,
    },
}

impl From<ReorderRequest> for Action {
    fn from(request: ReorderRequest) -> Self {
        Self::PersistOrder(request)
    }
}
