//! Domain layer for the trackboard core.
//!
//! This module contains the story model, the workflow state machine and the
//! error type. Nothing here knows about boards, orderings or the persistence
//! collaborator; those live in [`crate::app`] and [`crate::storage`].
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`story`]: Story model and its enumerated value types
//! - [`workflow`]: Transition table, timestamp stamping and the location rule
//!
//! # Examples
//!
//! ```
//! use trackboard::domain::{Location, Result, Story, StoryStateMachine, StoryType};
//!
//! fn send_to_backlog(story: &Story) -> Result<Story> {
//!     StoryStateMachine::move_to(story, Location::Backlog)
//! }
//!
//! let story = Story::new("1", "Login page", StoryType::Feature, Location::Icebox);
//! assert_eq!(send_to_backlog(&story)?.location, Location::Backlog);
//! # Ok::<(), trackboard::TrackerError>(())
//! ```

pub mod error;
pub mod story;
pub mod workflow;

pub use error::{Result, TrackerError};
pub use story::{
    Blocker, Comment, Label, Location, Story, StoryId, StoryPoint, StoryState, StoryType, Task,
    UserRef,
};
pub use workflow::{StoryStateMachine, WorkflowPolicy};
