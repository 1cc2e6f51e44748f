//! Application layer coordinating board state, events, and actions.
//!
//! This module sits between the embedder (UI plus transport) and the
//! domain/storage/worker layers. It implements the event-driven core that keeps
//! a board's orderings and stories consistent.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! UI Intent → Event → handle_event → New Snapshot → Actions → PersistWorker
//!                          ↑                                       ↓
//!                          └──────── Persisted(response) ──────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Persistence commands emitted by the event handler
//! - [`handler`]: Event processing and snapshot swapping
//! - [`reorder`]: Drag-and-drop and explicit reorder computation
//! - [`state`]: Board snapshot, orderings and the board container
//!
//! # Example
//!
//! ```
//! use trackboard::app::{handle_event, BoardState, Event, Position};
//! use trackboard::domain::{Location, Story, StoryStateMachine, StoryType};
//!
//! let mut state = BoardState::new("p1", StoryStateMachine::default());
//! let story = Story::new("1", "Sign up", StoryType::Feature, Location::Icebox);
//!
//! let (changed, actions) =
//!     handle_event(&mut state, &Event::StoryCreated { story, position: Position::Bottom })?;
//! assert!(changed && actions.is_empty());
//! # Ok::<(), trackboard::TrackerError>(())
//! ```

pub mod actions;
pub mod handler;
pub mod reorder;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use reorder::{DragResult, ReorderCoordinator, ReorderOutcome};
pub use state::{BoardSnapshot, BoardState, Position};
