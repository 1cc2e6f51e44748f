//! Error types for the trackboard core.
//!
//! This module defines the centralized error type [`TrackerError`] and a type alias
//! [`Result`] used throughout the crate. Every validation failure is a typed,
//! synchronous rejection of a single operation: the caller's snapshot is left
//! untouched and nothing in this crate treats an error as fatal.

use crate::domain::story::{Location, StoryId, StoryState};
use thiserror::Error;

/// The main error type for board and workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The requested state change is not in the workflow transition table.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// State the story is currently in.
        from: StoryState,
        /// State that was requested.
        to: StoryState,
    },

    /// A backlog → icebox move was attempted for a story that is already in flight.
    ///
    /// Only `unstarted` stories may be sent back to the icebox.
    #[error("cannot move story from {from} to {to} while it is {state}")]
    InvalidLocationChange {
        /// Location the story currently lives in.
        from: Location,
        /// Requested destination.
        to: Location,
        /// Workflow state that blocked the move.
        state: StoryState,
    },

    /// An explicit ordering is not a permutation of the ids known for a location.
    ///
    /// `missing` lists known ids absent from the payload; `extra` lists ids that are
    /// foreign to the location or appear more than once.
    #[error("ordering does not match location contents (missing: {missing:?}, extra: {extra:?})")]
    InvalidOrderingSet {
        /// Ids that belong to the location but were not supplied.
        missing: Vec<StoryId>,
        /// Ids that were supplied but are foreign or duplicated.
        extra: Vec<StoryId>,
    },

    /// A drag result references a position outside the current list bounds.
    #[error("index {index} out of range for {location} (length {length})")]
    IndexOutOfRange {
        /// Location whose list was indexed.
        location: Location,
        /// Offending index.
        index: usize,
        /// Length of the indexed list.
        length: usize,
    },

    /// A story id referenced by an ordering or an event is not on the board.
    #[error("unknown story: {0}")]
    UnknownStory(StoryId),

    /// The workflow policy requires an estimate before the story can be started.
    #[error("story {0} must be estimated before it can be started")]
    EstimateRequired(StoryId),

    /// An inbound payload could not be mapped to the domain model.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// The persistence collaborator rejected or failed an operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Stored as a rendered message so the error stays `Clone` and comparable.
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A specialized `Result` type for trackboard operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
