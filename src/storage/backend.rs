//! Persistence collaborator abstraction.
//!
//! This module defines the [`StoryBackend`] trait: the abstract contract the
//! board core persists through. The core never depends on a transport; an
//! embedder implements this trait over HTTP, a database, or anything else.
//!
//! # Design Philosophy
//!
//! The trait is deliberately narrow. Each method maps to one request the core
//! produces, and every call is scoped to a project id. Calls are synchronous and
//! are expected to run off the interactive thread (see [`crate::worker`]).

use crate::domain::error::Result;
use crate::domain::story::StoryId;
use crate::storage::models::{ReorderRequest, StoryResponse, UpdateStoryRequest};

/// Abstraction over the story persistence service.
///
/// # Implementations
///
/// - [`crate::storage::InMemoryBackend`]: in-process reference implementation
///
/// # Examples
///
/// ```
/// use trackboard::domain::{Location, Story, StoryType};
/// use trackboard::storage::{InMemoryBackend, ReorderRequest, StoryBackend};
///
/// let mut backend = InMemoryBackend::new("p1");
/// backend.add_story(Story::new("A", "Login", StoryType::Feature, Location::Icebox));
/// backend.add_story(Story::new("B", "Logout", StoryType::Chore, Location::Icebox));
///
/// let request = ReorderRequest::new(Location::Icebox, vec!["B".into(), "A".into()]);
/// let stored = backend.reorder_stories("p1", &request)?;
/// assert_eq!(stored[0].id, "B");
/// # Ok::<(), trackboard::TrackerError>(())
/// ```
pub trait StoryBackend: Send {
    /// Lists every story of a project, grouped by location in board order.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is unknown or the backend fails.
    fn list_stories(&self, project_id: &str) -> Result<Vec<StoryResponse>>;

    /// Replaces the ordering of one location.
    ///
    /// Returns the backend's canonical list for that location after the change.
    ///
    /// # Errors
    ///
    /// Returns an error if the request names unknown stories, names a story
    /// twice, or would move a story somewhere the workflow forbids.
    fn reorder_stories(
        &mut self,
        project_id: &str,
        request: &ReorderRequest,
    ) -> Result<Vec<StoryResponse>>;

    /// Applies a partial update to one story and returns the stored story.
    ///
    /// # Errors
    ///
    /// Returns an error if the story is unknown or the update violates the
    /// workflow rules.
    fn update_story(
        &mut self,
        project_id: &str,
        story_id: &StoryId,
        request: &UpdateStoryRequest,
    ) -> Result<StoryResponse>;
}
