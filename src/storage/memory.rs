//! In-process reference implementation of [`StoryBackend`].
//!
//! Holds a single project's board in memory and applies requests with the same
//! workflow rules the board core uses. It is what the test-suite persists
//! through, and a starting point for embedders wiring up a real transport.

use crate::app::state::BoardSnapshot;
use crate::domain::error::{Result, TrackerError};
use crate::domain::story::{Location, Story, StoryId};
use crate::domain::workflow::StoryStateMachine;
use crate::storage::backend::StoryBackend;
use crate::storage::mapping::apply_update;
use crate::storage::models::{ReorderRequest, StoryResponse, UpdateStoryRequest};
use chrono::Utc;
use std::collections::HashSet;

/// Backend storing one project's stories in memory.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    project_id: String,
    board: BoardSnapshot,
    machine: StoryStateMachine,
    unavailable: bool,
}

impl InMemoryBackend {
    /// Creates an empty backend serving `project_id` with the default workflow.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            board: BoardSnapshot::new(),
            machine: StoryStateMachine::default(),
            unavailable: false,
        }
    }

    /// Replaces the workflow rules applied to updates.
    #[must_use]
    pub fn with_machine(mut self, machine: StoryStateMachine) -> Self {
        self.machine = machine;
        self
    }

    /// Stores a story at the bottom of its location, replacing any story with
    /// the same id.
    pub fn add_story(&mut self, story: Story) {
        self.board.upsert_story(story);
    }

    /// Makes every subsequent call fail with [`TrackerError::Storage`] until
    /// switched back.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Current stored board.
    #[must_use]
    pub const fn snapshot(&self) -> &BoardSnapshot {
        &self.board
    }

    fn check_reachable(&self, project_id: &str) -> Result<()> {
        if self.unavailable {
            return Err(TrackerError::Storage("backend unavailable".to_string()));
        }
        if project_id != self.project_id {
            return Err(TrackerError::Storage(format!("unknown project '{project_id}'")));
        }
        Ok(())
    }

    fn location_responses(&self, location: Location) -> Vec<StoryResponse> {
        self.board.stories_in(location).map(StoryResponse::from).collect()
    }
}

impl StoryBackend for InMemoryBackend {
    fn list_stories(&self, project_id: &str) -> Result<Vec<StoryResponse>> {
        self.check_reachable(project_id)?;

        Ok(Location::ALL
            .into_iter()
            .flat_map(|location| self.location_responses(location))
            .collect())
    }

    /// Stories named in the request are moved into the requested location and
    /// ordered as given; stories of that location the request does not mention
    /// keep their relative order after them in storage.
    ///
    /// The response lists only the named stories.
    fn reorder_stories(
        &mut self,
        project_id: &str,
        request: &ReorderRequest,
    ) -> Result<Vec<StoryResponse>> {
        let _span = tracing::debug_span!("memory_reorder_stories",
            location = %request.location,
            count = request.story_ids.len()
        ).entered();

        self.check_reachable(project_id)?;

        let location = request.location;
        let mut seen: HashSet<&StoryId> = HashSet::with_capacity(request.story_ids.len());
        let mut next = self.board.clone();

        for id in &request.story_ids {
            if !seen.insert(id) {
                return Err(TrackerError::InvalidOrderingSet {
                    missing: Vec::new(),
                    extra: vec![id.clone()],
                });
            }

            let story = next.require_story(id)?;
            if story.location != location {
                let moved = StoryStateMachine::move_to(story, location)?;
                next.upsert_story(moved);
            }
        }

        let mut ordering = request.story_ids.clone();
        ordering.extend(
            next.ordering(location)
                .iter()
                .filter(|id| !seen.contains(id))
                .cloned(),
        );
        next.set_ordering(location, ordering);
        self.board = next;

        tracing::debug!("ordering stored");
        Ok(request
            .story_ids
            .iter()
            .filter_map(|id| self.board.story(id))
            .map(StoryResponse::from)
            .collect())
    }

    fn update_story(
        &mut self,
        project_id: &str,
        story_id: &StoryId,
        request: &UpdateStoryRequest,
    ) -> Result<StoryResponse> {
        let _span = tracing::debug_span!("memory_update_story", story_id = %story_id).entered();

        self.check_reachable(project_id)?;

        let story = self.board.require_story(story_id)?;
        let updated = apply_update(&self.machine, story, request, Utc::now())?;
        let response = StoryResponse::from(&updated);
        self.board.upsert_story(updated);

        tracing::debug!("story stored");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::{StoryState, StoryType};

    fn backend() -> InMemoryBackend {
        let mut backend = InMemoryBackend::new("p1");
        for (id, location) in [
            ("A", Location::Icebox),
            ("B", Location::Icebox),
            ("C", Location::Icebox),
            ("D", Location::Backlog),
            ("E", Location::Backlog),
        ] {
            backend.add_story(Story::new(id, id, StoryType::Feature, location));
        }
        backend
    }

    fn ids(responses: &[StoryResponse]) -> Vec<&str> {
        responses.iter().map(|r| r.id.as_str()).collect()
    }

    fn request(location: Location, raw: &[&str]) -> ReorderRequest {
        ReorderRequest::new(location, raw.iter().map(|id| StoryId::from(*id)).collect())
    }

    #[test]
    fn list_stories_groups_icebox_then_backlog() {
        let backend = backend();
        let stories = backend.list_stories("p1").unwrap();

        assert_eq!(ids(&stories), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(stories[3].location, Location::Backlog);
    }

    #[test]
    fn reorder_replaces_location_order() {
        let mut backend = backend();
        let stored = backend.reorder_stories("p1", &request(Location::Icebox, &["C", "A", "B"])).unwrap();

        assert_eq!(ids(&stored), vec!["C", "A", "B"]);
    }

    #[test]
    fn reorder_pulls_stories_across_locations() {
        let mut backend = backend();

        let source = backend.reorder_stories("p1", &request(Location::Icebox, &["B", "C"])).unwrap();
        assert_eq!(ids(&source), vec!["B", "C"]);
        let stored: Vec<_> = backend.snapshot().ordering(Location::Icebox).to_vec();
        assert_eq!(stored, vec![StoryId::from("B"), StoryId::from("C"), StoryId::from("A")]);

        let destination =
            backend.reorder_stories("p1", &request(Location::Backlog, &["D", "A", "E"])).unwrap();
        assert_eq!(ids(&destination), vec!["D", "A", "E"]);
        assert_eq!(destination[1].location, Location::Backlog);

        let icebox: Vec<_> = backend.snapshot().ordering(Location::Icebox).to_vec();
        assert_eq!(icebox, vec![StoryId::from("B"), StoryId::from("C")]);
    }

    #[test]
    fn reorder_rejects_unknown_and_duplicate_ids() {
        let mut backend = backend();
        let before = backend.snapshot().clone();

        assert_eq!(
            backend.reorder_stories("p1", &request(Location::Icebox, &["A", "X"])),
            Err(TrackerError::UnknownStory("X".into()))
        );
        assert!(matches!(
            backend.reorder_stories("p1", &request(Location::Icebox, &["A", "A"])),
            Err(TrackerError::InvalidOrderingSet { .. })
        ));
        assert_eq!(backend.snapshot(), &before);
    }

    #[test]
    fn reorder_enforces_location_guard() {
        let mut backend = backend();
        backend
            .update_story("p1", &"D".into(), &UpdateStoryRequest::state(StoryState::Started))
            .unwrap();

        let result = backend.reorder_stories("p1", &request(Location::Icebox, &["D", "A", "B", "C"]));
        assert!(matches!(result, Err(TrackerError::InvalidLocationChange { .. })));
    }

    #[test]
    fn update_story_applies_workflow() {
        let mut backend = backend();

        let stored = backend
            .update_story("p1", &"A".into(), &UpdateStoryRequest::state(StoryState::Started))
            .unwrap();
        assert_eq!(stored.state, Some(StoryState::Started));
        assert!(stored.started_at.is_some());

        let rejected =
            backend.update_story("p1", &"A".into(), &UpdateStoryRequest::state(StoryState::Done));
        assert!(matches!(rejected, Err(TrackerError::InvalidTransition { .. })));

        let missing = backend.update_story("p1", &"Z".into(), &UpdateStoryRequest::default());
        assert_eq!(missing, Err(TrackerError::UnknownStory("Z".into())));
    }

    #[test]
    fn unavailable_and_foreign_project_fail_with_storage_errors() {
        let mut backend = backend();
        assert!(matches!(backend.list_stories("p2"), Err(TrackerError::Storage(_))));

        backend.set_unavailable(true);
        assert!(matches!(backend.list_stories("p1"), Err(TrackerError::Storage(_))));
    }
}
