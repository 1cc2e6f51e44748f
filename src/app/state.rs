//! Board state and per-location orderings.
//!
//! This module defines [`BoardSnapshot`], the immutable-by-convention value that
//! every core operation takes as input and returns as output, and [`BoardState`],
//! the container the event handler mutates by swapping in new snapshots.
//!
//! # Invariants
//!
//! - Every story in the snapshot appears exactly once, in the ordering of the
//!   location recorded on the story itself.
//! - Orderings of different locations are independent of each other.
//!
//! Mutating helpers are crate-private so that only the coordinator, the handler
//! and the reference backend can produce new snapshots.

use crate::domain::error::{Result, TrackerError};
use crate::domain::story::{Location, Story, StoryId};
use crate::domain::workflow::StoryStateMachine;
use std::collections::{BTreeMap, HashSet};

/// Where a newly inserted story lands within its location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    Top,
    #[default]
    Bottom,
}

/// Canonical snapshot of a board: every story plus one ordering per location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    stories: BTreeMap<StoryId, Story>,
    orderings: BTreeMap<Location, Vec<StoryId>>,
}

impl BoardSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from stories listed in board order.
    ///
    /// Each location's ordering follows the relative order of its stories in the
    /// input.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidOrderingSet`] naming any id that appears
    /// more than once.
    pub fn from_stories(stories: impl IntoIterator<Item = Story>) -> Result<Self> {
        let mut snapshot = Self::new();
        let mut duplicates = Vec::new();

        for story in stories {
            if snapshot.stories.contains_key(&story.id) {
                duplicates.push(story.id.clone());
                continue;
            }
            snapshot.push_bottom(story);
        }

        if duplicates.is_empty() {
            Ok(snapshot)
        } else {
            Err(TrackerError::InvalidOrderingSet {
                missing: Vec::new(),
                extra: duplicates,
            })
        }
    }

    /// Returns the ordered ids of a location (empty if the location has no stories).
    #[must_use]
    pub fn ordering(&self, location: Location) -> &[StoryId] {
        self.orderings.get(&location).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn story(&self, id: &StoryId) -> Option<&Story> {
        self.stories.get(id)
    }

    /// Looks up a story, failing with [`TrackerError::UnknownStory`] if absent.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownStory`] when `id` is not on the board.
    pub fn require_story(&self, id: &StoryId) -> Result<&Story> {
        self.stories
            .get(id)
            .ok_or_else(|| TrackerError::UnknownStory(id.clone()))
    }

    /// Iterates the stories of a location in board order.
    pub fn stories_in(&self, location: Location) -> impl Iterator<Item = &Story> + '_ {
        self.ordering(location)
            .iter()
            .filter_map(|id| self.stories.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Adds a new story at the top or bottom of its location.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidOrderingSet`] if a story with the same id is
    /// already on the board.
    pub fn insert_story(&mut self, story: Story, position: Position) -> Result<()> {
        if self.stories.contains_key(&story.id) {
            return Err(TrackerError::InvalidOrderingSet {
                missing: Vec::new(),
                extra: vec![story.id],
            });
        }

        match position {
            Position::Top => {
                self.orderings
                    .entry(story.location)
                    .or_default()
                    .insert(0, story.id.clone());
                self.stories.insert(story.id.clone(), story);
            }
            Position::Bottom => self.push_bottom(story),
        }
        Ok(())
    }

    fn push_bottom(&mut self, story: Story) {
        self.orderings
            .entry(story.location)
            .or_default()
            .push(story.id.clone());
        self.stories.insert(story.id.clone(), story);
    }

    pub(crate) fn set_ordering(&mut self, location: Location, ids: Vec<StoryId>) {
        self.orderings.insert(location, ids);
    }

    /// Replaces a story's record without touching any ordering.
    ///
    /// Callers must keep the story's location consistent with the orderings.
    pub(crate) fn replace_story(&mut self, story: Story) {
        self.stories.insert(story.id.clone(), story);
    }

    /// Inserts or replaces a story, keeping orderings consistent.
    ///
    /// An existing story that stays in its location keeps its position; one that
    /// changed location is appended to the bottom of its new location.
    pub(crate) fn upsert_story(&mut self, story: Story) {
        match self.stories.get(&story.id).map(|s| s.location) {
            Some(previous) if previous == story.location => self.replace_story(story),
            Some(previous) => {
                if let Some(ids) = self.orderings.get_mut(&previous) {
                    ids.retain(|id| id != &story.id);
                }
                self.push_bottom(story);
            }
            None => self.push_bottom(story),
        }
    }

    /// Drops a story and its ordering entry.
    pub(crate) fn remove_story(&mut self, id: &StoryId) -> Option<Story> {
        let story = self.stories.remove(id)?;
        if let Some(ids) = self.orderings.get_mut(&story.location) {
            ids.retain(|other| other != id);
        }
        Some(story)
    }

    /// Replaces a whole location with the backend's canonical list.
    ///
    /// The location's ordering becomes exactly `stories` in the given order.
    /// Stories that came from another location are removed from it; stories that
    /// were in this location but are absent from `stories` are dropped from the
    /// board.
    pub(crate) fn reconcile_location(&mut self, location: Location, stories: Vec<Story>) {
        let incoming: HashSet<StoryId> = stories.iter().map(|s| s.id.clone()).collect();

        let stale: Vec<StoryId> = self
            .ordering(location)
            .iter()
            .filter(|id| !incoming.contains(*id))
            .cloned()
            .collect();
        for id in &stale {
            tracing::debug!(story_id = %id, location = %location, "story no longer in location, dropping");
            self.remove_story(id);
        }

        for ids in self.orderings.values_mut() {
            ids.retain(|id| !incoming.contains(id));
        }

        let ordering = stories.iter().map(|s| s.id.clone()).collect();
        for mut story in stories {
            story.location = location;
            self.stories.insert(story.id.clone(), story);
        }
        self.orderings.insert(location, ordering);
    }
}

/// Board container owned by the event handler.
///
/// Holds the current snapshot for one project together with the workflow rules
/// in force. The handler only ever replaces `snapshot` wholesale after an
/// operation has fully succeeded.
#[derive(Debug, Clone)]
pub struct BoardState {
    /// Project the board belongs to; scopes every persistence request.
    pub project_id: String,

    /// Current canonical snapshot.
    pub snapshot: BoardSnapshot,

    /// Workflow rules applied to state changes.
    pub machine: StoryStateMachine,
}

impl BoardState {
    /// Creates an empty board for `project_id`.
    pub fn new(project_id: impl Into<String>, machine: StoryStateMachine) -> Self {
        Self {
            project_id: project_id.into(),
            snapshot: BoardSnapshot::new(),
            machine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::{StoryState, StoryType};

    fn story(id: &str, location: Location) -> Story {
        Story::new(id, id, StoryType::Feature, location)
    }

    fn ids(snapshot: &BoardSnapshot, location: Location) -> Vec<&str> {
        snapshot.ordering(location).iter().map(StoryId::as_str).collect()
    }

    #[test]
    fn from_stories_groups_by_location_in_input_order() {
        let snapshot = BoardSnapshot::from_stories(vec![
            story("A", Location::Icebox),
            story("D", Location::Backlog),
            story("B", Location::Icebox),
            story("E", Location::Backlog),
        ])
        .unwrap();

        assert_eq!(ids(&snapshot, Location::Icebox), vec!["A", "B"]);
        assert_eq!(ids(&snapshot, Location::Backlog), vec!["D", "E"]);
        assert_eq!(snapshot.len(), 4);
    }

    #[test]
    fn from_stories_rejects_duplicate_ids() {
        let result = BoardSnapshot::from_stories(vec![
            story("A", Location::Icebox),
            story("A", Location::Backlog),
        ]);

        assert_eq!(
            result,
            Err(TrackerError::InvalidOrderingSet {
                missing: vec![],
                extra: vec![StoryId::from("A")],
            })
        );
    }

    #[test]
    fn insert_story_honours_position() {
        let mut snapshot = BoardSnapshot::new();
        snapshot.insert_story(story("A", Location::Backlog), Position::Bottom).unwrap();
        snapshot.insert_story(story("B", Location::Backlog), Position::Top).unwrap();
        snapshot.insert_story(story("C", Location::Backlog), Position::Bottom).unwrap();

        assert_eq!(ids(&snapshot, Location::Backlog), vec!["B", "A", "C"]);
        assert!(snapshot.insert_story(story("A", Location::Icebox), Position::Top).is_err());
    }

    #[test]
    fn upsert_moves_relocated_story_to_bottom_of_new_location() {
        let mut snapshot = BoardSnapshot::from_stories(vec![
            story("A", Location::Icebox),
            story("B", Location::Icebox),
            story("D", Location::Backlog),
        ])
        .unwrap();

        let mut a = snapshot.story(&"A".into()).unwrap().clone();
        a.location = Location::Backlog;
        snapshot.upsert_story(a);

        assert_eq!(ids(&snapshot, Location::Icebox), vec!["B"]);
        assert_eq!(ids(&snapshot, Location::Backlog), vec!["D", "A"]);
    }

    #[test]
    fn reconcile_location_takes_server_order() {
        let mut snapshot = BoardSnapshot::from_stories(vec![
            story("A", Location::Icebox),
            story("D", Location::Backlog),
            story("E", Location::Backlog),
        ])
        .unwrap();

        let mut a = story("A", Location::Backlog);
        a.state = StoryState::Unstarted;
        snapshot.reconcile_location(Location::Backlog, vec![story("E", Location::Backlog), a]);

        assert_eq!(ids(&snapshot, Location::Icebox), Vec::<&str>::new());
        assert_eq!(ids(&snapshot, Location::Backlog), vec!["E", "A"]);
        assert!(snapshot.story(&"D".into()).is_none());
        assert_eq!(snapshot.story(&"A".into()).unwrap().location, Location::Backlog);
    }
}
