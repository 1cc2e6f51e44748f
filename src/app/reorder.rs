//! Reorder coordination for drag-and-drop and explicit orderings.
//!
//! The [`ReorderCoordinator`] turns a reorder intent into a new [`BoardSnapshot`]
//! plus the persist instructions for every location whose ordering changed. It
//! never mutates its input: on any validation failure the caller's snapshot is
//! exactly what it was before the call.
//!
//! # Index Semantics
//!
//! The destination index names a gap in the destination list as it was before
//! the drag, so it may be anything in `0..=len`, `len` meaning "append".
//!
//! For a move within one location the story is removed first, and a gap to the
//! right of the origin shifts down by one in the shortened list. Dropping
//! `[A, B, C]`'s `A` at index 1 therefore leaves the list unchanged, while index
//! 3 yields `[B, C, A]`.

use crate::app::state::BoardSnapshot;
use crate::domain::error::{Result, TrackerError};
use crate::domain::story::{Location, StoryId};
use crate::domain::workflow::StoryStateMachine;
use crate::storage::models::ReorderRequest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A completed drag reported by the UI, reduced to plain coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragResult {
    pub source_location: Location,
    pub source_index: usize,
    pub destination_location: Location,
    pub destination_index: usize,
}

impl DragResult {
    #[must_use]
    pub const fn new(
        source_location: Location,
        source_index: usize,
        destination_location: Location,
        destination_index: usize,
    ) -> Self {
        Self {
            source_location,
            source_index,
            destination_location,
            destination_index,
        }
    }

    /// A drop back onto the exact origin.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.source_location == self.destination_location
            && self.source_index == self.destination_index
    }
}

/// Result of a successful reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOutcome {
    /// Snapshot with the new orderings applied.
    pub snapshot: BoardSnapshot,

    /// One request per location whose ordering changed, source location first.
    /// Empty when there is nothing to persist.
    pub persist: Vec<ReorderRequest>,
}

impl ReorderOutcome {
    fn unchanged(snapshot: &BoardSnapshot) -> Self {
        Self {
            snapshot: snapshot.clone(),
            persist: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.persist.is_empty()
    }
}

/// Computes new orderings from reorder intents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReorderCoordinator;

impl ReorderCoordinator {
    /// Applies a single drag-and-drop move.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::IndexOutOfRange`] if either index is outside its list.
    /// - [`TrackerError::UnknownStory`] if the dragged id has no story record.
    /// - [`TrackerError::InvalidLocationChange`] if a started story is dragged
    ///   from the backlog into the icebox; neither list changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use trackboard::app::{BoardSnapshot, DragResult, ReorderCoordinator};
    /// use trackboard::domain::{Location, Story, StoryType};
    ///
    /// let snapshot = BoardSnapshot::from_stories(
    ///     ["A", "B", "C"].map(|id| Story::new(id, id, StoryType::Chore, Location::Icebox)),
    /// )?;
    ///
    /// let drag = DragResult::new(Location::Icebox, 2, Location::Icebox, 0);
    /// let outcome = ReorderCoordinator::apply_drag_result(&snapshot, &drag)?;
    ///
    /// let ids: Vec<_> = outcome.snapshot.ordering(Location::Icebox).iter().map(|id| id.as_str()).collect();
    /// assert_eq!(ids, ["C", "A", "B"]);
    /// assert_eq!(outcome.persist.len(), 1);
    /// # Ok::<(), trackboard::TrackerError>(())
    /// ```
    pub fn apply_drag_result(snapshot: &BoardSnapshot, drag: &DragResult) -> Result<ReorderOutcome> {
        let _span = tracing::debug_span!("apply_drag_result",
            source_location = %drag.source_location,
            source_index = drag.source_index,
            destination_location = %drag.destination_location,
            destination_index = drag.destination_index
        ).entered();

        let source = snapshot.ordering(drag.source_location);
        if drag.source_index >= source.len() {
            return Err(TrackerError::IndexOutOfRange {
                location: drag.source_location,
                index: drag.source_index,
                length: source.len(),
            });
        }

        if drag.is_noop() {
            tracing::debug!("dropped onto origin, nothing to persist");
            return Ok(ReorderOutcome::unchanged(snapshot));
        }

        if drag.source_location == drag.destination_location {
            Self::move_within(snapshot, drag)
        } else {
            Self::move_across(snapshot, drag)
        }
    }

    fn move_within(snapshot: &BoardSnapshot, drag: &DragResult) -> Result<ReorderOutcome> {
        let location = drag.source_location;
        let mut ids = snapshot.ordering(location).to_vec();

        if drag.destination_index > ids.len() {
            return Err(TrackerError::IndexOutOfRange {
                location,
                index: drag.destination_index,
                length: ids.len(),
            });
        }

        let insert_at = if drag.destination_index > drag.source_index {
            drag.destination_index - 1
        } else {
            drag.destination_index
        };
        let moved = ids.remove(drag.source_index);
        ids.insert(insert_at, moved);

        if ids.as_slice() == snapshot.ordering(location) {
            tracing::debug!("dropped next to origin, nothing to persist");
            return Ok(ReorderOutcome::unchanged(snapshot));
        }

        tracing::debug!(location = %location, "reordered within location");

        let mut next = snapshot.clone();
        next.set_ordering(location, ids.clone());
        Ok(ReorderOutcome {
            snapshot: next,
            persist: vec![ReorderRequest::new(location, ids)],
        })
    }

    fn move_across(snapshot: &BoardSnapshot, drag: &DragResult) -> Result<ReorderOutcome> {
        let mut source = snapshot.ordering(drag.source_location).to_vec();
        let mut destination = snapshot.ordering(drag.destination_location).to_vec();

        if drag.destination_index > destination.len() {
            return Err(TrackerError::IndexOutOfRange {
                location: drag.destination_location,
                index: drag.destination_index,
                length: destination.len(),
            });
        }

        let story = snapshot.require_story(&source[drag.source_index])?;
        let relocated = StoryStateMachine::move_to(story, drag.destination_location)?;

        let id = source.remove(drag.source_index);
        destination.insert(drag.destination_index, id);

        tracing::debug!(
            story_id = %relocated.id,
            from = %drag.source_location,
            to = %drag.destination_location,
            "moved across locations"
        );

        let mut next = snapshot.clone();
        next.set_ordering(drag.source_location, source.clone());
        next.set_ordering(drag.destination_location, destination.clone());
        next.replace_story(relocated);

        Ok(ReorderOutcome {
            snapshot: next,
            persist: vec![
                ReorderRequest::new(drag.source_location, source),
                ReorderRequest::new(drag.destination_location, destination),
            ],
        })
    }

    /// Replaces a location's ordering with a caller-supplied permutation.
    ///
    /// Always produces a persist instruction, even if the order is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidOrderingSet`] when `story_ids` is not a
    /// permutation of the location's current ids. `missing` follows the current
    /// board order; `extra` follows the payload order and includes every repeated
    /// occurrence of a duplicated id.
    pub fn apply_explicit_order(
        snapshot: &BoardSnapshot,
        location: Location,
        story_ids: &[StoryId],
    ) -> Result<ReorderOutcome> {
        let _span = tracing::debug_span!("apply_explicit_order",
            location = %location,
            count = story_ids.len()
        ).entered();

        let current = snapshot.ordering(location);
        let known: BTreeSet<&StoryId> = current.iter().collect();

        let mut seen: HashSet<&StoryId> = HashSet::with_capacity(story_ids.len());
        let mut extra = Vec::new();
        for id in story_ids {
            if !known.contains(id) || !seen.insert(id) {
                extra.push(id.clone());
            }
        }

        let missing: Vec<StoryId> = current
            .iter()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();

        if !missing.is_empty() || !extra.is_empty() {
            tracing::debug!(missing = ?missing, extra = ?extra, "ordering set mismatch");
            return Err(TrackerError::InvalidOrderingSet { missing, extra });
        }

        let mut next = snapshot.clone();
        next.set_ordering(location, story_ids.to_vec());
        Ok(ReorderOutcome {
            snapshot: next,
            persist: vec![ReorderRequest::new(location, story_ids.to_vec())],
        })
    }
}
