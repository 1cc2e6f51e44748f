//! Event handling and board state transitions.
//!
//! This module implements the reducer at the centre of the crate: it applies UI
//! intents and persistence responses to the [`BoardState`] and returns the
//! persistence actions the embedder must execute.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the UI or from the persistence worker
//! 2. [`handle_event`] pattern-matches the event type
//! 3. A new snapshot is computed from the current one
//! 4. On success the snapshot is swapped in and actions are returned
//!
//! Any validation error is returned before the swap, so a rejected event leaves
//! the board exactly as it was.
//!
//! # Event Types
//!
//! - **Intents**: `Drag`, `ExplicitOrder`, `ChangeState`, `EditStory`
//! - **Sync**: `StoriesLoaded`, `StoryCreated`, `Persisted`
//!
//! # Example
//!
//! ```
//! use trackboard::app::{handle_event, BoardState, DragResult, Event};
//! use trackboard::domain::{Location, StoryStateMachine};
//!
//! let mut state = BoardState::new("p1", StoryStateMachine::default());
//! let drag = DragResult::new(Location::Icebox, 0, Location::Backlog, 0);
//!
//! // An empty board has nothing to drag.
//! assert!(handle_event(&mut state, &Event::Drag(drag)).is_err());
//! ```

use crate::app::reorder::{DragResult, ReorderCoordinator, ReorderOutcome};
use crate::app::state::{BoardSnapshot, BoardState, Position};
use crate::app::Action;
use crate::domain::error::Result;
use crate::domain::story::{Location, Story, StoryId, StoryState};
use crate::storage::mapping::{apply_update, stories_from_responses};
use crate::storage::models::{StoryResponse, UpdateStoryRequest};
use crate::worker::PersistResponse;
use chrono::Utc;

/// Events triggered by user intents or persistence responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Replaces the whole board with a fresh backend listing.
    ///
    /// Each location's ordering follows the response order.
    StoriesLoaded(Vec<StoryResponse>),

    /// A completed drag-and-drop move.
    Drag(DragResult),

    /// Replaces one location's ordering with a permutation of its current ids.
    ExplicitOrder {
        /// Location to reorder.
        location: Location,
        /// New order; must contain each current id exactly once.
        story_ids: Vec<StoryId>,
    },

    /// Moves a story to another workflow state.
    ChangeState {
        /// Story to transition.
        story_id: StoryId,
        /// Target state.
        state: StoryState,
    },

    /// Applies a partial edit to a story.
    ///
    /// A `state` or `location` in the request goes through the workflow rules; a
    /// story that changes location is appended to the bottom of its new location.
    EditStory {
        /// Story to edit.
        story_id: StoryId,
        /// Fields to change.
        request: UpdateStoryRequest,
    },

    /// A story created elsewhere that should appear on this board.
    ///
    /// The creator has already persisted it, so no action is emitted.
    StoryCreated {
        /// The new story.
        story: Story,
        /// Where it lands within its location.
        position: Position,
    },

    /// Wraps a response from the persistence worker.
    Persisted(PersistResponse),
}

/// Processes an event, updates board state, and returns actions to execute.
///
/// # Returns
///
/// A pair of "board changed" and the actions to execute in order. Actions are
/// empty when nothing needs persisting (no-op drags, same-state transitions,
/// sync events).
///
/// # Errors
///
/// Returns the first validation error raised by the reorder coordinator, the
/// state machine or the mapping layer. The board is left untouched.
///
/// # Tracing
///
/// Each call creates a debug-level span with the event for debugging.
pub fn handle_event(state: &mut BoardState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::StoriesLoaded(responses) => {
            let stories = stories_from_responses(responses.clone())?;
            state.snapshot = BoardSnapshot::from_stories(stories)?;

            tracing::debug!(story_count = state.snapshot.len(), "board loaded");
            Ok((true, vec![]))
        }

        Event::Drag(drag) => {
            let outcome = ReorderCoordinator::apply_drag_result(&state.snapshot, drag)?;
            Ok(commit(state, outcome))
        }

        Event::ExplicitOrder { location, story_ids } => {
            let outcome =
                ReorderCoordinator::apply_explicit_order(&state.snapshot, *location, story_ids)?;
            Ok(commit(state, outcome))
        }

        Event::ChangeState { story_id, state: target } => {
            let request = UpdateStoryRequest::state(*target);
            update_story(state, story_id, request)
        }

        Event::EditStory { story_id, request } => {
            if request.is_empty() {
                tracing::debug!(story_id = %story_id, "empty edit ignored");
                return Ok((false, vec![]));
            }
            update_story(state, story_id, request.clone())
        }

        Event::StoryCreated { story, position } => {
            state.snapshot.insert_story(story.clone(), *position)?;

            tracing::debug!(story_id = %story.id, location = %story.location, position = ?position, "story inserted");
            Ok((true, vec![]))
        }

        Event::Persisted(response) => handle_persisted(state, response),
    }
}

fn commit(state: &mut BoardState, outcome: ReorderOutcome) -> (bool, Vec<Action>) {
    if outcome.is_noop() {
        return (false, vec![]);
    }

    state.snapshot = outcome.snapshot;
    let actions = outcome.persist.into_iter().map(Action::PersistOrder).collect();
    (true, actions)
}

fn update_story(
    state: &mut BoardState,
    story_id: &StoryId,
    request: UpdateStoryRequest,
) -> Result<(bool, Vec<Action>)> {
    let story = state.snapshot.require_story(story_id)?;
    let updated = apply_update(&state.machine, story, &request, Utc::now())?;

    if updated == *story {
        tracing::debug!(story_id = %story_id, "update changes nothing");
        return Ok((false, vec![]));
    }

    state.snapshot.upsert_story(updated);
    Ok((
        true,
        vec![Action::UpdateStory {
            story_id: story_id.clone(),
            request,
        }],
    ))
}

fn handle_persisted(state: &mut BoardState, response: &PersistResponse) -> Result<(bool, Vec<Action>)> {
    match response {
        PersistResponse::OrderPersisted { location, stories } => {
            let stories = stories_from_responses(stories.clone())?;

            tracing::debug!(location = %location, story_count = stories.len(), "reconciling with backend order");
            state.snapshot.reconcile_location(*location, stories);
            Ok((true, vec![]))
        }
        PersistResponse::StoryPersisted { story } => {
            let story = Story::try_from(story.clone())?;

            tracing::debug!(story_id = %story.id, "reconciling story with backend");
            state.snapshot.upsert_story(story);
            Ok((true, vec![]))
        }
        PersistResponse::Failed { message } => {
            tracing::error!(message = %message, "persistence failed, keeping optimistic board");
            Ok((false, vec![]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::TrackerError;
    use crate::domain::story::StoryType;
    use crate::domain::workflow::StoryStateMachine;
    use crate::storage::models::ReorderRequest;

    fn board() -> BoardState {
        let mut state = BoardState::new("p1", StoryStateMachine::default());
        let responses: Vec<StoryResponse> = [("A", "icebox"), ("B", "icebox"), ("C", "icebox"), ("D", "backlog"), ("E", "backlog")]
            .into_iter()
            .map(|(id, location)| {
                serde_json::from_value(serde_json::json!({
                    "id": id,
                    "title": id,
                    "location": location,
                    "createdAt": "2024-05-01T09:00:00Z"
                }))
                .unwrap()
            })
            .collect();
        handle_event(&mut state, &Event::StoriesLoaded(responses)).unwrap();
        state
    }

    fn ids(state: &BoardState, location: Location) -> Vec<&str> {
        state.snapshot.ordering(location).iter().map(StoryId::as_str).collect()
    }

    #[test]
    fn stories_loaded_builds_orderings() {
        let state = board();

        assert_eq!(ids(&state, Location::Icebox), vec!["A", "B", "C"]);
        assert_eq!(ids(&state, Location::Backlog), vec!["D", "E"]);
    }

    #[test]
    fn drag_emits_one_action_per_changed_location() {
        let mut state = board();
        let drag = DragResult::new(Location::Icebox, 0, Location::Backlog, 1);

        let (changed, actions) = handle_event(&mut state, &Event::Drag(drag)).unwrap();

        assert!(changed);
        assert_eq!(
            actions,
            vec![
                Action::PersistOrder(ReorderRequest::new(Location::Icebox, vec!["B".into(), "C".into()])),
                Action::PersistOrder(ReorderRequest::new(
                    Location::Backlog,
                    vec!["D".into(), "A".into(), "E".into()]
                )),
            ]
        );
        assert_eq!(ids(&state, Location::Backlog), vec!["D", "A", "E"]);
    }

    #[test]
    fn rejected_drag_leaves_board_untouched() {
        let mut state = board();
        handle_event(
            &mut state,
            &Event::ChangeState { story_id: "D".into(), state: StoryState::Started },
        )
        .unwrap();
        let before = state.snapshot.clone();

        let drag = DragResult::new(Location::Backlog, 0, Location::Icebox, 0);
        let result = handle_event(&mut state, &Event::Drag(drag));

        assert!(matches!(result, Err(TrackerError::InvalidLocationChange { .. })));
        assert_eq!(state.snapshot, before);
    }

    #[test]
    fn noop_drag_emits_nothing() {
        let mut state = board();
        let drag = DragResult::new(Location::Icebox, 1, Location::Icebox, 1);

        assert_eq!(handle_event(&mut state, &Event::Drag(drag)).unwrap(), (false, vec![]));
    }

    #[test]
    fn explicit_order_errors_are_surfaced() {
        let mut state = board();
        let event = Event::ExplicitOrder {
            location: Location::Backlog,
            story_ids: vec!["D".into(), "X".into()],
        };

        assert_eq!(
            handle_event(&mut state, &event),
            Err(TrackerError::InvalidOrderingSet {
                missing: vec!["E".into()],
                extra: vec!["X".into()],
            })
        );
    }

    #[test]
    fn change_state_stamps_and_emits_update() {
        let mut state = board();
        let event = Event::ChangeState { story_id: "A".into(), state: StoryState::Started };

        let (changed, actions) = handle_event(&mut state, &event).unwrap();

        assert!(changed);
        assert_eq!(
            actions,
            vec![Action::UpdateStory {
                story_id: "A".into(),
                request: UpdateStoryRequest::state(StoryState::Started),
            }]
        );
        let story = state.snapshot.story(&"A".into()).unwrap();
        assert_eq!(story.state, StoryState::Started);
        assert!(story.started_at.is_some());

        assert_eq!(handle_event(&mut state, &event).unwrap(), (false, vec![]));
    }

    #[test]
    fn invalid_state_change_is_rejected() {
        let mut state = board();
        let event = Event::ChangeState { story_id: "A".into(), state: StoryState::Accepted };

        assert_eq!(
            handle_event(&mut state, &event),
            Err(TrackerError::InvalidTransition {
                from: StoryState::Unstarted,
                to: StoryState::Accepted,
            })
        );
    }

    #[test]
    fn edit_with_location_appends_to_new_location() {
        let mut state = board();
        let event = Event::EditStory {
            story_id: "B".into(),
            request: UpdateStoryRequest {
                title: Some("Renamed".to_string()),
                ..UpdateStoryRequest::location(Location::Backlog)
            },
        };

        let (changed, actions) = handle_event(&mut state, &event).unwrap();

        assert!(changed);
        assert_eq!(actions.len(), 1);
        assert_eq!(ids(&state, Location::Icebox), vec!["A", "C"]);
        assert_eq!(ids(&state, Location::Backlog), vec!["D", "E", "B"]);
        assert_eq!(state.snapshot.story(&"B".into()).unwrap().title, "Renamed");
    }

    #[test]
    fn story_created_lands_at_requested_position() {
        let mut state = board();
        let story = Story::new("F", "F", StoryType::Release, Location::Backlog);

        handle_event(&mut state, &Event::StoryCreated { story, position: Position::Top }).unwrap();

        assert_eq!(ids(&state, Location::Backlog), vec!["F", "D", "E"]);
    }

    #[test]
    fn persisted_order_reconciles_and_failures_keep_state() {
        let mut state = board();
        let mut reordered: Vec<StoryResponse> =
            state.snapshot.stories_in(Location::Backlog).map(StoryResponse::from).collect();
        reordered.reverse();

        let response = PersistResponse::OrderPersisted { location: Location::Backlog, stories: reordered };
        handle_event(&mut state, &Event::Persisted(response)).unwrap();
        assert_eq!(ids(&state, Location::Backlog), vec!["E", "D"]);

        let before = state.snapshot.clone();
        let failed = PersistResponse::Failed { message: "update story: backend unavailable".to_string() };
        assert_eq!(handle_event(&mut state, &Event::Persisted(failed)).unwrap(), (false, vec![]));
        assert_eq!(state.snapshot, before);
    }
}
