//! Mapping between wire models and the domain model.
//!
//! Inbound: [`StoryResponse`] → [`Story`], renaming `requestor` to `requester`,
//! parsing ISO 8601 date-time strings and defaulting absent optional fields
//! (`type` → feature, `state` → unstarted, collections → empty).
//!
//! Outbound: [`Story`] → [`StoryResponse`] for backends that hand stories back.
//!
//! Updates: [`apply_update`] applies an [`UpdateStoryRequest`] to a story, routing
//! `state` and `location` through the workflow rules. The board reducer and the
//! in-memory backend share it so both sides agree on the result.

use crate::domain::error::{Result, TrackerError};
use crate::domain::story::{
    Blocker, Comment, Label, Story, StoryId, StoryPoint, StoryState, StoryType, Task, UserRef,
};
use crate::domain::workflow::StoryStateMachine;
use crate::storage::models::{
    BlockerResponse, CommentResponse, LabelResponse, StoryResponse, TaskResponse,
    UpdateStoryRequest, UserResponse,
};
use chrono::{DateTime, SecondsFormat, Utc};

/// Parses an ISO 8601 / RFC 3339 date-time into UTC.
///
/// # Errors
///
/// Returns [`TrackerError::Mapping`] naming the field and the raw value.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TrackerError::Mapping(format!("invalid {field} '{raw}': {e}")))
}

fn parse_optional(field: &str, raw: Option<&String>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|value| parse_timestamp(field, value)).transpose()
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl From<UserResponse> for UserRef {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<&UserRef> for UserResponse {
    fn from(user: &UserRef) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl TryFrom<StoryResponse> for Story {
    type Error = TrackerError;

    fn try_from(response: StoryResponse) -> Result<Self> {
        let _span = tracing::trace_span!("map_story_response", story_id = %response.id).entered();

        let estimate = response
            .estimate
            .map(StoryPoint::try_from)
            .transpose()
            .map_err(|e| TrackerError::Mapping(format!("story {}: {e}", response.id)))?;

        let comments = response
            .comments
            .into_iter()
            .map(|c: CommentResponse| -> Result<Comment> {
                Ok(Comment {
                    created_at: parse_optional("comment createdAt", c.created_at.as_ref())?,
                    id: c.id,
                    text: c.text,
                    author: c.author.map(UserRef::from),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            created_at: parse_timestamp("createdAt", &response.created_at)?,
            updated_at: parse_optional("updatedAt", response.updated_at.as_ref())?,
            started_at: parse_optional("startedAt", response.started_at.as_ref())?,
            delivered_at: parse_optional("deliveredAt", response.delivered_at.as_ref())?,
            accepted_at: parse_optional("acceptedAt", response.accepted_at.as_ref())?,
            rejected_at: parse_optional("rejectedAt", response.rejected_at.as_ref())?,
            done_at: parse_optional("doneAt", response.done_at.as_ref())?,
            id: StoryId::new(response.id),
            title: response.title,
            description: response.description,
            code: response.code,
            story_type: response.story_type.unwrap_or(StoryType::Feature),
            location: response.location,
            state: response.state.unwrap_or(StoryState::Unstarted),
            estimate,
            requester: response.requestor.map(UserRef::from),
            owners: response.owners.into_iter().map(UserRef::from).collect(),
            tasks: response
                .tasks
                .into_iter()
                .map(|t| Task {
                    id: t.id,
                    description: t.description,
                    complete: t.complete,
                })
                .collect(),
            blockers: response
                .blockers
                .into_iter()
                .map(|b| Blocker {
                    id: b.id,
                    description: b.description,
                    resolved: b.resolved,
                })
                .collect(),
            labels: response
                .labels
                .into_iter()
                .map(|l| Label { id: l.id, name: l.name })
                .collect(),
            comments,
        })
    }
}

impl From<&Story> for StoryResponse {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id.to_string(),
            title: story.title.clone(),
            description: story.description.clone(),
            code: story.code.clone(),
            story_type: Some(story.story_type),
            location: story.location,
            state: Some(story.state),
            estimate: story.estimate.map(StoryPoint::value),
            requestor: story.requester.as_ref().map(UserResponse::from),
            owners: story.owners.iter().map(UserResponse::from).collect(),
            tasks: story
                .tasks
                .iter()
                .map(|t| TaskResponse {
                    id: t.id.clone(),
                    description: t.description.clone(),
                    complete: t.complete,
                })
                .collect(),
            blockers: story
                .blockers
                .iter()
                .map(|b| BlockerResponse {
                    id: b.id.clone(),
                    description: b.description.clone(),
                    resolved: b.resolved,
                })
                .collect(),
            labels: story
                .labels
                .iter()
                .map(|l| LabelResponse {
                    id: l.id.clone(),
                    name: l.name.clone(),
                })
                .collect(),
            comments: story
                .comments
                .iter()
                .map(|c| CommentResponse {
                    id: c.id.clone(),
                    text: c.text.clone(),
                    author: c.author.as_ref().map(UserResponse::from),
                    created_at: c.created_at.map(format_timestamp),
                })
                .collect(),
            created_at: format_timestamp(story.created_at),
            updated_at: story.updated_at.map(format_timestamp),
            started_at: story.started_at.map(format_timestamp),
            delivered_at: story.delivered_at.map(format_timestamp),
            accepted_at: story.accepted_at.map(format_timestamp),
            rejected_at: story.rejected_at.map(format_timestamp),
            done_at: story.done_at.map(format_timestamp),
        }
    }
}

/// Maps a batch of responses, failing on the first story that cannot be mapped.
///
/// # Errors
///
/// Returns [`TrackerError::Mapping`] for malformed dates or estimates.
pub fn stories_from_responses(responses: Vec<StoryResponse>) -> Result<Vec<Story>> {
    responses.into_iter().map(Story::try_from).collect()
}

/// Applies the descriptive fields of `request` (`type`, `title`, `description`,
/// `code`, `estimate`) to a copy of `story`.
///
/// `state` and `location` are ignored here; they must go through the workflow
/// rules.
#[must_use]
pub fn apply_update_fields(story: &Story, request: &UpdateStoryRequest) -> Story {
    let mut updated = story.clone();

    if let Some(story_type) = request.story_type {
        updated.story_type = story_type;
    }
    if let Some(title) = &request.title {
        updated.title.clone_from(title);
    }
    if let Some(description) = &request.description {
        updated.description = Some(description.clone());
    }
    if let Some(code) = &request.code {
        updated.code = Some(code.clone());
    }
    if let Some(estimate) = request.estimate {
        updated.estimate = Some(estimate);
    }

    updated
}

/// Applies a whole update request to a copy of `story`.
///
/// Descriptive fields go first, so an estimate supplied together with a state
/// change counts toward the estimate policy. Then `state` goes through
/// [`StoryStateMachine::transition`] and finally `location` through the location
/// guard, which therefore sees the new state. `updated_at` is set to `now` when
/// anything changed.
///
/// # Errors
///
/// Returns the state machine's [`TrackerError::InvalidTransition`],
/// [`TrackerError::EstimateRequired`] or [`TrackerError::InvalidLocationChange`].
pub fn apply_update(
    machine: &StoryStateMachine,
    story: &Story,
    request: &UpdateStoryRequest,
    now: DateTime<Utc>,
) -> Result<Story> {
    let mut updated = apply_update_fields(story, request);

    if let Some(state) = request.state {
        updated = machine.transition(&updated, state, now)?;
    }
    if let Some(location) = request.location {
        updated = StoryStateMachine::move_to(&updated, location)?;
    }

    if updated != *story {
        updated.updated_at = Some(now);
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::Location;
    use chrono::TimeZone;

    fn response_json() -> &'static str {
        r#"{
            "id": "101",
            "title": "Password reset",
            "type": "bug",
            "location": "backlog",
            "state": "delivered",
            "estimate": 3,
            "requestor": { "id": "u1", "name": "Ada" },
            "owners": [{ "id": "u2", "name": "Grace", "email": "grace@example.com" }],
            "tasks": [{ "id": "t1", "description": "write test", "complete": true }],
            "blockers": [{ "id": "b1", "description": "needs SMTP" }],
            "labels": [{ "id": "l1", "name": "auth" }],
            "comments": [{ "id": "c1", "text": "on it", "createdAt": "2024-05-02T10:00:00+02:00" }],
            "createdAt": "2024-05-01T09:00:00Z",
            "startedAt": "2024-05-01T10:30:00.250Z",
            "deliveredAt": "2024-05-03T16:00:00Z"
        }"#
    }

    #[test]
    fn maps_full_response() {
        let response: StoryResponse = serde_json::from_str(response_json()).unwrap();
        let story = Story::try_from(response).unwrap();

        assert_eq!(story.id, StoryId::from("101"));
        assert_eq!(story.story_type, StoryType::Bug);
        assert_eq!(story.location, Location::Backlog);
        assert_eq!(story.state, StoryState::Delivered);
        assert_eq!(story.estimate, Some(StoryPoint::Three));
        assert_eq!(story.requester.as_ref().map(|u| u.name.as_str()), Some("Ada"));
        assert_eq!(story.owners[0].email.as_deref(), Some("grace@example.com"));
        assert!(story.tasks[0].complete);
        assert!(story.is_blocked());
        assert_eq!(story.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        assert_eq!(
            story.comments[0].created_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap())
        );
        assert!(story.accepted_at.is_none());
    }

    #[test]
    fn defaults_absent_type_and_state() {
        let response: StoryResponse = serde_json::from_str(
            r#"{ "id": "1", "title": "t", "location": "icebox", "createdAt": "2024-05-01T09:00:00Z" }"#,
        )
        .unwrap();
        let story = Story::try_from(response).unwrap();

        assert_eq!(story.story_type, StoryType::Feature);
        assert_eq!(story.state, StoryState::Unstarted);
        assert_eq!(story.estimate, None);
        assert!(story.requester.is_none());
    }

    #[test]
    fn rejects_malformed_dates_and_estimates() {
        let mut response: StoryResponse = serde_json::from_str(response_json()).unwrap();
        response.started_at = Some("yesterday".to_string());
        let err = Story::try_from(response).unwrap_err();
        assert!(matches!(err, TrackerError::Mapping(ref msg) if msg.contains("startedAt")));

        let mut response: StoryResponse = serde_json::from_str(response_json()).unwrap();
        response.estimate = Some(4);
        assert!(matches!(Story::try_from(response), Err(TrackerError::Mapping(_))));
    }

    #[test]
    fn outbound_mapping_uses_requestor_and_survives_the_boundary() {
        let response: StoryResponse = serde_json::from_str(response_json()).unwrap();
        let story = Story::try_from(response).unwrap();

        let outbound = StoryResponse::from(&story);
        assert_eq!(outbound.requestor.as_ref().map(|u| u.id.as_str()), Some("u1"));

        let json = serde_json::to_value(&outbound).unwrap();
        assert!(json.get("requestor").is_some());
        assert!(json.get("requester").is_none());

        assert_eq!(Story::try_from(outbound).unwrap(), story);
    }

    #[test]
    fn apply_update_fields_leaves_workflow_fields_alone() {
        let story = Story::new("9", "old", StoryType::Feature, Location::Icebox);
        let request = UpdateStoryRequest {
            title: Some("new".to_string()),
            estimate: Some(StoryPoint::Eight),
            state: Some(StoryState::Started),
            location: Some(Location::Backlog),
            ..UpdateStoryRequest::default()
        };

        let updated = apply_update_fields(&story, &request);

        assert_eq!(updated.title, "new");
        assert_eq!(updated.estimate, Some(StoryPoint::Eight));
        assert_eq!(updated.state, StoryState::Unstarted);
        assert_eq!(updated.location, Location::Icebox);
    }

    #[test]
    fn apply_update_routes_state_and_location_through_workflow() {
        let machine = StoryStateMachine::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let story = Story::new("9", "old", StoryType::Feature, Location::Backlog);

        let request = UpdateStoryRequest {
            title: Some("new".to_string()),
            ..UpdateStoryRequest::state(StoryState::Started)
        };
        let started = apply_update(&machine, &story, &request, now).unwrap();
        assert_eq!(started.state, StoryState::Started);
        assert_eq!(started.started_at, Some(now));
        assert_eq!(started.updated_at, Some(now));
        assert_eq!(started.title, "new");

        let to_icebox = UpdateStoryRequest::location(Location::Icebox);
        assert!(matches!(
            apply_update(&machine, &started, &to_icebox, now),
            Err(TrackerError::InvalidLocationChange { .. })
        ));

        let skip = UpdateStoryRequest::state(StoryState::Accepted);
        assert!(matches!(
            apply_update(&machine, &story, &skip, now),
            Err(TrackerError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn apply_update_without_changes_keeps_updated_at() {
        let machine = StoryStateMachine::default();
        let story = Story::new("9", "same", StoryType::Chore, Location::Icebox);
        let request = UpdateStoryRequest {
            title: Some("same".to_string()),
            ..UpdateStoryRequest::default()
        };

        let result = apply_update(&machine, &story, &request, Utc::now()).unwrap();
        assert_eq!(result, story);
    }
}
