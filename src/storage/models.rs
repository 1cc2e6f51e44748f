//! Wire models exchanged with the persistence collaborator.
//!
//! These types mirror the backend's JSON contract (camelCase field names, ISO
//! 8601 date-time strings) and are kept separate from the domain model so that
//! the boundary stays explicit. Conversion lives in [`super::mapping`].

use crate::domain::story::{Location, StoryId, StoryPoint, StoryState, StoryType};
use serde::{Deserialize, Serialize};

/// Outbound request replacing the ordering of one location.
///
/// This is also the persist instruction produced by the reorder coordinator:
/// one request per location whose ordering actually changed.
///
/// ```json
/// { "location": "backlog", "storyIds": ["D", "A", "E"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub location: Location,
    pub story_ids: Vec<StoryId>,
}

impl ReorderRequest {
    #[must_use]
    pub const fn new(location: Location, story_ids: Vec<StoryId>) -> Self {
        Self { location, story_ids }
    }
}

/// Outbound partial story update. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoryRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub story_type: Option<StoryType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<StoryPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StoryState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl UpdateStoryRequest {
    /// Request carrying only a state change.
    #[must_use]
    pub fn state(state: StoryState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Request carrying only a location change.
    #[must_use]
    pub fn location(location: Location) -> Self {
        Self {
            location: Some(location),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockerResponse {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Inbound full story representation.
///
/// Optional scalars and every sub-collection may be absent on the wire; the
/// mapping layer supplies defaults. Note the backend spells the requesting user
/// `requestor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub id: String,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub story_type: Option<StoryType>,

    pub location: Location,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StoryState>,

    /// Raw point value; validated against the fixed scale during mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requestor: Option<UserResponse>,

    #[serde(default)]
    pub owners: Vec<UserResponse>,

    #[serde(default)]
    pub tasks: Vec<TaskResponse>,

    #[serde(default)]
    pub blockers: Vec<BlockerResponse>,

    #[serde(default)]
    pub labels: Vec<LabelResponse>,

    #[serde(default)]
    pub comments: Vec<CommentResponse>,

    pub created_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<String>,
}
