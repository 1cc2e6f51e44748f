//! Story domain model.
//!
//! A [`Story`] is the unit of work on a board. It lives in exactly one
//! [`Location`] (icebox or backlog), moves through the workflow described by
//! [`StoryState`], and owns its tasks, blockers, labels and comments. Stories are
//! identified by a backend-assigned [`StoryId`] that never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend-assigned story identifier.
///
/// Opaque to this crate; ordered so it can key a `BTreeMap` and so error
/// payloads list offending ids deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Named bucket a story belongs to. Orthogonal to workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Icebox,
    Backlog,
}

impl Location {
    /// Every location, in board display order.
    pub const ALL: [Self; 2] = [Self::Icebox, Self::Backlog];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Icebox => "icebox",
            Self::Backlog => "backlog",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icebox" => Ok(Self::Icebox),
            "backlog" => Ok(Self::Backlog),
            other => Err(format!("unknown location '{other}'")),
        }
    }
}

/// Workflow stage of a story.
///
/// The happy path is `unstarted → started → finished → delivered → accepted → done`,
/// with `delivered → rejected → started` as the rework loop. Legal transitions
/// are enforced by [`StoryStateMachine`](crate::domain::workflow::StoryStateMachine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryState {
    Unstarted,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
    Done,
}

impl StoryState {
    pub const ALL: [Self; 7] = [
        Self::Unstarted,
        Self::Started,
        Self::Finished,
        Self::Delivered,
        Self::Accepted,
        Self::Rejected,
        Self::Done,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Delivered => "delivered",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == needle)
            .ok_or_else(|| format!("unknown story state '{needle}'"))
    }
}

/// Kind of work a story represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    Feature,
    Bug,
    Chore,
    Release,
}

/// Point estimate drawn from the fixed scale `{0, 1, 2, 3, 5, 8}`.
///
/// Serialized as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StoryPoint {
    Zero,
    One,
    Two,
    Three,
    Five,
    Eight,
}

impl StoryPoint {
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Five => 5,
            Self::Eight => 8,
        }
    }
}

impl TryFrom<u8> for StoryPoint {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            8 => Ok(Self::Eight),
            other => Err(format!("{other} is not a valid story point (expected 0, 1, 2, 3, 5 or 8)")),
        }
    }
}

impl From<StoryPoint> for u8 {
    fn from(point: StoryPoint) -> Self {
        point.value()
    }
}

/// Reference to a user. Carries no ownership semantics beyond list membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

impl UserRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }
}

/// Checklist item owned by a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub complete: bool,
}

/// Impediment recorded against a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    pub id: String,
    pub description: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: Option<UserRef>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A user story on the board.
///
/// Sub-collections (`tasks`, `blockers`, `labels`, `comments`) belong to the
/// story and never cross story boundaries. Lifecycle timestamps record the most
/// recent entry into the matching state and are never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub description: Option<String>,
    pub code: Option<String>,
    pub story_type: StoryType,
    pub location: Location,
    pub state: StoryState,
    pub estimate: Option<StoryPoint>,
    pub requester: Option<UserRef>,
    pub owners: Vec<UserRef>,
    pub tasks: Vec<Task>,
    pub blockers: Vec<Blocker>,
    pub labels: Vec<Label>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
}

impl Story {
    /// Creates an `unstarted` story in the given location.
    ///
    /// `created_at` is set to the current time; every lifecycle timestamp starts
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use trackboard::domain::{Location, Story, StoryState, StoryType};
    ///
    /// let story = Story::new("42", "Checkout flow", StoryType::Feature, Location::Icebox);
    /// assert_eq!(story.state, StoryState::Unstarted);
    /// assert!(story.started_at.is_none());
    /// ```
    pub fn new(
        id: impl Into<StoryId>,
        title: impl Into<String>,
        story_type: StoryType,
        location: Location,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            code: None,
            story_type,
            location,
            state: StoryState::Unstarted,
            estimate: None,
            requester: None,
            owners: Vec::new(),
            tasks: Vec::new(),
            blockers: Vec::new(),
            labels: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
            started_at: None,
            delivered_at: None,
            accepted_at: None,
            rejected_at: None,
            done_at: None,
        }
    }

    #[must_use]
    pub fn with_estimate(mut self, estimate: StoryPoint) -> Self {
        self.estimate = Some(estimate);
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: StoryState) -> Self {
        self.state = state;
        self
    }

    /// Returns `true` if any blocker is still unresolved.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blockers.iter().any(|b| !b.resolved)
    }

    /// Returns the timestamp recorded for the most recent entry into `state`.
    ///
    /// `unstarted` and `finished` carry no timestamp and always return `None`.
    #[must_use]
    pub fn entered_at(&self, state: StoryState) -> Option<DateTime<Utc>> {
        match state {
            StoryState::Started => self.started_at,
            StoryState::Delivered => self.delivered_at,
            StoryState::Accepted => self.accepted_at,
            StoryState::Rejected => self.rejected_at,
            StoryState::Done => self.done_at,
            StoryState::Unstarted | StoryState::Finished => None,
        }
    }
}
