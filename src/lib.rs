//! Trackboard: the workflow and ordering core of a project/story tracker.
//!
//! Trackboard keeps a kanban-style board consistent while users drag stories
//! around and move them through their lifecycle:
//! - A story workflow state machine with lifecycle timestamps
//! - Drag-and-drop and explicit reordering within and across locations
//! - A location rule keeping in-flight stories out of the icebox
//! - Wire models and mapping for a JSON persistence collaborator
//! - A persistence worker that turns board actions into backend calls

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Embedder (UI + transport)                          │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │ Event
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Reducer
//! │  - Event handling                                   │
//! │  - Reorder coordination                             │
//! │  - Board snapshot and orderings                     │
//! └─────────────────────────────────────────────────────┘
//!                  │ Action               ↑ PersistResponse
//! ┌─────────────────────────────┐   ┌─────────────────────┐
//! │ Storage Layer (storage/)    │ ← │ Worker (worker/)    │
//! │ - Backend contract          │   │ - Action execution  │
//! │ - Wire models + mapping     │   │ - Failure reporting │
//! │ - In-memory backend         │   │                     │
//! └─────────────────────────────┘   └─────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain Layer (domain/)                             │
//! │  - Story model                                      │
//! │  - Workflow state machine                           │
//! │  - Error types                                      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Board state, reorder coordinator and event handler
//! - [`domain`]: Story model, workflow rules and errors
//! - [`storage`]: Persistence contract, wire models and mapping
//! - [`worker`]: Executes persistence actions against a backend
//! - [`observability`]: Tracing subscriber setup
//!
//! # Configuration
//!
//! ```toml
//! trace_level = "debug"
//! json_logs = false
//! require_estimate = true
//! ```
//!
//! # Examples
//!
//! ```
//! use trackboard::app::{handle_event, DragResult, Event};
//! use trackboard::domain::{Location, Story, StoryType};
//! use trackboard::storage::InMemoryBackend;
//! use trackboard::worker::PersistWorker;
//! use trackboard::{initialize, Config};
//!
//! let mut backend = InMemoryBackend::new("p1");
//! for id in ["A", "B", "C"] {
//!     backend.add_story(Story::new(id, id, StoryType::Feature, Location::Icebox));
//! }
//! let mut worker = PersistWorker::new(Box::new(backend), "p1");
//!
//! let mut state = initialize(&Config::default(), "p1");
//! handle_event(&mut state, &Event::StoriesLoaded(worker.load()?))?;
//!
//! let drag = DragResult::new(Location::Icebox, 0, Location::Backlog, 0);
//! let (_, actions) = handle_event(&mut state, &Event::Drag(drag))?;
//! for response in worker.execute_all(&actions) {
//!     handle_event(&mut state, &Event::Persisted(response))?;
//! }
//!
//! assert_eq!(state.snapshot.ordering(Location::Backlog).len(), 1);
//! # Ok::<(), trackboard::TrackerError>(())
//! ```

pub mod app;
pub mod domain;
pub mod observability;
pub mod storage;
pub mod worker;

pub use app::{handle_event, Action, BoardSnapshot, BoardState, DragResult, Event, ReorderCoordinator};
pub use domain::{Result, TrackerError};

use domain::{StoryStateMachine, WorkflowPolicy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Runtime configuration.
///
/// Can be built from a flat key/value map (as handed over by a host
/// application) or from a TOML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Tracing level directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any `EnvFilter`
    /// directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Require features to be estimated before they leave `unstarted`.
    pub require_estimate: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    trace_level: Option<String>,
    json_logs: bool,
    require_estimate: bool,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            trace_level: raw.trace_level,
            json_logs: raw.json_logs,
            require_estimate: raw.require_estimate,
        }
    }
}

fn parse_flag(value: Option<&String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
}

impl Config {
    /// Parses configuration from a string key/value map.
    ///
    /// Extracts typed values with fallback defaults; unrecognised keys are
    /// ignored.
    ///
    /// # Parsing Rules
    ///
    /// - `trace_level`: String → `Option<String>`
    /// - `json_logs`, `require_estimate`: `true`/`1`/`yes`/`on` → `true`, anything else → `false`
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use trackboard::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("require_estimate".to_string(), "yes".to_string());
    /// map.insert("trace_level".to_string(), "debug".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert!(config.require_estimate);
    /// assert!(!config.json_logs);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        Self {
            trace_level: config
                .get("trace_level")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            json_logs: parse_flag(config.get("json_logs")),
            require_estimate: parse_flag(config.get("require_estimate")),
        }
    }

    /// Parses configuration from a TOML document.
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Config`] for malformed TOML, wrongly typed values
    /// or unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str::<RawConfig>(contents)
            .map(Self::from)
            .map_err(|e| TrackerError::Config(e.to_string()))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Io`] if the file cannot be read and
    /// [`TrackerError::Config`] if it cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&contents)
    }

    /// Workflow rules selected by this configuration.
    #[must_use]
    pub const fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            require_estimate: self.require_estimate,
        }
    }
}

/// Creates an empty board for `project_id` with the configured workflow rules.
///
/// Populate it by feeding [`Event::StoriesLoaded`] to [`handle_event`].
///
/// # Example
///
/// ```
/// use trackboard::{initialize, Config};
///
/// let config = Config {
///     require_estimate: true,
///     ..Default::default()
/// };
///
/// let state = initialize(&config, "p1");
/// assert!(state.snapshot.is_empty());
/// assert!(state.machine.policy().require_estimate);
/// ```
pub fn initialize(config: &Config, project_id: impl Into<String>) -> BoardState {
    let project_id = project_id.into();
    tracing::debug!(project_id = %project_id, require_estimate = config.require_estimate, "initializing board");

    BoardState::new(project_id, StoryStateMachine::new(config.workflow_policy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_map_falls_back_to_defaults() {
        let mut map = BTreeMap::new();
        map.insert("json_logs".to_string(), "maybe".to_string());
        map.insert("trace_level".to_string(), "  ".to_string());
        map.insert("unrelated".to_string(), "x".to_string());

        assert_eq!(Config::from_map(&map), Config::default());
    }

    #[test]
    fn from_toml_str_reads_known_keys() {
        let config = Config::from_toml_str("trace_level = \"trace\"\nrequire_estimate = true\n").unwrap();

        assert_eq!(config.trace_level.as_deref(), Some("trace"));
        assert!(config.require_estimate);
        assert!(!config.json_logs);
    }

    #[test]
    fn from_toml_str_rejects_unknown_and_mistyped_keys() {
        assert!(matches!(Config::from_toml_str("colour = \"red\""), Err(TrackerError::Config(_))));
        assert!(matches!(Config::from_toml_str("json_logs = \"yes\""), Err(TrackerError::Config(_))));
    }

    #[test]
    fn load_reads_file_and_reports_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "json_logs = true").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.json_logs);

        let dir = tempfile::tempdir().unwrap();
        let missing = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(TrackerError::Io(_))));
    }

    #[test]
    fn initialize_applies_policy() {
        let config = Config {
            require_estimate: true,
            ..Config::default()
        };
        let state = initialize(&config, "p1");

        assert_eq!(state.project_id, "p1");
        assert!(state.machine.policy().require_estimate);
    }
}
