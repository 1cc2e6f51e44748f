//! Response types sent from the persistence worker back to the board.
//!
//! Responses carry wire models rather than domain types so they can cross a
//! thread or process boundary as JSON; the event handler maps them on arrival.

use crate::domain::story::Location;
use crate::storage::models::StoryResponse;
use serde::{Deserialize, Serialize};

/// Outcome of executing one [`crate::app::Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PersistResponse {
    /// A location ordering was stored.
    OrderPersisted {
        /// Location whose ordering was replaced.
        location: Location,

        /// The backend's canonical list for that location, in order.
        stories: Vec<StoryResponse>,
    },

    /// A story update was stored.
    StoryPersisted {
        /// The story as the backend now holds it.
        story: StoryResponse,
    },

    /// The backend rejected the request or could not be reached.
    Failed {
        /// Human-readable error message.
        message: String,
    },
}

impl PersistResponse {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_are_tagged_on_the_wire() {
        let failed = PersistResponse::Failed {
            message: "reorder stories: backend unavailable".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();

        assert_eq!(json["kind"], "failed");
        assert!(failed.is_failure());

        let back: PersistResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, failed);
    }
}
