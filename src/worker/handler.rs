//! Persistence worker executing board actions against a backend.
//!
//! The worker owns the [`StoryBackend`] and is meant to run off the interactive
//! thread. Each [`Action`] becomes exactly one backend call and one
//! [`PersistResponse`]; failures are reported, never retried.

use crate::app::Action;
use crate::domain::error::Result;
use crate::storage::backend::StoryBackend;
use crate::storage::models::StoryResponse;
use crate::worker::PersistResponse;

/// Executes persistence actions for one project.
pub struct PersistWorker {
    backend: Box<dyn StoryBackend>,
    project_id: String,
}

impl PersistWorker {
    /// Creates a worker persisting `project_id` through `backend`.
    pub fn new(backend: Box<dyn StoryBackend>, project_id: impl Into<String>) -> Self {
        Self {
            backend,
            project_id: project_id.into(),
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Fetches the project's stories for an initial board load.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub fn load(&self) -> Result<Vec<StoryResponse>> {
        let _span = tracing::debug_span!("worker_load", project_id = %self.project_id).entered();

        let stories = self.backend.list_stories(&self.project_id)?;
        tracing::debug!(story_count = stories.len(), "stories loaded from backend");
        Ok(stories)
    }

    /// Helper for converting backend results into responses with consistent
    /// logging.
    fn handle_backend_result<T, F>(operation: &str, result: Result<T>, on_success: F) -> PersistResponse
    where
        F: FnOnce(T) -> PersistResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "backend operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::debug!(operation = operation, error = %e, "backend operation failed");
                PersistResponse::Failed {
                    message: format!("{operation}: {e}"),
                }
            }
        }
    }

    /// Executes one action and returns the response to feed back to the board.
    pub fn execute(&mut self, action: &Action) -> PersistResponse {
        let _span = tracing::debug_span!("worker_execute", action = ?action).entered();

        match action {
            Action::PersistOrder(request) => Self::handle_backend_result(
                "reorder stories",
                self.backend.reorder_stories(&self.project_id, request),
                |stories| PersistResponse::OrderPersisted {
                    location: request.location,
                    stories,
                },
            ),
            Action::UpdateStory { story_id, request } => Self::handle_backend_result(
                "update story",
                self.backend.update_story(&self.project_id, story_id, request),
                |story| PersistResponse::StoryPersisted { story },
            ),
        }
    }

    /// Executes actions in order, one response per action.
    pub fn execute_all(&mut self, actions: &[Action]) -> Vec<PersistResponse> {
        actions.iter().map(|action| self.execute(action)).collect()
    }
}

impl std::fmt::Debug for PersistWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistWorker")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}
