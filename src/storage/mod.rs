//! Storage layer: the persistence contract and its wire models.
//!
//! The board core persists through the [`StoryBackend`] trait and speaks to it in
//! wire models that mirror the backend's JSON contract. Mapping between those and
//! the domain model is kept in one place.
//!
//! # Modules
//!
//! - `backend`: Persistence contract implemented by embedders
//! - `memory`: In-process reference backend
//! - `mapping`: Wire ↔ domain conversion and update application
//! - `models`: Wire types separate from domain models

pub mod backend;
pub mod mapping;
pub mod memory;
pub mod models;

pub use backend::StoryBackend;
pub use mapping::{apply_update, apply_update_fields, stories_from_responses};
pub use memory::InMemoryBackend;
pub use models::{
    BlockerResponse, CommentResponse, LabelResponse, ReorderRequest, StoryResponse, TaskResponse,
    UpdateStoryRequest, UserResponse,
};
