//! Persistence worker for executing board actions off the interactive thread.
//!
//! # Architecture
//!
//! - `messages`: Response protocol fed back into the board as events
//! - `handler`: Worker that runs [`crate::app::Action`]s against a backend

pub mod handler;
pub mod messages;

pub use handler::PersistWorker;
pub use messages::PersistResponse;
