//! Structured logging for the board core.
//!
//! Every reducer, coordinator and backend entry point opens a `tracing` span with
//! structured fields; this module only wires those events to an output.
//!
//! # Configuration
//!
//! Trace level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! Set `json_logs` for one JSON object per line instead of the pretty format.
//!
//! # Modules
//!
//! - [`init`]: Tracing initialization and subscriber setup

mod init;

pub use init::init_tracing;
