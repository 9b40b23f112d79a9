//! Application-level orchestration.
//!
//! This module owns the submission lifecycle (validation, single-flight guard,
//! progress, result rendering) and what happens after a submission completes,
//! such as refreshing the history panel. UI/CLI layers call into this module to
//! keep responsibilities separated.

mod controller;
mod history_sync;

pub use controller::{Submit, SubmissionController};
pub(crate) use controller::{restore_record, run_controller, UiCommand};
pub use history_sync::HistorySynchronizer;
