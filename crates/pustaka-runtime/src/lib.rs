//! Pustaka Runtime: per-document orchestration, fallback policy, progress.
//!
//! The orchestrator owns a document for the duration of one pass and moves
//! it through `pending → processing → completed | failed`.

pub mod orchestrator;
pub mod progress;
pub mod types;

pub use orchestrator::Orchestrator;
pub use progress::{NoopProgress, ProcessingStage, ProgressSink, ProgressSnapshot, ProgressTracker};
pub use types::*;
