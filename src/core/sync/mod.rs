//! Pipeline orchestration and run reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::{Phase, PipelineFailure, SyncCoordinator};
pub use summary::SyncSummary;
