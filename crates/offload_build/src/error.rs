//! Coordinator errors.

use offload_common::InternalError;

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The secondary compilation does not contain the worker module.
    #[error("worker module not found in secondary compilation")]
    WorkerModuleNotFound {
        /// The worker request that was looked up.
        request: String,
    },

    /// The host called hooks in an order the coordinator cannot follow.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
