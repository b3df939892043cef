//! Builds a worker bundle alongside the application bundle.
//!
//! The [`WorkerCoordinator`] is a host plugin. In every generation it
//! requests a secondary compilation whose single module is the worker
//! bootstrap module, loaded through the worker registrator loader so that
//! the functions application modules registered are relocated into it. The
//! [`DependencyTracker`] follows which application modules contribute
//! functions; the coordinator makes the worker module depend on them so it
//! is rebuilt when they change, and asks for an additional pass when a new
//! contributor appears after the worker was built.

#![warn(missing_docs)]

pub mod coordinator;
pub mod error;
pub mod options;
pub mod state;
pub mod tracker;

pub use coordinator::WorkerCoordinator;
pub use error::CoordinatorError;
pub use options::{WorkerOptions, WORKER_COMPILATION};
pub use state::{CoordinatorEvent, CoordinatorState};
pub use tracker::DependencyTracker;
