//! Relocation of registered functions into the worker bootstrap module.
//!
//! [`register_worker_functions`] inserts every function of a
//! [`RegistrySnapshot`](offload_registry::RegistrySnapshot) into the
//! bootstrap module at its insertion marker, each followed by a call that
//! registers it with the worker's function lookup table.
//! [`WorkerRegistratorLoader`] is the host loader that parses the bootstrap
//! module, runs the rewrite and prints the result with a merged source map.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod rewriter;
pub mod uid;

pub use error::RewriteError;
pub use loader::{WorkerRegistratorLoader, EXTRACTION_PASS, REGISTRATOR_LOADER};
pub use rewriter::{function_id_object, register_worker_functions, RewriteSummary};
pub use uid::UidGenerator;
