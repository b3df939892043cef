//! Module cache for incremental builds.
//!
//! Built modules are cached per compilation namespace and raw request,
//! together with a content-hash snapshot of every file they declared as a
//! dependency. A cached module is reused only while every declared
//! dependency is present in its snapshot with an unchanged hash. The cache
//! can be persisted as a JSON manifest.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod manifest;
pub mod module;
pub mod snapshot;

pub use cache::ModuleCache;
pub use error::CacheError;
pub use manifest::CacheManifest;
pub use module::{CachedModule, ModuleArtifact};
pub use snapshot::{take_snapshot, ChangeSet, FileHashes};
