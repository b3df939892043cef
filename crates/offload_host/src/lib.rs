//! An in-memory module-graph build host.
//!
//! A [`Compiler`] runs generations over a [`MemoryFs`]. Each generation
//! builds the primary [`Compilation`] from the configured entries, following
//! relative imports, runs the loaders named in each request and the project's
//! syntax passes, and bundles the result with a source map. Modules whose file
//! dependencies did not change are reused from the [`offload_cache`] module
//! cache.
//!
//! [`Plugin`]s hook into the lifecycle. A plugin may request a child
//! compilation in `make`; it runs at the point chosen by [`ChildSchedule`]
//! and its assets are emitted next to the primary bundle. After a generation
//! plugins may request an additional pass, which the compiler runs
//! immediately.

#![warn(missing_docs)]

mod build;
pub mod compilation;
pub mod compiler;
pub mod error;
pub mod fs;
pub mod loader;
pub mod module;
pub mod plugin;
pub mod request;

pub use compilation::{ChildHandle, Compilation, CompilationKind};
pub use compiler::{ChildSchedule, Compiler, HostConfig, Stats, PRIMARY_COMPILATION};
pub use error::{BoxError, HostError};
pub use fs::{FsFile, MemoryFs};
pub use loader::{LoadedSource, Loader, LoaderContext, PassContext, PassTable, SyntaxPass};
pub use module::{Module, ModuleStatus};
pub use plugin::{ChildCompilationRequest, CompilerSetup, Plugin};
pub use request::{LoaderRequest, Request};
