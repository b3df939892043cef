//! Registry of functions extracted from application modules.
//!
//! Application modules that hand functions to the parallel-execution
//! capability publish them here while they are built; the worker bundle's
//! bootstrap module reads them back when it is transformed. Producers hold a
//! [`RegistrySender`] and send [`RegistryEvent`]s; the single consumer, a
//! [`FunctionRegistry`], applies queued events whenever it is read, so the
//! moment a reader observes the producers is always an explicit call.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod id;
pub mod registry;

pub use entry::{ExtractedFunction, FunctionEntry, RegisteredModule};
pub use error::RegistryError;
pub use id::FunctionId;
pub use registry::{
    CapabilityUsers, FunctionRegistry, RegistryEvent, RegistrySender, RegistrySnapshot,
};
