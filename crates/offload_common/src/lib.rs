//! Shared foundational types for the offload build pipeline.
//!
//! Interned identifiers for syntax trees, content hashes for module cache
//! snapshots, and the internal error type used for coordination bugs.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, OffloadResult};
