//! Source Map v3: model, codec, builder, consumer and layered merging.
//!
//! The worker bundle's map is produced in layers. The printer emits a map from
//! the rewritten bootstrap module back to the module texts it was parsed from;
//! [`merge_source_maps`] then remaps that through the bootstrap module's own
//! upstream map and the per-module fragments of every relocated function.

#![warn(missing_docs)]

pub mod builder;
pub mod consumer;
pub mod error;
pub mod mapping;
pub mod merge;
pub mod raw;
pub mod vlq;

pub use builder::SourceMapBuilder;
pub use consumer::SourceMapConsumer;
pub use error::SourceMapError;
pub use mapping::{Mapping, OriginalLocation, Position};
pub use merge::{merge_source_maps, remove_source};
pub use raw::SourceMap;
