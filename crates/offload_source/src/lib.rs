//! Source text ownership and location tracking.
//!
//! The [`SourceDb`] owns every module text a build session has parsed,
//! [`Span`]s point into it, and [`SourceFile::position`] converts offsets into
//! the line/column pairs source maps use.

#![warn(missing_docs)]

pub mod file_id;
pub mod resolved_span;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use resolved_span::ResolvedSpan;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
