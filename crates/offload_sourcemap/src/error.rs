//! Error types for source map decoding and merging.

/// Errors produced while reading, decoding or combining source maps.
#[derive(Debug, thiserror::Error)]
pub enum SourceMapError {
    /// The map is not valid JSON or lacks required fields.
    #[error("invalid source map JSON: {reason}")]
    Json {
        /// Description of the parse error.
        reason: String,
    },

    /// Only version 3 maps are understood.
    #[error("unsupported source map version {version}")]
    UnsupportedVersion {
        /// The version found in the map.
        version: u32,
    },

    /// A `mappings` segment contains a character outside base64 or ends mid-value.
    #[error("invalid VLQ segment '{segment}'")]
    InvalidVlq {
        /// The offending segment text.
        segment: String,
    },

    /// A segment has a field count other than 1, 4 or 5.
    #[error("mapping segment on generated line {line} has {fields} fields")]
    InvalidSegment {
        /// 1-based generated line of the segment.
        line: u32,
        /// Number of fields decoded.
        fields: usize,
    },

    /// A segment refers to a source index outside `sources`.
    #[error("source index {index} out of range ({len} sources)")]
    SourceOutOfRange {
        /// The decoded index.
        index: i64,
        /// Length of `sources`.
        len: usize,
    },

    /// A segment refers to a name index outside `names`.
    #[error("name index {index} out of range ({len} names)")]
    NameOutOfRange {
        /// The decoded index.
        index: i64,
        /// Length of `names`.
        len: usize,
    },

    /// `apply_source_map` was given neither a target file nor a map with `file`.
    #[error("cannot apply a source map that names no file")]
    MissingFile,
}
