//! The Source Map v3 JSON document.

use crate::error::SourceMapError;
use crate::mapping::{Mapping, OriginalLocation, Position};
use crate::vlq;
use serde::{Deserialize, Serialize};

/// A Source Map v3 document as stored next to an emitted bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    /// Format version; always 3.
    pub version: u32,
    /// Name of the generated file this map describes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Prefix joined onto every entry of `sources`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    /// Original source paths.
    pub sources: Vec<String>,
    /// Original texts, parallel to `sources`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources_content: Vec<Option<String>>,
    /// Identifier names referenced by mappings.
    #[serde(default)]
    pub names: Vec<String>,
    /// Base64 VLQ encoded mapping segments.
    pub mappings: String,
}

impl SourceMap {
    /// Parses a map from JSON.
    pub fn from_json(json: &str) -> Result<Self, SourceMapError> {
        let map: SourceMap = serde_json::from_str(json).map_err(|e| SourceMapError::Json {
            reason: e.to_string(),
        })?;
        if map.version != 3 {
            return Err(SourceMapError::UnsupportedVersion {
                version: map.version,
            });
        }
        Ok(map)
    }

    /// Serializes the map to compact JSON.
    pub fn to_json(&self) -> String {
        // A struct of strings and vectors always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// `sources` with `sourceRoot` applied.
    pub fn resolved_sources(&self) -> Vec<String> {
        match self.source_root.as_deref() {
            Some(root) if !root.is_empty() => self
                .sources
                .iter()
                .map(|s| format!("{}/{}", root.trim_end_matches('/'), s))
                .collect(),
            _ => self.sources.clone(),
        }
    }

    /// Content stored for the `index`th source.
    pub fn content_at(&self, index: usize) -> Option<&str> {
        self.sources_content.get(index).and_then(|c| c.as_deref())
    }

    /// Decodes `mappings` in the order they appear.
    pub fn decode_mappings(&self) -> Result<Vec<Mapping>, SourceMapError> {
        let sources = self.resolved_sources();
        let mut mappings = Vec::new();
        let mut source: i64 = 0;
        let mut original_line: i64 = 0;
        let mut original_column: i64 = 0;
        let mut name: i64 = 0;

        for (line_idx, line) in self.mappings.split(';').enumerate() {
            let generated_line = line_idx as u32 + 1;
            let mut generated_column: i64 = 0;
            for segment in line.split(',').filter(|s| !s.is_empty()) {
                let fields = vlq::decode_segment(segment)?;
                if !matches!(fields.len(), 1 | 4 | 5) {
                    return Err(SourceMapError::InvalidSegment {
                        line: generated_line,
                        fields: fields.len(),
                    });
                }
                generated_column += fields[0];
                let generated = Position::new(generated_line, generated_column.max(0) as u32);

                let original = if fields.len() >= 4 {
                    source += fields[1];
                    original_line += fields[2];
                    original_column += fields[3];
                    let source_path = usize::try_from(source)
                        .ok()
                        .and_then(|i| sources.get(i))
                        .ok_or(SourceMapError::SourceOutOfRange {
                            index: source,
                            len: sources.len(),
                        })?;
                    let name = if fields.len() == 5 {
                        name += fields[4];
                        let resolved = usize::try_from(name)
                            .ok()
                            .and_then(|i| self.names.get(i))
                            .ok_or(SourceMapError::NameOutOfRange {
                                index: name,
                                len: self.names.len(),
                            })?;
                        Some(resolved.clone())
                    } else {
                        None
                    };
                    Some(OriginalLocation {
                        source: source_path.clone(),
                        position: Position::new(
                            original_line.max(0) as u32 + 1,
                            original_column.max(0) as u32,
                        ),
                        name,
                    })
                } else {
                    None
                };
                mappings.push(Mapping {
                    generated,
                    original,
                });
            }
        }
        Ok(mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceMap {
        SourceMap {
            version: 3,
            file: Some("out.js".to_string()),
            source_root: None,
            sources: vec!["a.js".to_string(), "b.js".to_string()],
            sources_content: vec![Some("x();".to_string()), None],
            names: vec!["x".to_string()],
            // line 1: col 0 -> a.js 1:0 name x; col 4 -> b.js 2:2
            // line 3: col 2, generated only
            mappings: "AAAAA,ICCE;;E".to_string(),
        }
    }

    #[test]
    fn decode_relative_fields() {
        let mappings = sample().decode_mappings().unwrap();
        assert_eq!(mappings.len(), 3);

        let first = mappings[0].original.as_ref().unwrap();
        assert_eq!(first.source, "a.js");
        assert_eq!(first.position, Position::new(1, 0));
        assert_eq!(first.name.as_deref(), Some("x"));

        assert_eq!(mappings[1].generated, Position::new(1, 4));
        let second = mappings[1].original.as_ref().unwrap();
        assert_eq!(second.source, "b.js");
        assert_eq!(second.position, Position::new(2, 2));

        assert_eq!(mappings[2].generated, Position::new(3, 2));
        assert!(mappings[2].original.is_none());
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let json = sample().to_json();
        assert!(json.contains("\"sourcesContent\":[\"x();\",null]"));
        assert!(!json.contains("sourceRoot"));
        assert_eq!(SourceMap::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn from_json_rejects_other_versions() {
        let json = r#"{"version":2,"sources":[],"mappings":""}"#;
        assert!(matches!(
            SourceMap::from_json(json),
            Err(SourceMapError::UnsupportedVersion { version: 2 })
        ));
    }

    #[test]
    fn source_root_is_joined() {
        let mut map = sample();
        map.source_root = Some("src/".to_string());
        assert_eq!(map.resolved_sources(), vec!["src/a.js", "src/b.js"]);
    }

    #[test]
    fn out_of_range_source_is_an_error() {
        let mut map = sample();
        map.mappings = "AEAA".to_string();
        assert!(matches!(
            map.decode_mappings(),
            Err(SourceMapError::SourceOutOfRange { index: 2, .. })
        ));
    }
}
