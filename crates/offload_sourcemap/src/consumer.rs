//! Lookup of original positions in a decoded map.

use crate::error::SourceMapError;
use crate::mapping::{Mapping, OriginalLocation, Position};
use crate::raw::SourceMap;
use std::collections::BTreeMap;

/// A decoded map indexed by generated position.
pub struct SourceMapConsumer {
    file: Option<String>,
    sources: Vec<String>,
    contents: BTreeMap<String, String>,
    mappings: Vec<Mapping>,
}

impl SourceMapConsumer {
    /// Decodes `map`.
    pub fn new(map: &SourceMap) -> Result<Self, SourceMapError> {
        if map.version != 3 {
            return Err(SourceMapError::UnsupportedVersion {
                version: map.version,
            });
        }
        let mut mappings = map.decode_mappings()?;
        mappings.sort_by_key(|m| m.generated);

        let sources = map.resolved_sources();
        let contents = sources
            .iter()
            .enumerate()
            .filter_map(|(i, source)| {
                map.content_at(i)
                    .map(|content| (source.clone(), content.to_string()))
            })
            .collect();

        Ok(Self {
            file: map.file.clone(),
            sources,
            contents,
            mappings,
        })
    }

    /// The `file` the map describes.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Source paths with `sourceRoot` applied.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// All mappings sorted by generated position.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Finds the original location of a generated position.
    ///
    /// Uses the closest mapping at or before `generated` on the same line.
    /// Returns `None` when there is no such mapping or it is generated-only.
    pub fn original_position_for(&self, generated: Position) -> Option<&OriginalLocation> {
        let mut idx = self.mappings.partition_point(|m| m.generated <= generated);
        if idx == 0 {
            return None;
        }
        idx -= 1;
        let found = self.mappings[idx].generated;
        if found.line != generated.line {
            return None;
        }
        while idx > 0 && self.mappings[idx - 1].generated == found {
            idx -= 1;
        }
        self.mappings[idx].original.as_ref()
    }

    /// The stored text of `source`, if the map embeds it.
    pub fn source_content_for(&self, source: &str) -> Option<&str> {
        self.contents.get(source).map(String::as_str)
    }

    /// Every `(source, content)` pair embedded in the map.
    pub fn source_contents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.contents.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumer() -> SourceMapConsumer {
        let map = SourceMap {
            version: 3,
            file: Some("worker.js".to_string()),
            source_root: None,
            sources: vec!["f.js".to_string()],
            sources_content: vec![Some("const f = value => value * 2;".to_string())],
            names: vec!["value".to_string()],
            // line 1: col 0 -> f.js 1:10; col 20 -> f.js 1:10 name value
            // line 2: col 4 generated only
            mappings: "AAAU,oBAAAA;I".to_string(),
        };
        SourceMapConsumer::new(&map).unwrap()
    }

    #[test]
    fn exact_lookup() {
        let c = consumer();
        let found = c.original_position_for(Position::new(1, 20)).unwrap();
        assert_eq!(found.position, Position::new(1, 10));
        assert_eq!(found.name.as_deref(), Some("value"));
    }

    #[test]
    fn greatest_lower_bound_on_same_line() {
        let c = consumer();
        let found = c.original_position_for(Position::new(1, 25)).unwrap();
        assert_eq!(found.name.as_deref(), Some("value"));
        let found = c.original_position_for(Position::new(1, 3)).unwrap();
        assert_eq!(found.name, None);
    }

    #[test]
    fn no_match_on_other_lines() {
        let c = consumer();
        assert!(c.original_position_for(Position::new(2, 0)).is_none());
        assert!(c.original_position_for(Position::new(5, 0)).is_none());
    }

    #[test]
    fn contents_are_indexed_by_source() {
        let c = consumer();
        assert_eq!(c.file(), Some("worker.js"));
        assert_eq!(
            c.source_content_for("f.js"),
            Some("const f = value => value * 2;")
        );
        assert!(c.source_content_for("g.js").is_none());
    }
}
