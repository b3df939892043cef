//! Incremental construction and rewriting of mapping sets.

use crate::consumer::SourceMapConsumer;
use crate::error::SourceMapError;
use crate::mapping::{Mapping, OriginalLocation};
use crate::raw::SourceMap;
use crate::vlq;
use std::collections::{BTreeMap, HashMap};

/// Accumulates mappings and source contents, then encodes a [`SourceMap`].
///
/// Mappings may be added in any order; [`build`](Self::build) sorts them by
/// generated position, so the same mapping set always encodes identically.
#[derive(Clone, Debug, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    mappings: Vec<Mapping>,
    contents: BTreeMap<String, String>,
}

impl SourceMapBuilder {
    /// Creates an empty builder for the generated file `file`.
    pub fn new(file: Option<String>) -> Self {
        Self {
            file,
            mappings: Vec::new(),
            contents: BTreeMap::new(),
        }
    }

    /// Starts from every mapping and embedded content of an existing map.
    pub fn from_source_map(map: &SourceMap) -> Result<Self, SourceMapError> {
        let consumer = SourceMapConsumer::new(map)?;
        let mut builder = Self::new(map.file.clone());
        builder.mappings = consumer.mappings().to_vec();
        for (source, content) in consumer.source_contents() {
            builder.set_source_content(source, content);
        }
        Ok(builder)
    }

    /// Adds one mapping.
    pub fn add_mapping(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
    }

    /// Embeds the text of `source`.
    pub fn set_source_content(&mut self, source: impl Into<String>, content: impl Into<String>) {
        self.contents.insert(source.into(), content.into());
    }

    /// Mappings added so far, in insertion order.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Remaps every mapping whose source is `source_file` through `consumer`.
    ///
    /// `source_file` defaults to the consumer's `file`. A mapping with no
    /// counterpart in the applied map is kept as it is. Contents embedded in
    /// the applied map are carried over.
    pub fn apply_source_map(
        &mut self,
        consumer: &SourceMapConsumer,
        source_file: Option<&str>,
    ) -> Result<(), SourceMapError> {
        let key = source_file
            .or_else(|| consumer.file())
            .ok_or(SourceMapError::MissingFile)?
            .to_string();

        let mut remapped = 0usize;
        for mapping in &mut self.mappings {
            let Some(original) = &mut mapping.original else {
                continue;
            };
            if original.source != key {
                continue;
            }
            if let Some(found) = consumer.original_position_for(original.position) {
                let name = found.name.clone().or_else(|| original.name.take());
                *original = OriginalLocation {
                    source: found.source.clone(),
                    position: found.position,
                    name,
                };
                remapped += 1;
            }
        }
        tracing::trace!(source = %key, remapped, "applied source map");

        for (source, content) in consumer.source_contents() {
            self.set_source_content(source, content);
        }
        Ok(())
    }

    /// Drops every mapping, and the content, of `source`.
    pub fn remove_source(&mut self, source: &str) {
        self.mappings.retain(|m| m.source() != Some(source));
        self.contents.remove(source);
    }

    /// Appends the mappings of `map` shifted down by `line_offset` generated lines.
    pub fn append_map(&mut self, map: &SourceMap, line_offset: u32) -> Result<(), SourceMapError> {
        let consumer = SourceMapConsumer::new(map)?;
        for mapping in consumer.mappings() {
            let mut shifted = mapping.clone();
            shifted.generated.line += line_offset;
            self.mappings.push(shifted);
        }
        for (source, content) in consumer.source_contents() {
            self.set_source_content(source, content);
        }
        Ok(())
    }

    /// Encodes the accumulated mappings.
    ///
    /// `sources` and `names` are listed in order of first use; contents are
    /// emitted only for sources some mapping still refers to.
    pub fn build(mut self) -> SourceMap {
        self.mappings.sort_by_key(|m| m.generated);
        self.mappings.dedup();

        let mut sources: Vec<String> = Vec::new();
        let mut source_index: HashMap<String, i64> = HashMap::new();
        let mut names: Vec<String> = Vec::new();
        let mut name_index: HashMap<String, i64> = HashMap::new();

        let mut out = String::new();
        let mut line = 1u32;
        let mut first_on_line = true;
        let mut prev_column: i64 = 0;
        let mut prev_source: i64 = 0;
        let mut prev_original_line: i64 = 0;
        let mut prev_original_column: i64 = 0;
        let mut prev_name: i64 = 0;

        for mapping in &self.mappings {
            while line < mapping.generated.line {
                out.push(';');
                line += 1;
                prev_column = 0;
                first_on_line = true;
            }
            if !first_on_line {
                out.push(',');
            }
            first_on_line = false;

            let column = i64::from(mapping.generated.column);
            vlq::encode(column - prev_column, &mut out);
            prev_column = column;

            let Some(original) = &mapping.original else {
                continue;
            };
            let source = *source_index
                .entry(original.source.clone())
                .or_insert_with(|| {
                    sources.push(original.source.clone());
                    sources.len() as i64 - 1
                });
            vlq::encode(source - prev_source, &mut out);
            prev_source = source;

            let original_line = i64::from(original.position.line.saturating_sub(1));
            vlq::encode(original_line - prev_original_line, &mut out);
            prev_original_line = original_line;

            let original_column = i64::from(original.position.column);
            vlq::encode(original_column - prev_original_column, &mut out);
            prev_original_column = original_column;

            if let Some(name) = &original.name {
                let name = *name_index.entry(name.clone()).or_insert_with(|| {
                    names.push(name.clone());
                    names.len() as i64 - 1
                });
                vlq::encode(name - prev_name, &mut out);
                prev_name = name;
            }
        }

        let sources_content = if sources.iter().any(|s| self.contents.contains_key(s)) {
            sources.iter().map(|s| self.contents.get(s).cloned()).collect()
        } else {
            Vec::new()
        };

        SourceMap {
            version: 3,
            file: self.file,
            source_root: None,
            sources,
            sources_content,
            names,
            mappings: out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Position;

    fn mapping(gen: (u32, u32), source: &str, orig: (u32, u32)) -> Mapping {
        Mapping::new(
            Position::new(gen.0, gen.1),
            source,
            Position::new(orig.0, orig.1),
        )
    }

    #[test]
    fn build_sorts_and_encodes() {
        let mut b = SourceMapBuilder::new(Some("out.js".to_string()));
        b.add_mapping(mapping((3, 2), "b.js", (1, 0)));
        b.add_mapping(mapping((1, 0), "a.js", (1, 0)).with_name("x"));
        let map = b.build();
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
        assert_eq!(map.names, vec!["x"]);
        assert_eq!(map.mappings, "AAAAA;;ECAA");
    }

    #[test]
    fn build_then_decode_preserves_mappings() {
        let mut b = SourceMapBuilder::new(None);
        b.add_mapping(mapping((1, 4), "f.js", (3, 29)).with_name("value"));
        b.add_mapping(mapping((2, 0), "bootstrap.js", (2, 0)));
        let map = b.build();
        let decoded = map.decode_mappings().unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].generated, Position::new(1, 4));
        let original = decoded[0].original.as_ref().unwrap();
        assert_eq!(original.position, Position::new(3, 29));
        assert_eq!(original.name.as_deref(), Some("value"));
    }

    #[test]
    fn duplicate_mappings_encode_once() {
        let mut b = SourceMapBuilder::new(None);
        b.add_mapping(mapping((1, 0), "a.js", (1, 0)));
        b.add_mapping(mapping((1, 0), "a.js", (1, 0)));
        assert_eq!(b.build().mappings, "AAAA");
    }

    #[test]
    fn contents_only_for_used_sources() {
        let mut b = SourceMapBuilder::new(None);
        b.add_mapping(mapping((1, 0), "a.js", (1, 0)));
        b.set_source_content("a.js", "run();");
        b.set_source_content("unused.js", "nothing();");
        let map = b.build();
        assert_eq!(map.sources_content, vec![Some("run();".to_string())]);
    }

    #[test]
    fn apply_remaps_matching_source_only() {
        let mut b = SourceMapBuilder::new(None);
        b.add_mapping(mapping((1, 0), "bootstrap.js", (1, 0)));
        b.add_mapping(mapping((2, 0), "f.js", (3, 29)));

        let mut upstream = SourceMapBuilder::new(Some("bootstrap.js".to_string()));
        upstream.add_mapping(mapping((1, 0), "bootstrap.ts", (4, 2)).with_name("table"));
        upstream.set_source_content("bootstrap.ts", "// ts");
        let upstream = SourceMapConsumer::new(&upstream.build()).unwrap();

        b.apply_source_map(&upstream, None).unwrap();
        let first = b.mappings()[0].original.as_ref().unwrap();
        assert_eq!(first.source, "bootstrap.ts");
        assert_eq!(first.position, Position::new(4, 2));
        assert_eq!(first.name.as_deref(), Some("table"));
        assert_eq!(b.mappings()[1].source(), Some("f.js"));

        let map = b.build();
        assert_eq!(map.sources, vec!["bootstrap.ts", "f.js"]);
        assert_eq!(map.sources_content[0].as_deref(), Some("// ts"));
    }

    #[test]
    fn apply_keeps_unmatched_mappings() {
        let mut b = SourceMapBuilder::new(None);
        b.add_mapping(mapping((1, 0), "bootstrap.js", (7, 0)));
        let mut upstream = SourceMapBuilder::new(None);
        upstream.add_mapping(mapping((1, 0), "bootstrap.ts", (1, 0)));
        let upstream = SourceMapConsumer::new(&upstream.build()).unwrap();

        b.apply_source_map(&upstream, Some("bootstrap.js")).unwrap();
        assert_eq!(b.mappings()[0].source(), Some("bootstrap.js"));
    }

    #[test]
    fn apply_without_file_is_an_error() {
        let mut b = SourceMapBuilder::new(None);
        let consumer = SourceMapConsumer::new(&SourceMapBuilder::new(None).build()).unwrap();
        assert!(matches!(
            b.apply_source_map(&consumer, None),
            Err(SourceMapError::MissingFile)
        ));
    }

    #[test]
    fn append_map_shifts_lines() {
        let mut part = SourceMapBuilder::new(None);
        part.add_mapping(mapping((1, 0), "a.js", (1, 0)));
        let part = part.build();

        let mut bundle = SourceMapBuilder::new(Some("main.js".to_string()));
        bundle.append_map(&part, 2).unwrap();
        assert_eq!(bundle.mappings()[0].generated, Position::new(3, 0));
    }

    #[test]
    fn remove_source_drops_mappings_and_content() {
        let mut b = SourceMapBuilder::new(None);
        b.add_mapping(mapping((1, 0), "bootstrap.js", (1, 0)));
        b.add_mapping(mapping((2, 0), "f.js", (1, 0)));
        b.set_source_content("bootstrap.js", "x");
        b.remove_source("bootstrap.js");
        let map = b.build();
        assert_eq!(map.sources, vec!["f.js"]);
        assert!(map.sources_content.is_empty());
    }
}
