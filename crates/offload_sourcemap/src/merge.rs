//! Layered merging of the worker bootstrap module's maps.

use crate::builder::SourceMapBuilder;
use crate::consumer::SourceMapConsumer;
use crate::error::SourceMapError;
use crate::raw::SourceMap;

/// Combines the maps of a rewritten module into one.
///
/// `generated` maps the printed output back to the texts it was parsed from.
/// `upstream` is the map that came with the module's own text (keyed on
/// `file_path`). Each fragment maps the output of an earlier transform of an
/// originating module back to that module's authored source.
///
/// When an upstream map is given, mappings that still point at `file_path`
/// after remapping are dropped, so the intermediate module never appears in
/// `sources`. Returns `None` when there is no generated map.
pub fn merge_source_maps<'a>(
    file_path: &str,
    upstream: Option<&SourceMap>,
    generated: Option<&SourceMap>,
    fragments: impl IntoIterator<Item = (&'a str, &'a SourceMap)>,
) -> Result<Option<SourceMap>, SourceMapError> {
    let Some(generated) = generated else {
        return Ok(None);
    };
    let mut builder = SourceMapBuilder::from_source_map(generated)?;

    if let Some(upstream) = upstream {
        builder.apply_source_map(&SourceMapConsumer::new(upstream)?, Some(file_path))?;
    }
    for (origin, fragment) in fragments {
        builder.apply_source_map(&SourceMapConsumer::new(fragment)?, Some(origin))?;
    }
    if upstream.is_some() {
        builder.remove_source(file_path);
    }
    Ok(Some(builder.build()))
}

/// Returns `map` without any mapping or content for `source`.
pub fn remove_source(source: &str, map: &SourceMap) -> Result<SourceMap, SourceMapError> {
    let mut builder = SourceMapBuilder::from_source_map(map)?;
    builder.remove_source(source);
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Mapping, Position};

    fn map_of(file: Option<&str>, entries: &[((u32, u32), &str, (u32, u32))]) -> SourceMap {
        let mut b = SourceMapBuilder::new(file.map(str::to_string));
        for (gen, source, orig) in entries {
            b.add_mapping(Mapping::new(
                Position::new(gen.0, gen.1),
                *source,
                Position::new(orig.0, orig.1),
            ));
        }
        b.build()
    }

    #[test]
    fn no_generated_map_yields_none() {
        let merged = merge_source_maps("worker/bootstrap.js", None, None, []).unwrap();
        assert!(merged.is_none());
    }

    #[test]
    fn without_upstream_the_bootstrap_path_stays() {
        let generated = map_of(None, &[((1, 0), "worker/bootstrap.js", (1, 0))]);
        let merged = merge_source_maps("worker/bootstrap.js", None, Some(&generated), [])
            .unwrap()
            .unwrap();
        assert_eq!(merged.sources, vec!["worker/bootstrap.js"]);
    }

    #[test]
    fn upstream_removes_intermediate_path() {
        let generated = map_of(
            None,
            &[
                ((1, 0), "worker/bootstrap.js", (1, 0)),
                ((2, 0), "worker/bootstrap.js", (9, 0)),
                ((3, 0), "src/f.js", (3, 29)),
            ],
        );
        // Only line 1 of the bootstrap has an upstream counterpart.
        let upstream = map_of(None, &[((1, 0), "worker/bootstrap.ts", (2, 4))]);
        let merged = merge_source_maps("worker/bootstrap.js", Some(&upstream), Some(&generated), [])
            .unwrap()
            .unwrap();
        assert!(!merged.sources.iter().any(|s| s == "worker/bootstrap.js"));
        assert_eq!(merged.sources, vec!["worker/bootstrap.ts", "src/f.js"]);
    }

    #[test]
    fn fragments_remap_their_origin() {
        let generated = map_of(None, &[((1, 0), "build/f.js", (5, 2))]);
        let fragment = map_of(None, &[((5, 0), "src/f.ts", (3, 29))]);
        let merged = merge_source_maps(
            "worker/bootstrap.js",
            None,
            Some(&generated),
            [("build/f.js", &fragment)],
        )
        .unwrap()
        .unwrap();
        let decoded = merged.decode_mappings().unwrap();
        let original = decoded[0].original.as_ref().unwrap();
        assert_eq!(original.source, "src/f.ts");
        assert_eq!(original.position, Position::new(3, 29));
    }

    #[test]
    fn remove_source_rebuilds_map() {
        let map = map_of(
            Some("out.js"),
            &[((1, 0), "a.js", (1, 0)), ((1, 5), "b.js", (1, 0))],
        );
        let stripped = remove_source("a.js", &map).unwrap();
        assert_eq!(stripped.sources, vec!["b.js"]);
        assert_eq!(stripped.file.as_deref(), Some("out.js"));
    }
}
