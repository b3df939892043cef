//! Module requests: `loader?query!loader2!path/to/resource`.

use std::fmt;
use std::path::PathBuf;

/// One loader of a request's chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderRequest {
    /// Registered loader name.
    pub name: String,
    /// Everything after the first `?`, empty if there is none.
    pub query: String,
}

/// A parsed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Loaders, leftmost first. They run right to left.
    pub loaders: Vec<LoaderRequest>,
    /// Path of the resource.
    pub resource: PathBuf,
}

impl Request {
    /// Parses a raw request.
    ///
    /// Segments are separated by `!`, except inside brackets or quoted
    /// strings, so JSON queries may contain `!`. Empty segments are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut segments: Vec<&str> = split_top_level(raw)
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        let resource = segments.pop().unwrap_or_default();
        let loaders = segments
            .into_iter()
            .map(|segment| match segment.split_once('?') {
                Some((name, query)) => LoaderRequest {
                    name: name.to_string(),
                    query: query.to_string(),
                },
                None => LoaderRequest {
                    name: segment.to_string(),
                    query: String::new(),
                },
            })
            .collect();
        Self {
            loaders,
            resource: PathBuf::from(resource),
        }
    }
}

fn split_top_level(raw: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            '!' if depth == 0 => {
                segments.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&raw[start..]);
    segments
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for loader in &self.loaders {
            f.write_str(&loader.name)?;
            if !loader.query.is_empty() {
                write!(f, "?{}", loader.query)?;
            }
            f.write_str("!")?;
        }
        write!(f, "{}", self.resource.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_resource() {
        let r = Request::parse("src/index.js");
        assert!(r.loaders.is_empty());
        assert_eq!(r.resource, PathBuf::from("src/index.js"));
    }

    #[test]
    fn loader_with_json_query() {
        let raw = r#"offload-worker-registrator?{"plugins":["a!b"],"x":"}!"}!offload/dist/worker-slave.js"#;
        let r = Request::parse(raw);
        assert_eq!(r.loaders.len(), 1);
        assert_eq!(r.loaders[0].name, "offload-worker-registrator");
        assert_eq!(r.loaders[0].query, r#"{"plugins":["a!b"],"x":"}!"}"#);
        assert_eq!(r.resource, PathBuf::from("offload/dist/worker-slave.js"));
        assert_eq!(r.to_string(), raw);
    }

    #[test]
    fn loader_chain_without_queries() {
        let r = Request::parse("!a!b!src/x.js");
        let names: Vec<_> = r.loaders.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(r.loaders.iter().all(|l| l.query.is_empty()));
    }
}
