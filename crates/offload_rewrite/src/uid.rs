//! Hygienic names for relocated declarations.

use offload_common::{Ident, Interner};
use offload_js_parser::ast::{Binding, Program};
use offload_js_parser::visit::{self, Visit};
use offload_source::Span;
use std::collections::HashSet;

/// Hands out identifiers that clash with nothing already in use.
///
/// Names take the form `_base`, `_base2`, `_base3` and so on, where `base`
/// is the requested name without leading underscores or trailing digits.
#[derive(Debug, Default)]
pub struct UidGenerator {
    used: HashSet<String>,
}

struct NameCollector<'a> {
    interner: &'a Interner,
    names: &'a mut HashSet<String>,
}

impl Visit for NameCollector<'_> {
    fn visit_binding(&mut self, binding: &Binding) {
        self.names.insert(self.interner.resolve(binding.name).to_string());
    }

    fn visit_reference(&mut self, name: Ident, _span: Span) {
        self.names.insert(self.interner.resolve(name).to_string());
    }
}

impl UidGenerator {
    /// A generator avoiding every name declared or referenced in `program`.
    pub fn for_program(program: &Program, interner: &Interner) -> Self {
        let mut generator = Self::default();
        generator.reserve_program(program, interner);
        generator
    }

    /// Marks every name of `program` as taken.
    pub fn reserve_program(&mut self, program: &Program, interner: &Interner) {
        let mut collector = NameCollector {
            interner,
            names: &mut self.used,
        };
        visit::walk_program(&mut collector, program);
    }

    /// Marks `name` as taken.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.used.insert(name.into());
    }

    /// Whether `name` is taken.
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// A fresh name derived from `base`. The result is reserved.
    pub fn generate(&mut self, base: &str) -> String {
        let base = sanitize(base);
        let mut i = 1;
        loop {
            let candidate = if i > 1 {
                format!("_{base}{i}")
            } else {
                format!("_{base}")
            };
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
            i += 1;
        }
    }
}

fn sanitize(base: &str) -> String {
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    let trimmed = cleaned
        .trim_start_matches('_')
        .trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() {
        "temp".to_string()
    } else {
        trimmed.to_string()
    }
}
