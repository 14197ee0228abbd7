//! Raw HTML to the canonical inline markup the chunker expects.
//!
//! The normalizer is a fixed sequence of named passes. Order matters: the
//! sanitizer has to run before the glyph pass folds `<p>`/`<br>` into
//! newlines, and the spacing passes assume blank lines are already collapsed.

mod passes;
mod sanitize;

#[cfg(test)]
mod tests;

use tracing::trace;

pub use passes::{
    collapse_blank_lines, collapse_wide_spaces, drop_stray_chars, paragraph_spacing,
    replace_glyphs, space_after_links, space_before_links, strip_indent, trim_edges,
    trim_line_edges,
};
pub use sanitize::{sanitize, tidy_links};

/// One named rewrite step.
#[derive(Clone, Copy)]
pub struct Pass {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Every pass, in the order [`normalize`] runs them.
pub const PASSES: &[Pass] = &[
    Pass { name: "sanitize", apply: sanitize },
    Pass { name: "tidy_links", apply: tidy_links },
    Pass { name: "replace_glyphs", apply: replace_glyphs },
    Pass { name: "collapse_wide_spaces", apply: collapse_wide_spaces },
    Pass { name: "trim_line_edges", apply: trim_line_edges },
    Pass { name: "collapse_blank_lines", apply: collapse_blank_lines },
    Pass { name: "drop_stray_chars", apply: drop_stray_chars },
    Pass { name: "collapse_blank_lines", apply: collapse_blank_lines },
    Pass { name: "space_before_links", apply: space_before_links },
    Pass { name: "space_after_links", apply: space_after_links },
    Pass { name: "paragraph_spacing", apply: paragraph_spacing },
    Pass { name: "strip_indent", apply: strip_indent },
    Pass { name: "trim_edges", apply: trim_edges },
];

/// A pipeline over a subset of [`PASSES`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    passes: Vec<Pass>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            passes: PASSES.to_vec(),
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every pass called `name`. Unknown names are ignored.
    pub fn without(mut self, name: &str) -> Self {
        self.passes.retain(|p| p.name != name);
        self
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name).collect()
    }

    pub fn run(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for pass in &self.passes {
            let next = (pass.apply)(&text);
            trace!(pass = pass.name, before = text.len(), after = next.len(), "normalize pass");
            text = next;
        }
        text
    }

    /// Like [`Normalizer::run`], dropping invalid UTF-8 sequences first.
    pub fn run_bytes(&self, raw: &[u8]) -> String {
        let valid: String = raw.utf8_chunks().map(|chunk| chunk.valid()).collect();
        self.run(&valid)
    }
}

/// Run every pass over `raw`.
pub fn normalize(raw: &str) -> String {
    Normalizer::default().run(raw)
}

/// Like [`normalize`], dropping invalid UTF-8 sequences first.
pub fn normalize_bytes(raw: &[u8]) -> String {
    Normalizer::default().run_bytes(raw)
}

/// Whether `name` is one of the passes in [`PASSES`].
pub fn is_pass(name: &str) -> bool {
    PASSES.iter().any(|p| p.name == name)
}
