//! Source text registry shared by diagnostic producers and the renderer.

use rustc_hash::FxHashMap;

use crate::span::{LineIndex, Location, Span};
use crate::ModulePath;

/// The text and line index of one source file.
#[derive(Debug)]
pub struct SourceFile {
    pub text: String,
    index: LineIndex,
}

/// Maps module paths to their source text, for turning [`Span`]s into
/// [`Location`]s and for rendering source excerpts.
///
/// Built once by the driver from the loader's output, then read-only.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: FxHashMap<ModulePath, SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: ModulePath, text: String) {
        let index = LineIndex::new(&text);
        self.files.insert(path, SourceFile { text, index });
    }

    pub fn text(&self, path: &ModulePath) -> Option<&str> {
        self.files.get(path).map(|f| f.text.as_str())
    }

    /// Resolve the start of `span` in `path` to a full location.
    ///
    /// Unknown files (possible for synthesized nodes) fall back to line 1,
    /// column 1 so diagnostic construction is total.
    pub fn location(&self, path: &ModulePath, span: Span) -> Location {
        match self.files.get(path) {
            Some(file) => Location::from_span(path, &file.index, span),
            None => Location::new(path.clone(), 1, 1, span.start),
        }
    }
}
