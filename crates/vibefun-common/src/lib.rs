//! Shared foundation types for the Vibefun compiler.
//!
//! Every pipeline stage depends on this crate for source positions
//! ([`Span`], [`Location`], [`LineIndex`]), canonical module paths
//! ([`ModulePath`]), and the diagnostic data model ([`Diagnostic`],
//! [`Diagnostics`]). Diagnostics are plain values; rendering them for a
//! terminal is the driver's job.

pub mod diagnostic;
pub mod source_map;
pub mod span;

pub use diagnostic::{codes, Diagnostic, Diagnostics, Severity};
pub use source_map::SourceMap;
pub use span::{LineIndex, Location, Span};

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A canonical absolute module path, the identity of a module everywhere
/// in the compiler (graph nodes, compile order, output file names).
///
/// The external loader is responsible for canonicalization; the core only
/// requires that equal modules compare equal as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(path: impl Into<String>) -> Self {
        ModulePath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file name portion of the path, used in cycle messages
    /// (`a.vf -> b.vf -> a.vf`).
    pub fn file_name(&self) -> &str {
        Path::new(&self.0)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.0)
    }

    /// The module path with its extension replaced by `.js`, relative to
    /// nothing in particular; the driver joins it onto the output dir.
    pub fn js_file_name(&self) -> String {
        let p = PathBuf::from(&self.0);
        let stem = p
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.0.as_str());
        format!("{stem}.js")
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(s: &str) -> Self {
        ModulePath(s.to_string())
    }
}

impl From<String> for ModulePath {
    fn from(s: String) -> Self {
        ModulePath(s)
    }
}
