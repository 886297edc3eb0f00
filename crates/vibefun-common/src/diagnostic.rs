//! Diagnostic values with stable codes.
//!
//! A [`Diagnostic`] is plain data: code, severity, primary location,
//! message, optional hint, optional secondary locations. Messages are built
//! from the static per-code templates in [`codes`] plus parameters at the
//! point where the problem is detected. Rendering (colors, source excerpts)
//! lives in the driver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::Location;

/// Diagnostic severity. Errors block output; warnings and notes never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// Stable diagnostic codes and their message templates.
///
/// The table is the only process-wide registry in the compiler; it is
/// static and read-only. Codes never change meaning across builds -- tests
/// and downstream tooling key on them.
pub mod codes {
    // Resolver family (VF5xxx).
    pub const IMPORT_CONFLICT_DUPLICATE: &str = "VF5002";
    pub const IMPORT_CONFLICT_SHADOWING: &str = "VF5003";
    pub const SELF_IMPORT: &str = "VF5004";
    pub const CIRCULAR_DEPENDENCY: &str = "VF5900";
    pub const CASE_SENSITIVITY_MISMATCH: &str = "VF5901";

    // Type-error family (VF1xxx).
    pub const TYPE_MISMATCH: &str = "VF1001";
    pub const OCCURS_CHECK: &str = "VF1002";
    pub const ARITY_MISMATCH: &str = "VF1003";
    pub const UNBOUND_VARIABLE: &str = "VF1004";
    pub const UNBOUND_TYPE: &str = "VF1005";
    pub const UNBOUND_CONSTRUCTOR: &str = "VF1006";
    pub const RECORD_FIELD_MISSING: &str = "VF1007";
    pub const RECORD_FIELD_EXTRA: &str = "VF1008";
    pub const PATTERN_TYPE_MISMATCH: &str = "VF1009";
    pub const VALUE_RESTRICTION: &str = "VF1010";
    pub const OR_PATTERN_BINDINGS: &str = "VF1011";
    pub const GUARD_NOT_BOOL: &str = "VF1012";
    pub const NON_EXHAUSTIVE_MATCH: &str = "VF1013";
    pub const UNREACHABLE_PATTERN: &str = "VF1014";
    pub const NOT_A_FUNCTION: &str = "VF1015";

    /// Short human-readable name of a code, for `--json-diagnostics`
    /// consumers and test assertions.
    pub fn name(code: &str) -> &'static str {
        match code {
            IMPORT_CONFLICT_DUPLICATE => "ImportConflictDuplicate",
            IMPORT_CONFLICT_SHADOWING => "ImportConflictShadowing",
            SELF_IMPORT => "SelfImport",
            CIRCULAR_DEPENDENCY => "CircularDependency",
            CASE_SENSITIVITY_MISMATCH => "CaseSensitivityMismatch",
            TYPE_MISMATCH => "TypeMismatch",
            OCCURS_CHECK => "OccursCheck",
            ARITY_MISMATCH => "ArityMismatch",
            UNBOUND_VARIABLE => "UnboundVariable",
            UNBOUND_TYPE => "UnboundType",
            UNBOUND_CONSTRUCTOR => "UnboundConstructor",
            RECORD_FIELD_MISSING => "RecordFieldMissing",
            RECORD_FIELD_EXTRA => "RecordFieldExtra",
            PATTERN_TYPE_MISMATCH => "PatternTypeMismatch",
            VALUE_RESTRICTION => "ValueRestrictionViolated",
            OR_PATTERN_BINDINGS => "OrPatternBindingMismatch",
            GUARD_NOT_BOOL => "GuardNotBool",
            NON_EXHAUSTIVE_MATCH => "NonExhaustiveMatch",
            UNREACHABLE_PATTERN => "UnreachablePattern",
            NOT_A_FUNCTION => "NotAFunction",
            _ => "Unknown",
        }
    }
}

/// A single diagnostic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable code, e.g. `VF5004`.
    pub code: String,
    pub severity: Severity,
    /// Primary location the diagnostic points at.
    pub location: Location,
    /// Message built from the code's template and parameters.
    pub message: String,
    /// Optional hint with a suggested fix or missing case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Further locations involved (e.g. the other conflicting import).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<Location>,
}

impl Diagnostic {
    pub fn error(code: &str, location: Location, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            location,
            message: message.into(),
            hint: None,
            secondary: Vec::new(),
        }
    }

    pub fn warning(code: &str, location: Location, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            location,
            message: message.into(),
            hint: None,
            secondary: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_secondary(mut self, loc: Location) -> Self {
        self.secondary.push(loc);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} ({})",
            self.severity, self.code, self.message, self.location
        )
    }
}

/// Append-only diagnostic collector threaded through the pipeline.
///
/// Ordering is stable because stages run sequentially and only push.
#[derive(Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.list.push(diagnostic);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.list.extend(other);
    }

    pub fn has_errors(&self) -> bool {
        self.list.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModulePath, Span};
    use crate::span::LineIndex;

    fn loc() -> Location {
        let idx = LineIndex::new("import { x } from \"./a\"\n");
        Location::from_span(&ModulePath::from("/proj/a.vf"), &idx, Span::new(0, 6))
    }

    #[test]
    fn collector_orders_and_detects_errors() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning(
            codes::CIRCULAR_DEPENDENCY,
            loc(),
            "circular dependency",
        ));
        assert!(!diags.has_errors());

        diags.push(Diagnostic::error(codes::SELF_IMPORT, loc(), "self import"));
        assert!(diags.has_errors());
        assert_eq!(diags.len(), 2);

        let codes: Vec<&str> = diags.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["VF5900", "VF5004"]);
    }

    #[test]
    fn code_names_are_stable() {
        assert_eq!(codes::name(codes::SELF_IMPORT), "SelfImport");
        assert_eq!(codes::name(codes::NON_EXHAUSTIVE_MATCH), "NonExhaustiveMatch");
        assert_eq!(codes::name("VF9999"), "Unknown");
    }

    #[test]
    fn hint_and_secondary_attach() {
        let d = Diagnostic::error(codes::IMPORT_CONFLICT_DUPLICATE, loc(), "dup")
            .with_hint("rename one of the imports")
            .with_secondary(loc());
        assert_eq!(d.hint.as_deref(), Some("rename one of the imports"));
        assert_eq!(d.secondary.len(), 1);
    }
}
