//! Conversion of type errors into diagnostic values.
//!
//! Assigns each `TypeError` variant its stable `VF1xxx` code, resolves the
//! span against the source map, and attaches a fix hint when a plausible
//! one exists. Terminal rendering is the driver's job.

use vibefun_common::{codes, Diagnostic, ModulePath, SourceMap};

use crate::error::TypeError;
use crate::ty::Ty;

/// The stable code of a type error.
pub fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::Mismatch { .. } => codes::TYPE_MISMATCH,
        TypeError::Occurs { .. } => codes::OCCURS_CHECK,
        TypeError::ArityMismatch { .. } => codes::ARITY_MISMATCH,
        TypeError::UnboundVariable { .. } => codes::UNBOUND_VARIABLE,
        TypeError::UnboundType { .. } => codes::UNBOUND_TYPE,
        TypeError::UnboundConstructor { .. } => codes::UNBOUND_CONSTRUCTOR,
        TypeError::NotAFunction { .. } => codes::NOT_A_FUNCTION,
        TypeError::RecordFieldMissing { .. } => codes::RECORD_FIELD_MISSING,
        TypeError::RecordFieldExtra { .. } => codes::RECORD_FIELD_EXTRA,
        TypeError::PatternTypeMismatch { .. } => codes::PATTERN_TYPE_MISMATCH,
        TypeError::ValueRestriction { .. } => codes::VALUE_RESTRICTION,
        TypeError::OrPatternBindings { .. } => codes::OR_PATTERN_BINDINGS,
        TypeError::GuardNotBool { .. } => codes::GUARD_NOT_BOOL,
        TypeError::NonExhaustiveMatch { .. } => codes::NON_EXHAUSTIVE_MATCH,
        TypeError::UnreachablePattern { .. } => codes::UNREACHABLE_PATTERN,
    }
}

/// Convert a type error to a diagnostic value.
pub fn to_diagnostic(err: &TypeError, path: &ModulePath, sources: &SourceMap) -> Diagnostic {
    let location = sources.location(path, err.span());
    let code = error_code(err);
    let message = err.to_string();
    let diagnostic = if err.is_warning() {
        Diagnostic::warning(code, location, message)
    } else {
        Diagnostic::error(code, location, message)
    };
    match hint(err) {
        Some(hint) => diagnostic.with_hint(hint),
        None => diagnostic,
    }
}

fn hint(err: &TypeError) -> Option<String> {
    match err {
        TypeError::NonExhaustiveMatch { witness, .. } => {
            Some(format!("missing case: {witness}"))
        }
        TypeError::Mismatch {
            expected, found, ..
        } => mismatch_hint(expected, found),
        TypeError::ValueRestriction { .. } => Some(
            "bind the value through a function, or drop the polymorphic annotation".to_string(),
        ),
        TypeError::UnreachablePattern { .. } => {
            Some("this arm is covered by earlier arms; remove it".to_string())
        }
        _ => None,
    }
}

fn mismatch_hint(expected: &Ty, found: &Ty) -> Option<String> {
    if *expected == Ty::int() && *found == Ty::float() {
        return Some("Int and Float never mix implicitly; convert explicitly".to_string());
    }
    if *expected == Ty::float() && *found == Ty::int() {
        return Some("Int and Float never mix implicitly; convert explicitly".to_string());
    }
    if *expected == Ty::bool() {
        return Some("this position expects a Bool expression".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibefun_common::{Severity, Span};

    fn sources() -> (SourceMap, ModulePath) {
        let mut map = SourceMap::new();
        let path = ModulePath::from("/proj/main.vf");
        map.add(path.clone(), "let x = 1\n".to_string());
        (map, path)
    }

    #[test]
    fn codes_are_stable() {
        let (sources, path) = sources();
        let err = TypeError::Mismatch {
            expected: Ty::int(),
            found: Ty::string(),
            span: Span::new(0, 3),
        };
        let d = to_diagnostic(&err, &path, &sources);
        assert_eq!(d.code, "VF1001");
        assert_eq!(d.severity, Severity::Error);
    }

    #[test]
    fn unreachable_is_a_warning() {
        let (sources, path) = sources();
        let err = TypeError::UnreachablePattern {
            arm_index: 1,
            span: Span::new(0, 3),
        };
        let d = to_diagnostic(&err, &path, &sources);
        assert_eq!(d.code, "VF1014");
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn non_exhaustive_hint_names_the_witness() {
        let (sources, path) = sources();
        let err = TypeError::NonExhaustiveMatch {
            scrutinee: Ty::Named { name: "Color".into(), args: vec![] },
            witness: "Blue".into(),
            span: Span::new(0, 3),
        };
        let d = to_diagnostic(&err, &path, &sources);
        assert!(d.hint.unwrap().contains("Blue"));
    }
}
