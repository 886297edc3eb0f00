//! Type representation for the Vibefun type system.
//!
//! Defines the core `Ty` enum, type variables (`TyVar`), structural record
//! types with row variables (`RecordTy`), and polymorphic type schemes
//! (`Scheme`). These form the foundation of Hindley-Milner inference with
//! width subtyping for records and nominal variants.

use std::collections::BTreeMap;
use std::fmt;

/// A type variable, identified by a `u32` index into the unification table.
///
/// Row variables are ordinary type variables that happen to be bound to
/// record types; the `ena` crate handles the union-find mechanics for both.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVar(pub u32);

/// The built-in type constants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyConst {
    Int,
    Float,
    String,
    Bool,
    Unit,
}

impl TyConst {
    pub fn name(self) -> &'static str {
        match self {
            TyConst::Int => "Int",
            TyConst::Float => "Float",
            TyConst::String => "String",
            TyConst::Bool => "Bool",
            TyConst::Unit => "Unit",
        }
    }

    /// Parse a built-in constant name.
    pub fn from_name(name: &str) -> Option<TyConst> {
        match name {
            "Int" => Some(TyConst::Int),
            "Float" => Some(TyConst::Float),
            "String" => Some(TyConst::String),
            "Bool" => Some(TyConst::Bool),
            "Unit" => Some(TyConst::Unit),
            _ => None,
        }
    }
}

/// A structural record type: a set of named fields plus a row marker.
///
/// `row: None` is a closed record (exactly these fields). `row: Some(v)`
/// is an open record: at least these fields, with `v` standing for the
/// rest. Binding `v` to another record type extends the field set; binding
/// it to the empty closed record closes it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordTy {
    pub fields: BTreeMap<String, Ty>,
    pub row: Option<TyVar>,
}

impl RecordTy {
    pub fn closed(fields: BTreeMap<String, Ty>) -> Self {
        RecordTy { fields, row: None }
    }

    pub fn open(fields: BTreeMap<String, Ty>, row: TyVar) -> Self {
        RecordTy {
            fields,
            row: Some(row),
        }
    }
}

/// A Vibefun type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// An inference variable (resolved through the unification table).
    Var(TyVar),
    /// A built-in constant: `Int`, `Float`, `String`, `Bool`, `Unit`.
    Const(TyConst),
    /// A function type; always single-argument after desugaring.
    Fun(Box<Ty>, Box<Ty>),
    /// `(T₁, …, Tₙ)`.
    Tuple(Vec<Ty>),
    /// A structural record.
    Record(RecordTy),
    /// A user-declared variant, alias target, or opaque external type,
    /// applied to its type arguments. Parameters are invariant.
    Named { name: String, args: Vec<Ty> },
    /// A mutable ref cell `Ref<T>`.
    Ref(Box<Ty>),
    /// The recovery type: unifies with anything, produced after a reported
    /// error so inference can continue.
    Error,
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Const(TyConst::Int)
    }

    pub fn float() -> Ty {
        Ty::Const(TyConst::Float)
    }

    pub fn string() -> Ty {
        Ty::Const(TyConst::String)
    }

    pub fn bool() -> Ty {
        Ty::Const(TyConst::Bool)
    }

    pub fn unit() -> Ty {
        Ty::Const(TyConst::Unit)
    }

    pub fn fun(param: Ty, ret: Ty) -> Ty {
        Ty::Fun(Box::new(param), Box::new(ret))
    }

    pub fn list(elem: Ty) -> Ty {
        Ty::Named {
            name: "List".to_string(),
            args: vec![elem],
        }
    }

    pub fn reference(inner: Ty) -> Ty {
        Ty::Ref(Box::new(inner))
    }

    /// Whether this is one of the primitive constants (compared with `===`
    /// in emitted JS; everything else goes through structural equality).
    pub fn is_primitive(&self) -> bool {
        matches!(self, Ty::Const(_))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Const(c) => write!(f, "{}", c.name()),
            Ty::Fun(param, ret) => write!(f, "({}) -> {}", param, ret),
            Ty::Tuple(items) => {
                write!(f, "(")?;
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
            Ty::Record(rec) => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in rec.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                if rec.row.is_some() {
                    if !rec.fields.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "..")?;
                }
                write!(f, " }}")
            }
            Ty::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Ref(inner) => write!(f, "Ref<{}>", inner),
            Ty::Error => write!(f, "<error>"),
        }
    }
}

/// A polymorphic type scheme: a type with universally quantified variables,
/// produced only by generalization at `let` bindings.
#[derive(Clone, Debug)]
pub struct Scheme {
    /// The quantified type variables (row variables included).
    pub vars: Vec<TyVar>,
    pub ty: Ty,
}

impl Scheme {
    /// A monomorphic scheme (no quantified variables).
    pub fn mono(ty: Ty) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_function_type() {
        let ty = Ty::fun(Ty::int(), Ty::fun(Ty::string(), Ty::bool()));
        assert_eq!(ty.to_string(), "(Int) -> (String) -> Bool");
    }

    #[test]
    fn display_open_record() {
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), Ty::int());
        let ty = Ty::Record(RecordTy::open(fields, TyVar(0)));
        assert_eq!(ty.to_string(), "{ x: Int, .. }");
    }

    #[test]
    fn display_named_with_args() {
        assert_eq!(Ty::list(Ty::int()).to_string(), "List<Int>");
        assert_eq!(Ty::reference(Ty::bool()).to_string(), "Ref<Bool>");
    }
}
