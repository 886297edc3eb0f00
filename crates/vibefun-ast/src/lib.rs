//! Surface AST for Vibefun.
//!
//! This is the contract the external parser produces and the compiler core
//! consumes: plain serializable data with a [`Span`] on every node. The
//! core never re-tokenizes source text; everything downstream of the parser
//! works on these trees.
//!
//! Variant construction has no dedicated node -- a constructor name is a
//! [`Expr::Var`] applied to arguments, and the type checker resolves it
//! through the constructor registry.

pub mod expr;
pub mod pattern;
pub mod ty;

pub use expr::{BinOp, Expr, Literal, MatchArm, Param, RecordField, Stmt, UnOp};
pub use pattern::Pattern;
pub use ty::TypeExpr;

use serde::{Deserialize, Serialize};
use vibefun_common::Span;

/// A parsed source module: ordered imports, then ordered declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
    pub span: Span,
}

/// One item of an import declaration: `name`, `name as alias`, or
/// `type Name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_type: bool,
    pub span: Span,
}

impl ImportItem {
    /// The name the item binds locally (alias if present).
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// `import { a, b as c, type T } from "./m"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub items: Vec<ImportItem>,
    /// The source path exactly as written (`"./m"`, `"fs"`, `"@scope/pkg"`).
    pub source: String,
    pub span: Span,
}

impl ImportDecl {
    /// An import is type-only iff every item is type-only.
    pub fn is_type_only(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.is_type)
    }
}

/// A non-import declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    /// `let [mut] pat [: ty] = expr`, optionally `export`ed or `rec`ursive.
    Let(LetDecl),
    /// `let rec f = … and g = …` -- mutually recursive bindings.
    LetRecGroup(LetRecGroup),
    /// `type Name<T, …> = …`.
    Type(TypeDecl),
    /// `external name : ty = "jsName" [from "module"]`.
    External(ExternalDecl),
    /// `external type Name` -- opaque, no runtime representation.
    ExternalType(ExternalTypeDecl),
    /// `export { a, b } from "./m"` or `export * from "./m"`.
    ReExport(ReExportDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Let(d) => d.span,
            Decl::LetRecGroup(d) => d.span,
            Decl::Type(d) => d.span,
            Decl::External(d) => d.span,
            Decl::ExternalType(d) => d.span,
            Decl::ReExport(d) => d.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetDecl {
    pub pattern: Pattern,
    pub value: Expr,
    #[serde(default)]
    pub mutable: bool,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeExpr>,
    pub span: Span,
}

/// One binding of a `let rec … and …` group. Group bindings are always
/// simple names, never destructuring patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecBinding {
    pub name: String,
    pub value: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeExpr>,
    #[serde(default)]
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetRecGroup {
    pub bindings: Vec<RecBinding>,
    pub span: Span,
}

/// The right-hand side of a `type` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDef {
    /// `type Meters = Int`
    Alias(TypeExpr),
    /// `type Point = { x: Int, y: Int }`
    Record(Vec<(String, TypeExpr)>),
    /// `type Option<T> = Some(T) | None`
    Variant(Vec<VariantCase>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantCase {
    pub name: String,
    pub args: Vec<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub params: Vec<String>,
    pub def: TypeDef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDecl {
    pub name: String,
    pub ty: TypeExpr,
    /// The JS identifier to emit, possibly dotted (`Math.floor`).
    pub js_name: String,
    /// ES module to import the (head of the) JS name from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default)]
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTypeDecl {
    pub name: String,
    pub span: Span,
}

/// `export { a, b } from "./m"`; `items: None` is `export * from "./m"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReExportDecl {
    pub items: Option<Vec<ImportItem>>,
    pub source: String,
    pub span: Span,
}

impl ReExportDecl {
    /// A re-export edge is type-only iff every named item is a type.
    /// Star re-exports are value edges.
    pub fn is_type_only(&self) -> bool {
        match &self.items {
            Some(items) => !items.is_empty() && items.iter().all(|i| i.is_type),
            None => false,
        }
    }
}
