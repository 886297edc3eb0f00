//! Core IR and desugaring for the Vibefun compiler.
//!
//! - [`ir`]: the post-desugaring intermediate representation consumed by
//!   the type checker and the code generator.
//! - [`desugar`]: the surface-to-Core lowering rules.

pub mod desugar;
pub mod ir;

pub use desugar::{desugar_module, Desugarer};
pub use ir::{
    CoreBinOp, CoreDecl, CoreExpr, CoreMatchArm, CoreModule, CoreRecBinding, CoreUnOp, NodeId,
};
