//! Integration tests for module resolution.
//!
//! Each test builds a small module set by hand (the parser is an external
//! collaborator, so tests construct ASTs directly), runs `resolve`, and
//! asserts on the graph shape, the compile order, and diagnostic codes.

use rustc_hash::FxHashMap;
use vibefun_ast::{Decl, ImportDecl, ImportItem, LetDecl, Module, Pattern};
use vibefun_ast::expr::{Expr, Literal};
use vibefun_common::{codes, Diagnostic, ModulePath, Severity, SourceMap, Span};
use vibefun_resolver::{resolve, Resolution, ResolverInput};

// ── Helpers ────────────────────────────────────────────────────────────

struct Project {
    modules: FxHashMap<ModulePath, Module>,
    targets: FxHashMap<ModulePath, FxHashMap<String, ModulePath>>,
    sources: SourceMap,
}

impl Project {
    fn new() -> Self {
        Project {
            modules: FxHashMap::default(),
            targets: FxHashMap::default(),
            sources: SourceMap::new(),
        }
    }

    fn module(&mut self, path: &str, module: Module) {
        self.modules.insert(ModulePath::from(path), module);
        self.sources
            .add(ModulePath::from(path), String::new());
    }

    fn target(&mut self, from: &str, written: &str, to: &str) {
        self.targets
            .entry(ModulePath::from(from))
            .or_default()
            .insert(written.to_string(), ModulePath::from(to));
    }

    fn resolve(&self, entry: &str) -> Resolution {
        resolve(&ResolverInput {
            modules: &self.modules,
            import_targets: &self.targets,
            entry: &ModulePath::from(entry),
            warnings: &[],
            sources: &self.sources,
        })
    }
}

fn import(source: &str, names: &[&str], span: Span) -> ImportDecl {
    ImportDecl {
        items: names
            .iter()
            .map(|n| ImportItem {
                name: n.to_string(),
                alias: None,
                is_type: false,
                span,
            })
            .collect(),
        source: source.to_string(),
        span,
    }
}

fn type_import(source: &str, names: &[&str], span: Span) -> ImportDecl {
    let mut decl = import(source, names, span);
    for item in &mut decl.items {
        item.is_type = true;
    }
    decl
}

fn export_let(name: &str, span: Span) -> Decl {
    Decl::Let(LetDecl {
        pattern: Pattern::Var {
            name: name.to_string(),
            span,
        },
        value: Expr::Lit {
            value: Literal::Int(1),
            span,
        },
        mutable: false,
        recursive: false,
        exported: true,
        annotation: None,
        span,
    })
}

fn module(imports: Vec<ImportDecl>, decls: Vec<Decl>) -> Module {
    Module {
        imports,
        decls,
        span: Span::new(0, 0),
    }
}

fn errors(resolution: &Resolution) -> Vec<&Diagnostic> {
    resolution
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

// ── Self-import (S3) ───────────────────────────────────────────────────

#[test]
fn self_import_is_an_error_not_a_cycle() {
    let mut p = Project::new();
    p.module(
        "/proj/a.vf",
        module(
            vec![import("./a", &["x"], Span::new(0, 23))],
            vec![export_let("x", Span::new(24, 40))],
        ),
    );
    p.target("/proj/a.vf", "./a", "/proj/a.vf");

    let r = p.resolve("/proj/a.vf");
    let errs = errors(&r);
    // The shadowing of the self-imported name is also reported, but the
    // self-import error must be present and no cycle warning may appear.
    assert!(errs.iter().any(|d| d.code == codes::SELF_IMPORT));
    assert!(!r
        .diagnostics
        .iter()
        .any(|d| d.code == codes::CIRCULAR_DEPENDENCY));
    assert!(r.cycles.is_empty());
}

// ── Value cycle (S4) ───────────────────────────────────────────────────

#[test]
fn value_cycle_warns_with_representative_path() {
    let mut p = Project::new();
    p.module(
        "/proj/a.vf",
        module(
            vec![import("./b", &["y"], Span::new(0, 23))],
            vec![export_let("x", Span::new(24, 40))],
        ),
    );
    p.module(
        "/proj/b.vf",
        module(
            vec![import("./a", &["x"], Span::new(0, 23))],
            vec![export_let("y", Span::new(24, 40))],
        ),
    );
    p.target("/proj/a.vf", "./b", "/proj/b.vf");
    p.target("/proj/b.vf", "./a", "/proj/a.vf");

    let r = p.resolve("/proj/a.vf");
    let warning = r
        .diagnostics
        .iter()
        .find(|d| d.code == codes::CIRCULAR_DEPENDENCY)
        .expect("cycle warning");
    assert_eq!(warning.severity, Severity::Warning);
    assert!(
        warning.message.contains("a.vf \u{2192} b.vf \u{2192} a.vf"),
        "unexpected message: {}",
        warning.message
    );
    // Both modules still get ordered, alphabetically first cyclic module first.
    assert!(r.had_cycles);
    let names: Vec<&str> = r.order.iter().map(|m| m.as_str()).collect();
    assert_eq!(names, vec!["/proj/a.vf", "/proj/b.vf"]);
}

#[test]
fn type_only_cycle_is_silent_but_reported_to_tooling() {
    let mut p = Project::new();
    p.module(
        "/proj/a.vf",
        module(vec![type_import("./b", &["T"], Span::new(0, 28))], vec![]),
    );
    p.module(
        "/proj/b.vf",
        module(vec![type_import("./a", &["U"], Span::new(0, 28))], vec![]),
    );
    p.target("/proj/a.vf", "./b", "/proj/b.vf");
    p.target("/proj/b.vf", "./a", "/proj/a.vf");

    let r = p.resolve("/proj/a.vf");
    assert!(!r
        .diagnostics
        .iter()
        .any(|d| d.code == codes::CIRCULAR_DEPENDENCY));
    assert_eq!(r.cycles.len(), 1);
    assert!(r.cycles[0].is_type_only);
}

#[test]
fn mixed_cycle_is_a_value_cycle() {
    // a --type--> b --value--> a: at least one value edge, so it warns.
    let mut p = Project::new();
    p.module(
        "/proj/a.vf",
        module(vec![type_import("./b", &["T"], Span::new(0, 28))], vec![]),
    );
    p.module(
        "/proj/b.vf",
        module(
            vec![import("./a", &["x"], Span::new(0, 23))],
            vec![],
        ),
    );
    p.target("/proj/a.vf", "./b", "/proj/b.vf");
    p.target("/proj/b.vf", "./a", "/proj/a.vf");

    let r = p.resolve("/proj/a.vf");
    assert!(r
        .diagnostics
        .iter()
        .any(|d| d.code == codes::CIRCULAR_DEPENDENCY));
    assert!(!r.cycles[0].is_type_only);
}

// ── Import conflicts ───────────────────────────────────────────────────

#[test]
fn duplicate_import_from_different_sources() {
    let mut p = Project::new();
    p.module(
        "/proj/main.vf",
        module(
            vec![
                import("./a", &["helper"], Span::new(0, 30)),
                import("./b", &["helper"], Span::new(31, 61)),
            ],
            vec![],
        ),
    );
    p.module("/proj/a.vf", module(vec![], vec![export_let("helper", Span::new(0, 20))]));
    p.module("/proj/b.vf", module(vec![], vec![export_let("helper", Span::new(0, 20))]));
    p.target("/proj/main.vf", "./a", "/proj/a.vf");
    p.target("/proj/main.vf", "./b", "/proj/b.vf");

    let r = p.resolve("/proj/main.vf");
    let dup = errors(&r)
        .into_iter()
        .find(|d| d.code == codes::IMPORT_CONFLICT_DUPLICATE)
        .expect("duplicate conflict");
    assert!(dup.message.contains("helper"));
    assert_eq!(dup.secondary.len(), 1);
}

#[test]
fn local_declaration_shadowing_an_import() {
    let mut p = Project::new();
    p.module(
        "/proj/main.vf",
        module(
            vec![import("./a", &["x"], Span::new(0, 23))],
            vec![export_let("x", Span::new(24, 40))],
        ),
    );
    p.module("/proj/a.vf", module(vec![], vec![export_let("x", Span::new(0, 16))]));
    p.target("/proj/main.vf", "./a", "/proj/a.vf");

    let r = p.resolve("/proj/main.vf");
    assert!(errors(&r)
        .iter()
        .any(|d| d.code == codes::IMPORT_CONFLICT_SHADOWING));
}

#[test]
fn type_and_value_import_of_same_name_merge() {
    // import { type Thing } and { Thing } from the same module: merged,
    // value wins, edge is a value edge, no diagnostic.
    let mut p = Project::new();
    p.module(
        "/proj/main.vf",
        module(
            vec![
                type_import("./a", &["Thing"], Span::new(0, 28)),
                import("./a", &["Thing"], Span::new(29, 55)),
            ],
            vec![],
        ),
    );
    p.module("/proj/a.vf", module(vec![], vec![export_let("Thing", Span::new(0, 20))]));
    p.target("/proj/main.vf", "./a", "/proj/a.vf");

    let r = p.resolve("/proj/main.vf");
    assert!(errors(&r).is_empty(), "got: {:?}", r.diagnostics);
    let edge = r
        .graph
        .edge(&ModulePath::from("/proj/main.vf"), &ModulePath::from("/proj/a.vf"))
        .expect("edge");
    assert!(!edge.is_type_only, "value import must win");
    assert_eq!(edge.import_span, Span::new(0, 28), "first location retained");
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn resolution_is_deterministic() {
    let build = || {
        let mut p = Project::new();
        p.module(
            "/proj/main.vf",
            module(
                vec![
                    import("./b", &["f"], Span::new(0, 20)),
                    import("./a", &["g"], Span::new(21, 41)),
                ],
                vec![],
            ),
        );
        p.module("/proj/a.vf", module(vec![], vec![export_let("g", Span::new(0, 16))]));
        p.module("/proj/b.vf", module(vec![], vec![export_let("f", Span::new(0, 16))]));
        p.target("/proj/main.vf", "./a", "/proj/a.vf");
        p.target("/proj/main.vf", "./b", "/proj/b.vf");
        let r = p.resolve("/proj/main.vf");
        (
            r.order.clone(),
            r.diagnostics.iter().map(|d| d.code.clone()).collect::<Vec<_>>(),
        )
    };
    assert_eq!(build(), build());
}
