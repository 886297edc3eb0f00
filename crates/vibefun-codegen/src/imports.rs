//! Import collection and formatting.
//!
//! Value imports are collected across all `import` declarations and
//! `external … from` declarations; type-only items are dropped (a
//! type-only item from the same source as a value item collapses into the
//! value import). Relative and absolute paths get a `.js` suffix; bare
//! and scoped package names pass through. Duplicate `{name, alias}` pairs
//! from one source are deduplicated.

use crate::ident::escape;
use crate::Emitter;
use vibefun_core::CoreDecl;

/// Format an import path for emission: `./`, `../`, and `/` paths receive
/// a `.js` suffix if not already present; package specifiers pass through.
pub fn format_import_path(source: &str) -> String {
    let relative = source.starts_with("./") || source.starts_with("../") || source.starts_with('/');
    if relative && !source.ends_with(".js") {
        format!("{source}.js")
    } else {
        source.to_string()
    }
}

/// One `import { … } from "…";` line.
fn import_line(source: &str, items: &[(String, Option<String>)]) -> String {
    let rendered: Vec<String> = items
        .iter()
        .map(|(name, alias)| {
            let local = escape(alias.as_deref().unwrap_or(name));
            if local == *name {
                local
            } else {
                format!("{name} as {local}")
            }
        })
        .collect();
    format!(
        "import {{ {} }} from \"{}\";\n",
        rendered.join(", "),
        format_import_path(source)
    )
}

impl Emitter<'_> {
    /// Emit the import section: value imports (insertion order of first
    /// occurrence per source), then re-export statements.
    pub(crate) fn emit_imports(&mut self) -> String {
        // source -> deduplicated (name, alias) pairs, insertion-ordered.
        let mut sources: Vec<(String, Vec<(String, Option<String>)>)> = Vec::new();
        let mut add = |source: &str, name: String, alias: Option<String>| {
            let index = match sources.iter().position(|(s, _)| s == source) {
                Some(i) => i,
                None => {
                    sources.push((source.to_string(), Vec::new()));
                    sources.len() - 1
                }
            };
            let entry = &mut sources[index].1;
            if !entry.iter().any(|(n, a)| n == &name && a == &alias) {
                entry.push((name, alias));
            }
        };

        for import in &self.module.imports {
            for item in &import.items {
                if item.is_type {
                    continue;
                }
                add(&import.source, item.name.clone(), item.alias.clone());
            }
        }
        for decl in &self.module.decls {
            if let CoreDecl::External {
                js_name,
                from: Some(from),
                ..
            } = decl
            {
                // A dotted JS name imports its namespace head.
                let head = js_name.split('.').next().unwrap_or(js_name).to_string();
                add(from, head, None);
            }
        }

        let mut out = String::new();
        for (source, items) in &sources {
            out.push_str(&import_line(source, items));
        }

        // Re-exports pass straight through as ES re-export statements;
        // fully type-only ones vanish.
        for re in &self.module.re_exports {
            if re.is_type_only() {
                continue;
            }
            let path = format_import_path(&re.source);
            match &re.items {
                None => out.push_str(&format!("export * from \"{path}\";\n")),
                Some(items) => {
                    let values: Vec<String> = items
                        .iter()
                        .filter(|i| !i.is_type)
                        .map(|i| match &i.alias {
                            Some(alias) => format!("{} as {}", i.name, escape(alias)),
                            None => i.name.clone(),
                        })
                        .collect();
                    if !values.is_empty() {
                        out.push_str(&format!(
                            "export {{ {} }} from \"{path}\";\n",
                            values.join(", ")
                        ));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_get_js_suffix() {
        assert_eq!(format_import_path("./utils"), "./utils.js");
        assert_eq!(format_import_path("../lib/math"), "../lib/math.js");
        assert_eq!(format_import_path("/abs/mod"), "/abs/mod.js");
        assert_eq!(format_import_path("./already.js"), "./already.js");
    }

    #[test]
    fn package_names_pass_through() {
        assert_eq!(format_import_path("fs"), "fs");
        assert_eq!(format_import_path("@scope/pkg"), "@scope/pkg");
    }

    #[test]
    fn import_line_escapes_locals() {
        let line = import_line(
            "./m",
            &[
                ("helper".to_string(), None),
                ("thing".to_string(), Some("class".to_string())),
            ],
        );
        assert_eq!(
            line,
            "import { helper, thing as class$ } from \"./m.js\";\n"
        );
    }
}
