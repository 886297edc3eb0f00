//! The Vibefun compiler CLI.
//!
//! Provides the `vibefunc` command:
//!
//! - `vibefunc build <unit.json>` - compile a JSON compilation unit (the
//!   loader contract: parsed module ASTs, import resolution, entry point)
//!   to one ES module per source module.
//!
//! Options:
//! - `--out-dir` - directory for the emitted `.js` files
//! - `--json-diagnostics` - print diagnostics as JSON instead of reports

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use vibefun_common::SourceMap;
use vibefunc::{compile, render, CompilerInput};

#[derive(Parser)]
#[command(name = "vibefunc", version, about = "The Vibefun compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON compilation unit to ES modules
    Build {
        /// Path to the compilation unit (JSON, produced by the loader)
        unit: PathBuf,

        /// Output directory for the emitted .js files
        #[arg(long = "out-dir", default_value = "out")]
        out_dir: PathBuf,

        /// Print diagnostics as JSON instead of rendered reports
        #[arg(long = "json-diagnostics")]
        json_diagnostics: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            unit,
            out_dir,
            json_diagnostics,
        } => {
            if let Err(e) = build(&unit, &out_dir, json_diagnostics) {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Execute the build pipeline: read the unit, compile, report, write.
fn build(unit_path: &Path, out_dir: &Path, json_diagnostics: bool) -> Result<(), String> {
    let text = std::fs::read_to_string(unit_path)
        .map_err(|e| format!("failed to read '{}': {}", unit_path.display(), e))?;
    let input: CompilerInput = serde_json::from_str(&text)
        .map_err(|e| format!("'{}' is not a valid compilation unit: {}", unit_path.display(), e))?;

    let result = compile(&input);

    if !result.diagnostics.is_empty() {
        if json_diagnostics {
            let rendered = serde_json::to_string_pretty(&result.diagnostics)
                .map_err(|e| format!("failed to serialize diagnostics: {}", e))?;
            eprintln!("{rendered}");
        } else {
            let mut sources = SourceMap::new();
            for (path, entry) in &input.modules {
                sources.add(path.clone(), entry.source.clone());
            }
            eprint!("{}", render::render_all(&result.diagnostics, &sources));
        }
    }

    if !result.success {
        return Err("compilation failed due to errors above".to_string());
    }

    std::fs::create_dir_all(out_dir)
        .map_err(|e| format!("failed to create '{}': {}", out_dir.display(), e))?;
    for (module_path, js) in &result.outputs {
        let file = out_dir.join(module_path.js_file_name());
        std::fs::write(&file, js)
            .map_err(|e| format!("failed to write '{}': {}", file.display(), e))?;
        eprintln!("  emitted: {}", file.display());
    }

    Ok(())
}
