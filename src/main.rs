//! FALSE compiler CLI.
//!
//! Command-line interface for compiling FALSE programs to LLVM IR.

use clap::Parser as ClapParser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(name = "falsec")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FALSE compiler - compile FALSE programs to LLVM IR", long_about = None)]
struct Cli {
    /// Input FALSE source file
    input: Option<PathBuf>,

    /// Output .ll path (defaults to the input filename with an .ll extension)
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let Some(input) = cli.input else {
        eprintln!("Filename required");
        process::exit(1);
    };
    let output = cli.output.unwrap_or_else(|| input.with_extension("ll"));

    if let Err(e) = run_build(&input, &output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_build(input: &Path, output: &Path) -> Result<(), String> {
    let source = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;

    let mut parser = falsec::Parser::new(&source);
    let program = parser.parse()?;
    println!("Parsed AST");

    let mut codegen = falsec::CodeGen::new();
    let ir = codegen.codegen_program(&program).map_err(|e| e.to_string())?;

    fs::write(output, ir).map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    println!("Compiled to {}", output.display());
    Ok(())
}
