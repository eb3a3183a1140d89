//! Compile a Strata statement into textual IR.
//!
//! Usage: `strata-compile --statement FILE [--premise FILE]... [--witness ALIAS=FILE]...
//! [--instance ALIAS=FILE]... [--schema NAME=FILE]... [--output FILE]`

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};

use strata_compiler::{codegen, compile, CompileArgs};
use strata_tools::{load_accessor, load_schema, load_statement, parse_binding, LoadError};

#[derive(Parser, Debug)]
#[command(name = "strata-compile")]
#[command(about = "Compile a Strata statement into gadget IR")]
struct Args {
    /// Statement syntax tree (JSON)
    #[arg(long)]
    statement: PathBuf,

    /// Already-proven statement whose gadgets are dropped from the output
    #[arg(long = "premise")]
    premises: Vec<PathBuf>,

    /// Witness data for a subject, as ALIAS=FILE
    #[arg(long = "witness", value_name = "ALIAS=FILE")]
    witness: Vec<String>,

    /// Instance data for a subject, as ALIAS=FILE
    #[arg(long = "instance", value_name = "ALIAS=FILE")]
    instance: Vec<String>,

    /// Schema definition, as NAME=FILE
    #[arg(long = "schema", value_name = "NAME=FILE")]
    schemas: Vec<String>,

    /// Write the IR and slot tables as JSON instead of printing the IR
    #[arg(long)]
    output: Option<PathBuf>,

    /// Debug logging for the compiler
    #[arg(short, long)]
    verbose: bool,
}

fn build_args(args: &Args) -> Result<CompileArgs, LoadError> {
    let statement = load_statement(&args.statement)?;
    let name = args
        .statement
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "statement".to_string());

    let mut builder = CompileArgs::builder(name, statement);
    for path in &args.premises {
        builder = builder.premise(load_statement(path)?);
    }
    for binding in &args.schemas {
        let (name, path) = parse_binding(binding)?;
        builder = builder.schema(name, load_schema(&path)?);
    }
    for binding in &args.witness {
        let (alias, path) = parse_binding(binding)?;
        builder = builder.witness(alias, load_accessor(&path)?);
    }
    for binding in &args.instance {
        let (alias, path) = parse_binding(binding)?;
        builder = builder.instance(alias, load_accessor(&path)?);
    }

    Ok(builder.build())
}

fn main() {
    let args = Args::parse();
    if args.verbose {
        strata_tools::init_verbose_logging();
    } else {
        strata_tools::init_logging();
    }

    let compile_args = match build_args(&args) {
        Ok(compile_args) => compile_args,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let compilation = match compile(&compile_args) {
        Ok(compilation) => compilation,
        Err(failure) => {
            error!("{}", failure.format().trim_end());
            process::exit(1);
        }
    };

    if compilation.has_warnings() {
        warn!("{}", compilation.format_diagnostics().trim_end());
    }

    let rendered = codegen::render(&compilation.statement);

    match &args.output {
        Some(path) => {
            let document = match serde_json::to_string_pretty(&rendered.to_json()) {
                Ok(document) => document,
                Err(e) => {
                    error!("Failed to encode IR: {}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = fs::write(path, document) {
                error!("Failed to write {}: {}", path.display(), e);
                process::exit(1);
            }
            info!("Wrote IR to {}", path.display());
        }
        None => println!("{}", rendered.text),
    }
}
