use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use apexgen::record_type::{demo_metadata, render_record_types};
use apexgen::{parse, resolve_imports, GenerateOptions, Generator, ImportRegistry};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "apexgen",
    version,
    about = "Print the imports and canonical formatting of an Apex file"
)]
struct Cli {
    /// Apex source file
    #[arg(required_unless_present = "record_types")]
    file: Option<PathBuf>,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// JSON import registry to use instead of the built-in one
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Print the built-in record type classes and exit
    #[arg(long, conflicts_with = "file")]
    record_types: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Build the complete output before anything is printed
fn run(cli: &Cli) -> Result<String> {
    let generator = Generator::with_options(GenerateOptions {
        indent_width: cli.indent,
    });

    if cli.record_types {
        let text = render_record_types(&demo_metadata(), &generator)
            .context("failed to render record types")?;
        return Ok(format!("{text}\n"));
    }

    let path = cli
        .file
        .as_ref()
        .context("no input file given")?;

    let registry = match &cli.registry {
        Some(registry_path) => ImportRegistry::from_path(registry_path)
            .with_context(|| format!("failed to load registry {}", registry_path.display()))?,
        None => ImportRegistry::default(),
    };

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let unit = parse(&source).with_context(|| format!("failed to parse {}", path.display()))?;

    let imports = resolve_imports(&unit, &registry).context("failed to resolve imports")?;
    let code = generator.render(&unit).context("failed to generate source")?;

    let mut output = String::new();
    for import in &imports {
        output.push_str(&format!("import {import};\n"));
    }
    output.push('\n');
    output.push_str(&code);
    output.push('\n');
    Ok(output)
}
