use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use bareish_compiler::{compile_schema, parse_schema, BareError, GenOptions};

#[derive(Parser)]
#[command(name = "baregen")]
#[command(about = "Generate Rust type definitions from a BARE schema", long_about = None)]
struct Cli {
    /// Input schema file
    input: PathBuf,

    /// Output file; written only if the whole input compiles
    output: PathBuf,

    /// What to write to the output file
    #[arg(long, value_enum, default_value_t = Emit::Rust)]
    emit: Emit,

    /// Path of the codec crate the generated code calls into
    #[arg(long, default_value = "bare")]
    runtime: String,

    /// Derive for generated types; repeat to list several (replaces the defaults)
    #[arg(long = "derive", value_name = "TRAIT")]
    derives: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Rust source
    Rust,
    /// The parsed declarations as JSON
    Ast,
}

impl Cli {
    fn gen_options(&self) -> GenOptions {
        let mut options = GenOptions {
            runtime: self.runtime.clone(),
            ..GenOptions::default()
        };
        if !self.derives.is_empty() {
            options.derives = self.derives.clone();
        }
        options
    }
}

fn main() -> Result<(), BareError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Read schema text
    let text = fs::read_to_string(&cli.input)?;
    debug!(input = %cli.input.display(), bytes = text.len(), "read schema");

    // Render everything in memory so a failure leaves no partial output
    let rendered = match cli.emit {
        Emit::Rust => {
            let (_types, rust_code) = compile_schema(&text, &cli.gen_options())?;
            rust_code
        }
        Emit::Ast => {
            let types = parse_schema(&text)?;
            serde_json::to_string_pretty(&types)?
        }
    };

    fs::write(&cli.output, rendered)?;
    info!("Generated {} → {}", cli.input.display(), cli.output.display());
    Ok(())
}
