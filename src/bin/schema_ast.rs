//! Schema AST CLI
//!
//! Loads a JSON Schema file, resolves its local references, parses it and
//! prints the resulting AST as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use schema_ast::{parse, Ast, AstKind, OutputFormat, SchemaAstConfig, SchemaDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-ast")]
#[command(about = "Parse a JSON Schema into a typed declaration AST")]
struct Cli {
    /// JSON Schema file to parse
    schema: PathBuf,

    /// Config file (in addition to schema-ast.toml lookups)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit each schema's own definitions even when nothing references them
    #[arg(long)]
    unreachable_definitions: bool,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print one line per declaration instead of the full AST
    #[arg(short, long)]
    summary: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SchemaAstConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    if cli.unreachable_definitions {
        config.parser.unreachable_definitions = true;
    }
    if cli.compact {
        config.output.format = OutputFormat::Compact;
    }

    let document = SchemaDocument::from_path(&cli.schema)
        .with_context(|| format!("failed to load {}", cli.schema.display()))?;
    let ast = parse(&document, &config.parser)
        .with_context(|| format!("failed to parse {}", cli.schema.display()))?;

    let rendered = if cli.summary {
        summarize(&ast)
    } else {
        match config.output.format {
            OutputFormat::Pretty => serde_json::to_string_pretty(&ast)?,
            OutputFormat::Compact => serde_json::to_string(&ast)?,
        }
    };

    match cli.output {
        Some(path) => {
            fs::write(&path, rendered + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("✅ Wrote AST to: {:?}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// One line per named declaration, in allocation order
fn summarize(ast: &Ast) -> String {
    let mut lines = Vec::new();
    for (id, node) in ast.declarations() {
        let name = node.standalone_name.as_deref().unwrap_or_default();
        let shape = match &node.kind {
            AstKind::Interface { params, super_types } if super_types.is_empty() => {
                format!("interface ({} members)", params.len())
            }
            AstKind::Interface { params, super_types } => {
                let parents: Vec<_> = super_types
                    .iter()
                    .filter_map(|&s| ast[s].standalone_name.as_deref())
                    .collect();
                format!(
                    "interface ({} members) extends {}",
                    params.len(),
                    parents.join(", ")
                )
            }
            AstKind::Enum { members } => format!("enum ({} members)", members.len()),
            AstKind::Union { members } => format!("union ({} members)", members.len()),
            AstKind::Intersection { members } => {
                format!("intersection ({} members)", members.len())
            }
            AstKind::Tuple { elements } => format!("tuple ({} elements)", elements.len()),
            AstKind::Array { .. } => "array".to_string(),
            AstKind::Literal { value } => format!("literal {}", value),
            AstKind::Any => "any".to_string(),
            AstKind::Boolean => "boolean".to_string(),
            AstKind::Null => "null".to_string(),
            AstKind::Number => "number".to_string(),
            AstKind::String => "string".to_string(),
        };
        lines.push(format!("{:<6} {}: {}", id.to_string(), name, shape));
    }
    lines.join("\n")
}
