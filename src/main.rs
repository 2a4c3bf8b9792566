use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tinymark::config::ComponentOverrides;
use tinymark::{Components, HtmlRenderer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Rendered HTML
    Html,
    /// The document tree as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tinymark")]
#[command(about = "Convert tiny Markdown into HTML or a JSON document tree")]
#[command(version)]
struct Cli {
    /// Markdown file to read (stdin when omitted)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// JSON file mapping node types to tag names
    #[arg(short, long)]
    components: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            input
        }
    };
    debug!(bytes = input.len(), "parsing");

    let tree = tinymark::parse(&input);
    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
        Format::Html => {
            let components = match &cli.components {
                Some(path) => ComponentOverrides::load(path)?.into_components(),
                None => Components::default(),
            };
            print!("{}", HtmlRenderer::with_components(components).render(&tree));
        }
    }
    Ok(())
}
