//! Subscope CLI - extract graph fragments and rebuild their scopes

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subscope::config::{default_config_path, load_config, write_config, PartitionConfig};
use subscope::document::{load_document, write_document};
use subscope::scope::{ContextBuilder, ScopeContextStore};
use subscope::{ui, Model, NodeIndex, PartitionContext};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "subscope")]
#[command(version)]
#[command(about = "Scope resolution for graph fragments extracted from nested control-flow graphs")]
#[command(long_about = r#"
Subscope copies a subset of nodes out of a graph document and makes the
copy self-contained:
  • declares outer-scope values in nested control-flow bodies
  • adds missing values as explicit top-level inputs
  • reports structural drift and values nothing supplies

Example usage:
  subscope context --graph model.json
  subscope extract --graph model.json --nodes outer_if,relu_3 --output fragment.json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to subscope.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract nodes of the root graph into a fragment and bind its scopes
    Extract {
        /// Graph document (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Names of the root-level nodes to extract
        #[arg(short, long, value_delimiter = ',', required = true)]
        nodes: Vec<String>,

        /// Name of the fragment's root graph
        #[arg(long)]
        name: Option<String>,

        /// Write the fragment document here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on structural mismatches instead of reporting them
        #[arg(long)]
        strict: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the scope records of a graph document
    Context {
        /// Graph document (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Extract { graph, nodes, name, output, strict, format } => {
            let config = load_config(cli.config.as_deref())?
                .unwrap_or_default()
                .with_overrides(name, strict);

            tracing::info!("Extracting {:?} from {}", nodes, graph.display());
            let original = Model::from_document(&load_document(&graph)?)?;
            let root = original.root();
            let indices = nodes
                .iter()
                .map(|node| {
                    original
                        .graph(root)
                        .find_node(node)
                        .map(|(index, _)| index)
                        .ok_or_else(|| subscope::Error::NodeNotFound(node.clone()))
                })
                .collect::<Result<Vec<NodeIndex>, _>>()?;

            let context = PartitionContext::new(&original, config);
            let (fragment, outcome) = context.extract(root, &indices)?;
            let document = fragment.to_document(fragment.root());

            if let Some(path) = &output {
                write_document(path, &document)?;
            }

            if format == "json" {
                let data = serde_json::json!({
                    "fragment": document,
                    "outcome": outcome,
                });
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                ui::section(&format!("Fragment {}", document.name));
                println!("{}", ui::scope_table(&outcome.store));
                ui::bind_summary(&outcome.report);
                ui::value_list("inputs:", fragment.graph(fragment.root()).inputs());
                println!();
                print!("{}", outcome);
                for value in &outcome.unbound {
                    ui::warn(&format!("unbound {}", value));
                }
                if let Some(path) = &output {
                    ui::success(&format!("Fragment written to {}", path.display()));
                }
            }
        }

        Commands::Context { graph, format } => {
            let model = Model::from_document(&load_document(&graph)?)?;
            let mut store = ScopeContextStore::new();
            ContextBuilder::new(&model).build(model.root(), &mut store);

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&store)?);
            } else {
                ui::section(&format!("Scopes of {}", graph.display()));
                println!("{}", ui::scope_table(&store));
            }
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(default_config_path);
            write_config(&path, &PartitionConfig::default(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}
