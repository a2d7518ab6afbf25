//! AgentInterface CLI - registry discovery and composition tools
//!
//! Commands:
//!   agentinterface discover             - Scan TSX components and write ai.json
//!   agentinterface protocol [TYPES...]  - Print agent instructions
//!   agentinterface render <file>        - Render a composition as text

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agentinterface::render::text;
use agentinterface::{protocol, Discovery, DiscoveryConfig, Manifest, Renderer, SchemaStore};

#[derive(Parser)]
#[command(name = "agentinterface")]
#[command(about = "Component registry and renderer for agent-composed interfaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover component metadata and write the registry
    Discover {
        /// Project root to scan
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Registry output path, relative to the root
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Skip scanning third-party dependencies
        #[arg(long)]
        no_ecosystem: bool,
    },

    /// Print the component instructions given to agents
    Protocol {
        /// Registry file to describe
        #[arg(long, default_value = "ai.json")]
        registry: PathBuf,

        /// Offer only these component types
        types: Vec<String>,
    },

    /// Render a composition JSON file as plain text
    Render {
        /// Composition file
        file: PathBuf,

        /// Registry whose schemas validate the composition
        #[arg(long, default_value = "ai.json")]
        registry: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agentinterface=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Discover {
            root,
            output,
            no_ecosystem,
        } => discover_command(&root, output, no_ecosystem),
        Commands::Protocol { registry, types } => protocol_command(&registry, &types),
        Commands::Render { file, registry } => render_command(&file, &registry),
    }
}

fn discover_command(root: &Path, output: Option<PathBuf>, no_ecosystem: bool) -> anyhow::Result<()> {
    let mut config = DiscoveryConfig::default().with_ecosystem(!no_ecosystem);
    if let Some(output) = output {
        config = config.with_output(output);
    }
    let path = config.output_path(root);

    let mut discovery = Discovery::new(config)?;
    let manifest = discovery
        .build(root)
        .with_context(|| format!("Failed to build registry for {}", root.display()))?;

    let mut types: Vec<&str> = manifest.types().collect();
    types.sort_unstable();

    println!(
        "Found {} components from {} sources",
        manifest.total_components,
        manifest.sources.len()
    );
    println!("Types: {}", types.join(", "));
    println!("Wrote {}", path.display());
    Ok(())
}

fn protocol_command(registry: &Path, types: &[String]) -> anyhow::Result<()> {
    let manifest = load_registry(registry)?;
    println!("{}", protocol::instructions(manifest.as_ref(), types));
    Ok(())
}

fn render_command(file: &Path, registry: &Path) -> anyhow::Result<()> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let schemas = load_registry(registry)?
        .map(|manifest| SchemaStore::from_manifest(&manifest))
        .unwrap_or_default();

    let defaults = text::defaults();
    let tree = Renderer::new(&defaults)
        .with_schemas(&schemas)
        .render(input.as_str())
        .with_context(|| format!("Invalid composition in {}", file.display()))?;

    println!("{}", text::print(&tree));
    Ok(())
}

/// Load the registry if it exists. A missing file is not an error.
fn load_registry(path: &Path) -> anyhow::Result<Option<Manifest>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no registry");
        return Ok(None);
    }
    let manifest = Manifest::load(path)
        .with_context(|| format!("Failed to load registry {}", path.display()))?;
    Ok(Some(manifest))
}
