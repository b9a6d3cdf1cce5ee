use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use maintdb_core::config::Config;
use maintdb_core::{logging, Error};
use maintdb_vector::{RetrievalPolicy, Retriever};

#[derive(Parser)]
#[command(name = "maintdb", version, about = "Maintenance document index and retrieval")]
struct Cli {
    /// Configuration environment (selects config.<env>.toml)
    #[arg(long, env = "RUST_ENV", default_value = "dev", global = true)]
    env: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the index from the document tree
    Ingest {
        /// Document tree to index (defaults to data.dataset_dir)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Search the index
    Query {
        text: String,
        /// Number of passages (defaults to search.default_k)
        #[arg(short, long)]
        k: Option<usize>,
        /// Also print the context blocks handed to a prompt
        #[arg(long)]
        context: bool,
    },
    /// Show what the current index was built from
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_for_env(&cli.env).map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    logging::init(&settings.logging);
    debug!("Settings: {:?}", settings);

    let retriever = Retriever::from_settings(&settings);
    let policy = RetrievalPolicy::from(&settings.search);

    match cli.command {
        Command::Ingest { dataset } => {
            let root = dataset.unwrap_or_else(|| settings.data.dataset_path());
            println!("📥 Ingesting from {}", root.display());
            let summary = retriever.rebuild(&root)?;
            for (path, reason) in summary.ingest.skipped() {
                println!("⚠️  Skipped {}: {}", path.display(), reason);
            }
            println!(
                "✅ Ingest complete: {} vectors (dim {}) from {} files",
                summary.stats.vector_count, summary.stats.dim, summary.stats.file_count
            );
        }
        Command::Query { text, k, context } => {
            let k = k.unwrap_or(policy.k);
            let results = match retriever.search(&text, k) {
                Ok(results) => results,
                Err(Error::IndexNotFound { .. }) => {
                    eprintln!("❌ No index built yet. Run `maintdb ingest` first.");
                    std::process::exit(1);
                }
                Err(e) if e.requires_rebuild() => {
                    eprintln!("❌ {}. Run `maintdb ingest` to rebuild.", e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };
            println!("🔎 {} result(s) for \"{}\"", results.len(), text);
            for (rank, result) in results.iter().enumerate() {
                let citation = policy.citation(result);
                println!(
                    "{:>2}. [{:.4}] {} p.{} ({}) {}",
                    rank + 1,
                    result.score,
                    citation.name,
                    citation.page,
                    citation.doc_type,
                    citation.href
                );
                let preview: String = result.chunk.text.chars().take(160).collect();
                println!("    {}", preview.replace('\n', " "));
            }
            if policy.needs_fallback(&results) {
                println!(
                    "ℹ️  Fewer than {} local passages; a fallback source would be consulted",
                    policy.min_local_passages
                );
            }
            if context {
                println!("\n{}", policy.render_context(&results));
            }
        }
        Command::Status => match retriever.status()? {
            Some(meta) => {
                println!("📦 Index at {}", retriever.store().dir().display());
                println!("   vectors:  {}", meta.count);
                println!("   dim:      {}", meta.dimension);
                println!("   embedder: {}", meta.embedder_id);
                println!("   built:    {}", meta.built_at.to_rfc3339());
            }
            None => println!("No index built yet in {}", retriever.store().dir().display()),
        },
    }
    Ok(())
}
