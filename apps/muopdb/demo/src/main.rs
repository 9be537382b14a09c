//! MuopDB demo
//!
//! Embeds a file of sentences with Gemini, loads the vectors into a MuopDB
//! collection and runs a similarity search against it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_muopdb::{GeminiProvider, IndexClient, MuopDbClient};
use eyre::{Result, WrapErr};
use tracing::info;

mod config;
mod demo;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "muopdb-demo")]
#[command(about = "Load sentence embeddings into MuopDB and search them")]
struct Cli {
    /// YAML config file. Defaults to the built-in document.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the sentences file and cache the vectors
    Embed,

    /// Create the collection and insert the cached vectors
    Insert,

    /// Search the collection (default)
    Search {
        /// Query text. Defaults to demo.query from the config.
        #[arg(short, long)]
        query: Option<String>,

        /// Number of results. Defaults to demo.top_k from the config.
        #[arg(short = 'k', long)]
        top_k: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let mut config =
        AppConfig::load(cli.config.as_deref()).wrap_err("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Commands::Search {
        query: None,
        top_k: None,
    });

    match command {
        Commands::Embed => {
            let provider = GeminiProvider::new(config.gemini.clone())?;
            info!(model = provider.model(), "Embedding sentences");
            let count = demo::embed_sentences(&provider, &config.demo).await?;
            println!(
                "Saved {} embeddings to {}",
                count,
                config.demo.embeddings_path.display()
            );
        }

        Commands::Insert => {
            let client = MuopDbClient::connect(&config.muopdb)
                .await
                .wrap_err_with(|| format!("Failed to connect to {}", config.muopdb.endpoint()))?;
            let result = demo::insert_embeddings(&client, &config.demo).await;
            client.close().await?;

            let report = result?;
            println!(
                "Inserted {} documents in {} batches ({:?}), flushed segments: {:?}",
                report.documents_inserted, report.batches, report.elapsed, report.flushed_segments
            );
        }

        Commands::Search { query, top_k } => {
            if let Some(query) = query {
                config.demo.query = query;
            }
            if let Some(top_k) = top_k {
                config.demo.top_k = top_k;
            }

            let provider = GeminiProvider::new(config.gemini.clone())?;
            let client = MuopDbClient::connect(&config.muopdb)
                .await
                .wrap_err_with(|| format!("Failed to connect to {}", config.muopdb.endpoint()))?;
            let result = demo::search_sentences(&client, &provider, &config.demo).await;
            client.close().await?;

            let outcome = result?;
            println!("Query: {}", config.demo.query);
            println!(
                "Time taken for search: {} seconds",
                outcome.elapsed.as_secs_f64()
            );
            println!("Number of results: {}", outcome.hits.len());
            println!("================");
            for hit in &outcome.hits {
                match &hit.sentence {
                    Some(sentence) => println!("RESULT [{:.4}]: {}", hit.score, sentence),
                    None => println!("RESULT [{:.4}]: <document {}>", hit.score, hit.ordinal),
                }
            }
            println!("================");
        }
    }

    Ok(())
}
