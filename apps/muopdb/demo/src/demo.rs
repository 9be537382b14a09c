//! The three demo flows: embed, insert and search

use std::path::Path;
use std::time::{Duration, Instant};

use domain_muopdb::{
    BatchInserter, BatchReport, EmbeddingProvider, IndexClient, SearchRequest, id_ordinal,
    load_embeddings, save_embeddings,
};
use eyre::{Result, WrapErr, eyre};
use tracing::info;

use crate::config::DemoConfig;

/// Non-empty lines of a text file, in order
pub fn read_sentences(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read sentences from {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Embed every sentence and write the vectors to the embeddings cache
pub async fn embed_sentences<E>(provider: &E, config: &DemoConfig) -> Result<usize>
where
    E: EmbeddingProvider + ?Sized,
{
    let sentences = read_sentences(&config.sentences_path)?;
    if sentences.is_empty() {
        return Err(eyre!("{} has no sentences", config.sentences_path.display()));
    }

    let embeddings = provider
        .embed_batch(&sentences)
        .await
        .wrap_err("Failed to embed sentences")?;
    save_embeddings(&config.embeddings_path, &embeddings)?;

    info!(
        sentences = sentences.len(),
        dimensions = embeddings.first().map_or(0, Vec::len),
        path = %config.embeddings_path.display(),
        "Embeddings saved"
    );
    Ok(embeddings.len())
}

/// Create the collection and load the cached embeddings into it
///
/// An existing collection is reused, so the flow can be rerun.
pub async fn insert_embeddings<C>(client: &C, config: &DemoConfig) -> Result<BatchReport>
where
    C: IndexClient + ?Sized,
{
    let embeddings = load_embeddings(&config.embeddings_path)
        .wrap_err("Failed to load embeddings; run the embed command first")?;

    match client.create_collection(&config.collection).await {
        Ok(()) => {}
        Err(err) if err.is_already_exists() => {
            tracing::warn!(collection = %config.collection, "Collection exists, appending to it");
        }
        Err(err) => return Err(err).wrap_err("Failed to create collection"),
    }

    let report = BatchInserter::new(client, config.batch_size)
        .insert_all(&config.collection, &embeddings)
        .await?;

    info!(
        documents = report.documents_inserted,
        batches = report.batches,
        "Finished inserting {} embeddings in {:?}",
        embeddings.len(),
        report.elapsed
    );
    Ok(report)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub ordinal: u64,
    pub score: f32,
    /// The sentence the id points at, if the sentences file has that line
    pub sentence: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    pub elapsed: Duration,
}

/// Embed the configured query and look up the nearest sentences
pub async fn search_sentences<C, E>(
    client: &C,
    provider: &E,
    config: &DemoConfig,
) -> Result<SearchOutcome>
where
    C: IndexClient + ?Sized,
    E: EmbeddingProvider + ?Sized,
{
    let query = provider
        .embed(&config.query)
        .await
        .wrap_err("Failed to embed query")?;
    let sentences = read_sentences(&config.sentences_path)?;

    let started = Instant::now();
    let response = client
        .search(
            SearchRequest::new(&config.collection, query, config.top_k)
                .with_ef_construction(config.ef_construction),
        )
        .await?;
    let elapsed = started.elapsed();

    let hits = response
        .hits()
        .map(|(id, score)| {
            let ordinal = id_ordinal(id);
            SearchHit {
                ordinal,
                score,
                sentence: usize::try_from(ordinal)
                    .ok()
                    .and_then(|i| sentences.get(i))
                    .cloned(),
            }
        })
        .collect();

    Ok(SearchOutcome { hits, elapsed })
}
