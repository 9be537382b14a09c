//! Bulk loading: fixed-size Insert batches followed by one Flush

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::IndexClient;
use crate::error::{MuopDbError, MuopDbResult};
use crate::ids::{DEFAULT_USER_ID, Id, sequential_id};
use crate::models::InsertRequest;

/// How sequential doc ids are assigned across batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdNumbering {
    /// Ids follow the vector's position in the whole input
    #[default]
    Global,
    /// Ids restart at zero in every batch
    PerBatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub batches: usize,
    pub documents_inserted: u64,
    pub flushed_segments: Vec<String>,
    pub elapsed: Duration,
}

/// Loads a list of vectors into a collection in batches
///
/// Batches go out one at a time in input order. The first failing batch
/// stops the load: later batches are not sent and no Flush is issued.
/// Batches already accepted by the server stay there.
pub struct BatchInserter<'a, C: ?Sized> {
    client: &'a C,
    batch_size: usize,
    numbering: IdNumbering,
    user_ids: Vec<Vec<u8>>,
}

impl<'a, C: IndexClient + ?Sized> BatchInserter<'a, C> {
    pub fn new(client: &'a C, batch_size: usize) -> Self {
        Self {
            client,
            batch_size,
            numbering: IdNumbering::default(),
            user_ids: vec![DEFAULT_USER_ID.to_vec()],
        }
    }

    pub fn with_numbering(mut self, numbering: IdNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn with_user_ids<I>(mut self, user_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        self.user_ids = user_ids.into_iter().map(Into::into).collect();
        self
    }

    fn ids_for(&self, start: usize, end: usize) -> Vec<Id> {
        let offset = match self.numbering {
            IdNumbering::Global => start,
            IdNumbering::PerBatch => 0,
        };
        (0..end - start)
            .map(|i| sequential_id((offset + i) as u64))
            .collect()
    }

    fn check_input(&self, vectors: &[Vec<f32>]) -> MuopDbResult<()> {
        if self.batch_size == 0 {
            return Err(MuopDbError::Validation(
                "batch size must be greater than zero".to_string(),
            ));
        }
        let Some(first) = vectors.first() else {
            return Ok(());
        };
        if first.is_empty() {
            return Err(MuopDbError::Validation(
                "vectors must have at least one dimension".to_string(),
            ));
        }
        if let Some(index) = vectors.iter().position(|v| v.len() != first.len()) {
            return Err(MuopDbError::Validation(format!(
                "vector {} has {} dimensions, expected {}",
                index,
                vectors[index].len(),
                first.len()
            )));
        }
        Ok(())
    }

    /// Insert every vector, then flush once
    #[instrument(skip(self, vectors), fields(vectors = vectors.len(), batch_size = self.batch_size))]
    pub async fn insert_all(
        &self,
        collection_name: &str,
        vectors: &[Vec<f32>],
    ) -> MuopDbResult<BatchReport> {
        self.check_input(vectors)?;

        let started = Instant::now();
        let mut documents_inserted = 0u64;
        let mut batches = 0;

        for (batch, chunk) in vectors.chunks(self.batch_size).enumerate() {
            let start = batch * self.batch_size;
            let end = start + chunk.len();

            let request = InsertRequest::new(collection_name, self.ids_for(start, end), chunk.concat())
                .with_user_ids(self.user_ids.clone());

            let response = self.client.insert(request).await.map_err(|source| {
                tracing::error!(batch, start, end, error = %source, "Batch insert failed");
                MuopDbError::BatchFailed {
                    batch,
                    start,
                    end,
                    source: Box::new(source),
                }
            })?;

            tracing::info!(batch, start, end, "Inserted batch [{start}:{end})");
            documents_inserted += u64::from(response.num_docs_inserted);
            batches += 1;
        }

        let flushed = self.client.flush(collection_name).await?;
        let elapsed = started.elapsed();

        tracing::info!(
            documents = documents_inserted,
            batches,
            segments = flushed.flushed_segments.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Finished inserting {} vectors",
            vectors.len()
        );

        Ok(BatchReport {
            batches,
            documents_inserted,
            flushed_segments: flushed.flushed_segments,
            elapsed,
        })
    }
}
