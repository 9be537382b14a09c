use serde::{Deserialize, Serialize};

use crate::ids::{DEFAULT_USER_ID, Id};

/// Documents to insert into a collection
///
/// `vectors` holds every document's vector back to back, so its length must
/// be a non-zero multiple of the number of doc ids. Doc ids must be exactly
/// 16 bytes; user ids may be shorter and are zero-padded.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    pub collection_name: String,
    pub doc_ids: Vec<Vec<u8>>,
    pub vectors: Vec<f32>,
    pub user_ids: Vec<Vec<u8>>,
}

impl InsertRequest {
    /// Insert under the default (zero) user
    pub fn new<I>(collection_name: impl Into<String>, doc_ids: I, vectors: Vec<f32>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        Self {
            collection_name: collection_name.into(),
            doc_ids: doc_ids.into_iter().map(Into::into).collect(),
            vectors,
            user_ids: vec![DEFAULT_USER_ID.to_vec()],
        }
    }

    pub fn with_user_ids<I>(mut self, user_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        self.user_ids = user_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Vector dimensionality implied by the payload, if it is well formed
    pub fn dimensions(&self) -> Option<usize> {
        let docs = self.doc_ids.len();
        if docs == 0 || self.vectors.is_empty() || self.vectors.len() % docs != 0 {
            return None;
        }
        Some(self.vectors.len() / docs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResponse {
    pub num_docs_inserted: u32,
}

/// Nearest-neighbour query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub collection_name: String,
    pub vector: Vec<f32>,
    pub top_k: u32,
    pub ef_construction: u32,
    pub record_metrics: bool,
    pub user_ids: Vec<Vec<u8>>,
}

impl SearchRequest {
    pub const DEFAULT_EF_CONSTRUCTION: u32 = 100;

    pub fn new(collection_name: impl Into<String>, vector: Vec<f32>, top_k: u32) -> Self {
        Self {
            collection_name: collection_name.into(),
            vector,
            top_k,
            ef_construction: Self::DEFAULT_EF_CONSTRUCTION,
            record_metrics: false,
            user_ids: vec![DEFAULT_USER_ID.to_vec()],
        }
    }

    pub fn with_ef_construction(mut self, ef_construction: u32) -> Self {
        self.ef_construction = ef_construction;
        self
    }

    pub fn with_record_metrics(mut self, record_metrics: bool) -> Self {
        self.record_metrics = record_metrics;
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
}

/// Search results in the order the server ranked them
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub doc_ids: Vec<Id>,
    pub scores: Vec<f32>,
    pub num_pages_accessed: u64,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// (doc id, score) pairs, best match first
    pub fn hits(&self) -> impl Iterator<Item = (&Id, f32)> + '_ {
        self.doc_ids.iter().zip(self.scores.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlushResponse {
    pub flushed_segments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::sequential_id;

    #[test]
    fn test_insert_request_defaults_to_zero_user() {
        let request = InsertRequest::new("docs", [sequential_id(0)], vec![0.5; 4]);
        assert_eq!(request.user_ids, vec![vec![0u8; 16]]);
        assert_eq!(request.dimensions(), Some(4));
    }

    #[test]
    fn test_insert_request_dimensions() {
        let ids = [sequential_id(0), sequential_id(1)];
        assert_eq!(InsertRequest::new("c", ids, vec![0.0; 6]).dimensions(), Some(3));
        assert_eq!(InsertRequest::new("c", ids, vec![0.0; 5]).dimensions(), None);
        assert_eq!(InsertRequest::new("c", ids, vec![]).dimensions(), None);

        let no_ids: [Id; 0] = [];
        assert_eq!(InsertRequest::new("c", no_ids, vec![1.0]).dimensions(), None);
    }

    #[test]
    fn test_search_request_builder() {
        let request = SearchRequest::new("docs", vec![1.0, 0.0], 5)
            .with_ef_construction(64)
            .with_record_metrics(true)
            .with_user_ids([b"alice".to_vec()]);

        assert_eq!(request.top_k, 5);
        assert_eq!(request.ef_construction, 64);
        assert!(request.record_metrics);
        assert_eq!(request.user_ids, vec![b"alice".to_vec()]);
    }

    #[test]
    fn test_search_response_hits() {
        let response = SearchResponse {
            doc_ids: vec![sequential_id(3), sequential_id(1)],
            scores: vec![0.9, 0.4],
            num_pages_accessed: 2,
        };
        let hits: Vec<_> = response.hits().collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], (&sequential_id(3), 0.9));
        assert_eq!(response.len(), 2);
        assert!(!response.is_empty());
    }
}
