//! Client tests against the in-process fake index server
//!
//! These tests exercise the full gRPC path: request conversion, the
//! request-id interceptor, zstd negotiation and status mapping.

use domain_muopdb::*;
use test_utils::assertions::{assert_descending, assert_some};
use test_utils::{TestDataBuilder, TestMuopDb};

async fn connect(muopdb: &TestMuopDb) -> MuopDbClient {
    let config = MuopDbConfig::new(muopdb.host(), muopdb.port()).with_compression(true);
    MuopDbClient::connect(&config).await.unwrap()
}

fn ids(range: std::ops::Range<u64>) -> Vec<Id> {
    range.map(sequential_id).collect()
}

#[tokio::test]
async fn test_create_collection_twice_reports_already_exists() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;
    let builder = TestDataBuilder::from_test_name("create_twice");
    let collection = builder.name("collection", "main");

    client.create_collection(&collection).await.unwrap();
    let err = client.create_collection(&collection).await.unwrap_err();

    assert!(err.is_already_exists());
    assert!(matches!(
        err,
        MuopDbError::Rpc {
            operation: "CreateCollection",
            ..
        }
    ));
}

#[tokio::test]
async fn test_insert_flush_search_round_trip() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;
    let builder = TestDataBuilder::from_test_name("insert_flush_search");
    let collection = builder.name("collection", "main");
    let vectors = builder.vectors(12, 8);

    client.create_collection(&collection).await.unwrap();
    let inserted = client
        .insert(InsertRequest::new(&collection, ids(0..12), vectors.concat()))
        .await
        .unwrap();
    assert_eq!(inserted.num_docs_inserted, 12);

    // Insert never flushes on its own
    assert_eq!(muopdb.server().calls().flush, 0);
    assert_eq!(muopdb.server().pending_count(&collection), Some(12));

    let flushed = client.flush(&collection).await.unwrap();
    assert_eq!(flushed.flushed_segments.len(), 1);

    let response = client
        .search(SearchRequest::new(&collection, vectors[3].clone(), 5).with_record_metrics(true))
        .await
        .unwrap();

    assert_eq!(response.len(), 5);
    assert_eq!(response.doc_ids.len(), response.scores.len());
    assert_descending(&response.scores, "search scores");
    assert_eq!(response.num_pages_accessed, 12);
    assert!(response.doc_ids.iter().all(|id| id_ordinal(id) < 12));
}

#[tokio::test]
async fn test_search_returns_best_match_first() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    client.create_collection("axes").await.unwrap();
    client
        .insert(InsertRequest::new(
            "axes",
            ids(0..3),
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        ))
        .await
        .unwrap();
    client.flush("axes").await.unwrap();

    let response = client
        .search(SearchRequest::new("axes", vec![0.1, 0.2, 0.9], 2))
        .await
        .unwrap();

    let hits: Vec<(u64, f32)> = response
        .hits()
        .map(|(id, score)| (id_ordinal(id), score))
        .collect();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0, 2);
    assert_eq!(hits[1].0, 1);
}

#[tokio::test]
async fn test_insert_packed_matches_insert() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;
    let builder = TestDataBuilder::from_test_name("insert_packed");
    let vectors = builder.vectors(4, 3);

    client.create_collection("packed").await.unwrap();
    let inserted = client
        .insert_packed(InsertRequest::new("packed", ids(100..104), vectors.concat()))
        .await
        .unwrap();

    assert_eq!(inserted.num_docs_inserted, 4);
    assert_eq!(muopdb.server().calls().insert_packed, 1);
    assert_eq!(
        muopdb.server().document_ids("packed"),
        vec![(100, 0), (101, 0), (102, 0), (103, 0)]
    );
}

#[tokio::test]
async fn test_user_ids_scope_search() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    client.create_collection("tenants").await.unwrap();
    client
        .insert(InsertRequest::new("tenants", ids(0..1), vec![1.0, 1.0]).with_user_ids([b"alice".to_vec()]))
        .await
        .unwrap();
    client.flush("tenants").await.unwrap();

    let as_default = client
        .search(SearchRequest::new("tenants", vec![1.0, 1.0], 10))
        .await
        .unwrap();
    assert!(as_default.is_empty());

    let as_alice = client
        .search(SearchRequest::new("tenants", vec![1.0, 1.0], 10).with_user_ids([b"alice".to_vec()]))
        .await
        .unwrap();
    assert_eq!(as_alice.len(), 1);
}

#[tokio::test]
async fn test_search_without_user_ids_uses_default_user() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    client.create_collection("default_search").await.unwrap();
    client
        .insert(InsertRequest::new("default_search", ids(0..1), vec![1.0, 0.5]))
        .await
        .unwrap();
    client.flush("default_search").await.unwrap();

    let response = client
        .search(
            SearchRequest::new("default_search", vec![1.0, 0.5], 10)
                .with_user_ids(Vec::<Vec<u8>>::new()),
        )
        .await
        .unwrap();
    assert_eq!(response.len(), 1);
}

#[tokio::test]
async fn test_insert_without_user_ids_is_searchable_by_default() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    client.create_collection("default_insert").await.unwrap();
    client
        .insert(InsertRequest::new("default_insert", ids(0..1), vec![1.0, 0.5]))
        .await
        .unwrap();
    client
        .insert(
            InsertRequest::new("default_insert", ids(1..2), vec![0.5, 1.0])
                .with_user_ids(Vec::<Vec<u8>>::new()),
        )
        .await
        .unwrap();
    client
        .insert_packed(
            InsertRequest::new("default_insert", ids(2..3), vec![0.5, 0.5])
                .with_user_ids(Vec::<Vec<u8>>::new()),
        )
        .await
        .unwrap();
    client.flush("default_insert").await.unwrap();

    let response = client
        .search(SearchRequest::new("default_insert", vec![1.0, 1.0], 10))
        .await
        .unwrap();
    let mut found: Vec<u64> = response.doc_ids.iter().map(id_ordinal).collect();
    found.sort_unstable();
    assert_eq!(found, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_create_collection_with_config_ships_fields() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    let config = CollectionConfig {
        num_features: Some(4),
        quantization_type: Some(QuantizerType::ProductQuantizer),
        clustering_distance_threshold_pct: Some(12.5),
        reindex: Some(true),
        ..CollectionConfig::new("tuned")
    };
    client.create_collection_with_config(config).await.unwrap();

    let shipped = assert_some(muopdb.server().collection_config("tuned"), "shipped config");
    assert_eq!(shipped.num_features, Some(4));
    assert_eq!(shipped.quantization_type, Some(1));
    assert_eq!(shipped.clustering_distance_threshold_pct, Some(12.5));
    assert_eq!(shipped.reindex, Some(true));
    assert_eq!(shipped.max_pending_ops, None);

    // The server enforces num_features on insert
    let err = client
        .insert(InsertRequest::new("tuned", ids(0..1), vec![1.0, 2.0]))
        .await
        .unwrap_err();
    assert_eq!(err.status().unwrap().code(), tonic::Code::InvalidArgument);
}

#[tokio::test]
async fn test_unknown_collection_error_is_propagated() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    let err = client.flush("missing").await.unwrap_err();
    assert!(matches!(err, MuopDbError::Rpc { operation: "Flush", .. }));
    assert_eq!(err.status().unwrap().code(), tonic::Code::NotFound);
}

#[tokio::test]
async fn test_every_call_carries_a_request_id() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    client.create_collection("traced").await.unwrap();
    client.flush("traced").await.unwrap();

    let request_ids = muopdb.server().request_ids();
    assert_eq!(request_ids.len(), 2);
    assert_ne!(request_ids[0], request_ids[1]);
    assert_eq!(
        muopdb.server().source_services(),
        vec!["domain-muopdb".to_string(); 2]
    );
}

#[tokio::test]
async fn test_close_blocks_further_calls() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;

    client.create_collection("closing").await.unwrap();
    client.close().await.unwrap();

    assert!(matches!(
        client.search(SearchRequest::new("closing", vec![1.0], 1)).await,
        Err(MuopDbError::ConnectionClosed)
    ));
    assert!(matches!(client.close().await, Err(MuopDbError::ConnectionClosed)));
    assert_eq!(muopdb.server().calls().search, 0);
}

#[tokio::test]
async fn test_concurrent_inserts_share_one_client() {
    let muopdb = TestMuopDb::start().await;
    let client = std::sync::Arc::new(connect(&muopdb).await);
    client.create_collection("shared").await.unwrap();

    let handles: Vec<_> = (0..4u64)
        .map(|task| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .insert(InsertRequest::new(
                        "shared",
                        ids(task * 10..task * 10 + 10),
                        vec![0.5; 20],
                    ))
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().num_docs_inserted, 10);
    }
    assert_eq!(muopdb.server().document_count("shared"), Some(40));
}

#[tokio::test]
async fn test_auto_flush_makes_inserts_searchable() {
    let muopdb = TestMuopDb::start().await;
    let client = AutoFlush::new(connect(&muopdb).await);

    client.create_collection("auto").await.unwrap();
    client
        .insert(InsertRequest::new("auto", ids(0..2), vec![1.0, 0.0, 0.0, 1.0]))
        .await
        .unwrap();

    assert_eq!(muopdb.server().calls().flush, 1);
    let response = client
        .search(SearchRequest::new("auto", vec![1.0, 0.0], 1))
        .await
        .unwrap();
    assert_eq!(response.len(), 1);
    assert_eq!(id_ordinal(&response.doc_ids[0]), 0);
}

#[tokio::test]
async fn test_batch_inserter_against_server() {
    let muopdb = TestMuopDb::start().await;
    let client = connect(&muopdb).await;
    let vectors = TestDataBuilder::from_test_name("batch_inserter").vectors(12, 4);

    client.create_collection("batched").await.unwrap();
    let report = BatchInserter::new(&client, 5)
        .insert_all("batched", &vectors)
        .await
        .unwrap();

    assert_eq!(report.batches, 3);
    assert_eq!(report.documents_inserted, 12);
    assert_eq!(report.flushed_segments, vec!["segment_0".to_string()]);

    let calls = muopdb.server().calls();
    assert_eq!((calls.insert, calls.flush), (3, 1));
    let stored: Vec<u64> = muopdb
        .server()
        .document_ids("batched")
        .into_iter()
        .map(|(low, _)| low)
        .collect();
    assert_eq!(stored, (0..12).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_batch_failure_leaves_earlier_batches_in_place() {
    let muopdb = TestMuopDb::start().await;
    muopdb.server().fail_insert_at(2);
    let client = connect(&muopdb).await;
    let vectors = TestDataBuilder::from_test_name("batch_failure").vectors(12, 4);

    client.create_collection("partial").await.unwrap();
    let err = BatchInserter::new(&client, 5)
        .insert_all("partial", &vectors)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MuopDbError::BatchFailed {
            batch: 1,
            start: 5,
            end: 10,
            ..
        }
    ));
    assert_eq!(err.status().unwrap().code(), tonic::Code::Unavailable);

    let calls = muopdb.server().calls();
    assert_eq!((calls.insert, calls.flush), (2, 0));
    assert_eq!(muopdb.server().document_count("partial"), Some(5));
}
