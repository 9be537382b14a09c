//! Shared test utilities for the MuopDB crates
//!
//! This crate provides reusable test infrastructure:
//! - `TestMuopDb`: in-process fake index server on an ephemeral port
//! - `FakeGemini`: fake embeddings HTTP API with deterministic vectors
//! - `TestDataBuilder`: Deterministic test data generation
//! - `assertions`: Custom assertion helpers
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMuopDb};
//!
//! #[tokio::test]
//! async fn my_index_test() {
//!     let muopdb = TestMuopDb::start().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let collection = builder.name("collection", "main");
//!     let vectors = builder.vectors(12, 8);
//!     // connect a client to muopdb.host():muopdb.port() ...
//! }
//! ```

mod gemini;
mod muopdb;

pub use gemini::{FAKE_GEMINI_API_KEY, FakeGemini, fake_embedding};
pub use muopdb::{CallCounts, FakeIndexServer, TestMuopDb};

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded random data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// This is the recommended way to create a builder for consistent test data.
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_insert_batches");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a 16-byte user ID for testing
    pub fn user_id(&self) -> [u8; 16] {
        let bytes = self.seed.to_le_bytes();
        let mut user_id = [0u8; 16];
        user_id[..8].copy_from_slice(&bytes);
        user_id[8..16].copy_from_slice(&bytes);
        user_id
    }

    /// Generate a unique name for testing
    ///
    /// # Arguments
    ///
    /// * `prefix` - The type of resource (e.g., "collection")
    /// * `suffix` - A unique identifier within the test (e.g., "main", "backup")
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let name = builder.name("collection", "main");
    /// // Returns: "test-collection-12345-main"
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Generate `count` vectors of `dimensions` values in [-1, 1)
    ///
    /// Values come from a splitmix64 sequence seeded by the builder, so the
    /// same builder always yields the same vectors.
    pub fn vectors(&self, count: usize, dimensions: usize) -> Vec<Vec<f32>> {
        let mut state = self.seed;
        (0..count)
            .map(|_| {
                (0..dimensions)
                    .map(|_| {
                        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
                        let mut z = state;
                        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
                        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
                        z ^= z >> 31;
                        (z >> 40) as f32 / (1u64 << 23) as f32 - 1.0
                    })
                    .collect()
            })
            .collect()
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that scores are sorted from most to least relevant
    pub fn assert_descending(scores: &[f32], context: &str) {
        for pair in scores.windows(2) {
            assert!(
                pair[0] >= pair[1],
                "{}: scores not descending: {:?}",
                context,
                scores
            );
        }
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
