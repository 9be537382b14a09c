use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in the main() before any fallible operations to ensure
/// colored error output. Safe to call multiple times.
///
/// Configuration:
/// - Shows file:line where errors occur
/// - Hides environment variables (less noise)
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// - **Production** (`APP_ENV=production`):
///   - JSON format (for log aggregation)
///   - Hides module targets for cleaner logs
///
/// - **Development** (default):
///   - Pretty-printed format (human-readable)
///   - Shows module targets so `grpc_client` and domain logs can be told apart
///
/// Both include `tracing_error::ErrorLayer`, so eyre reports carry the span
/// trace of the failing call.
///
/// Environment variables:
/// - `APP_ENV`: Set to "production" for JSON logs (default: "development")
/// - `RUST_LOG`: Override log levels (e.g., "debug", "domain_muopdb=trace")
///
/// Safe to call more than once; later calls are no-ops (common in tests).
///
/// # Example with instrumentation
///
/// ```ignore
/// use domain_muopdb::{IndexClient, MuopDbClient, SearchRequest, SearchResponse};
/// use eyre::{Result, WrapErr};
/// use tracing::instrument;
///
/// #[instrument(skip(client, vector), fields(collection = %collection))]
/// async fn nearest(client: &MuopDbClient, collection: &str, vector: Vec<f32>) -> Result<SearchResponse> {
///     client
///         .search(SearchRequest::new(collection, vector, 10))
///         .await
///         .wrap_err("Search failed")
/// }
/// ```
pub fn init_tracing(environment: &Environment) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("warn,domain_muopdb=info,muopdb_demo=info")
        } else {
            // h2 and hyper are noisy at debug
            EnvFilter::new("debug,h2=info,hyper=info,hyper_util=info,tower=info,rustls=info")
        }
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(environment = ?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized"),
    }
}
