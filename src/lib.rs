pub mod config;
pub mod datasource;
pub mod error;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod query;
pub mod slug;
pub mod template;
pub mod transport;

pub use crate::config::DatasourceConfig;
pub use crate::datasource::ElasticDatasource;
pub use crate::error::{DatasourceError, TransportError};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Note: This function can only be called once per process.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
