//! The loaded, immutable application context.
//!
//! Built exactly once at startup, before any interaction is accepted, and
//! then shared read-only by every resolver call. Nothing in it is mutated
//! after construction, so concurrent readers need no locking.

use hdb_map_catalog::{CatalogError, MetricCatalog};
use hdb_map_dataset::{AccessToken, DataPaths, Dataset, DatasetError, LoadOptions};
use hdb_map_view_models::{FilterState, MapStyle};

/// Errors that prevent the application from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The embedded metric registry is invalid.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A dataset failed to load or validate.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Metric catalog, datasets and optional map credential.
#[derive(Debug)]
pub struct AppContext {
    catalog: MetricCatalog,
    dataset: Dataset,
    access_token: Option<AccessToken>,
}

impl AppContext {
    /// Assembles a context from already-loaded parts.
    #[must_use]
    pub const fn new(
        catalog: MetricCatalog,
        dataset: Dataset,
        access_token: Option<AccessToken>,
    ) -> Self {
        Self {
            catalog,
            dataset,
            access_token,
        }
    }

    /// Loads the embedded catalog, both tables and the optional token.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] if the catalog is invalid or either table
    /// fails to load. A missing token is not an error.
    pub fn load(paths: &DataPaths, options: &LoadOptions) -> Result<Self, StartupError> {
        let catalog = hdb_map_catalog::registry::embedded()?;
        let dataset = Dataset::load(paths, &catalog, options)?;
        let access_token = hdb_map_dataset::load_access_token(&paths.token);
        Ok(Self::new(catalog, dataset, access_token))
    }

    /// Returns the metric catalog.
    #[must_use]
    pub const fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Returns the loaded datasets.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Returns the Mapbox token, if one was loaded.
    #[must_use]
    pub const fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// Returns whether `style` can be selected.
    #[must_use]
    pub const fn style_available(&self, style: MapStyle) -> bool {
        !style.requires_token() || self.access_token.is_some()
    }

    /// Returns the initial selector values.
    #[must_use]
    pub fn default_filters(&self) -> FilterState {
        FilterState {
            metric: self.catalog.default_metric().name.clone(),
            map_style: MapStyle::default(),
            rooms: hdb_map_housing_models::RoomCount::default(),
            window: hdb_map_housing_models::TimeWindow::default(),
        }
    }
}
