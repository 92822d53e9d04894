#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Registry of selectable map metrics.
//!
//! Each [`MetricDefinition`] names a quantity that can color the map's
//! points, the domain used to normalize its color scale, and where its
//! values and hover labels live in the aggregate table. Window-dependent
//! metrics resolve their columns from a [`RoomCount`] and [`TimeWindow`];
//! [`ColumnKey`] is the typed form of that resolution so the aggregate
//! table can be checked once at load time instead of formatting column
//! names on every request.

pub mod registry;

use std::collections::BTreeSet;

use hdb_map_housing_models::{RoomCount, TimeWindow};
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the room count in windowed column templates.
const ROOMS_PLACEHOLDER: &str = "{rooms}";

/// Placeholder replaced by the window length in windowed column templates.
const MONTHS_PLACEHOLDER: &str = "{months}";

/// Errors raised while building or querying a [`MetricCatalog`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The registry TOML could not be parsed.
    #[error("Failed to parse metric registry: {0}")]
    Parse(#[from] toml::de::Error),

    /// The registry defines no metrics.
    #[error("Metric registry is empty")]
    Empty,

    /// Two metrics share a display name.
    #[error("Duplicate metric name: {name}")]
    DuplicateMetric {
        /// The repeated name.
        name: String,
    },

    /// A metric's color domain is empty or inverted.
    #[error("Metric '{name}' has an invalid color domain [{min}, {max}]")]
    InvalidDomain {
        /// Metric display name.
        name: String,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A windowed template does not reference both placeholders.
    #[error("Metric '{name}' has a windowed template without {{rooms}} and {{months}}: {template}")]
    InvalidTemplate {
        /// Metric display name.
        name: String,
        /// The offending template.
        template: String,
    },

    /// No metric with this name is registered.
    #[error("Unknown metric: {name}")]
    UnknownMetric {
        /// The requested name.
        name: String,
    },

    /// A window-dependent metric was resolved without both parameters.
    #[error("Metric '{name}' requires both a room count and a time window")]
    MissingParameters {
        /// Metric display name.
        name: String,
    },
}

/// Lower and upper bounds used to normalize a metric's color scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorDomain {
    /// Value mapped to the bottom of the color scale.
    pub min: f64,
    /// Value mapped to the top of the color scale.
    pub max: f64,
}

/// Where a metric's values and hover labels are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTemplate {
    /// Columns independent of the room-count and time-window selectors.
    Fixed {
        /// Value column name.
        value: String,
        /// Hover-label column name.
        label: String,
    },
    /// Column name templates containing `{rooms}` and `{months}`.
    Windowed {
        /// Value column template.
        value: String,
        /// Hover-label column template.
        label: String,
    },
}

impl ColumnTemplate {
    /// Returns whether this template depends on room count and window.
    #[must_use]
    pub const fn is_windowed(&self) -> bool {
        matches!(self, Self::Windowed { .. })
    }
}

/// A single registered metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Display name shown in the metric selector and the scene title.
    pub name: String,
    /// Color scale normalization bounds.
    pub domain: ColorDomain,
    /// Column naming for values and labels.
    pub columns: ColumnTemplate,
}

/// Concrete value and label column names for one resolved metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnPair {
    /// Column holding the numeric value.
    pub value: String,
    /// Column holding the pre-formatted hover label.
    pub label: String,
}

/// Index of a metric within its [`MetricCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricId(usize);

/// Typed identifier of one metric/filter combination.
///
/// Fixed metrics always carry `None` for both parameters, so every
/// parameter combination of a fixed metric maps to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    /// Metric being resolved.
    pub metric: MetricId,
    /// Room count, for windowed metrics.
    pub rooms: Option<RoomCount>,
    /// Time window, for windowed metrics.
    pub window: Option<TimeWindow>,
}

/// Ordered, immutable registry of metrics.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    metrics: Vec<MetricDefinition>,
}

#[derive(Deserialize)]
struct RegistryFile {
    metric: Vec<MetricDefinition>,
}

impl MetricCatalog {
    /// Parses and validates a catalog from registry TOML.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the TOML is malformed or any metric fails
    /// validation.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: RegistryFile = toml::de::from_str(content)?;
        Self::new(file.metric)
    }

    /// Builds a catalog from definitions, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the list is empty, names repeat, a domain
    /// is inverted, or a windowed template lacks a placeholder.
    pub fn new(metrics: Vec<MetricDefinition>) -> Result<Self, CatalogError> {
        if metrics.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = BTreeSet::new();
        for metric in &metrics {
            if !seen.insert(metric.name.as_str()) {
                return Err(CatalogError::DuplicateMetric {
                    name: metric.name.clone(),
                });
            }

            let ColorDomain { min, max } = metric.domain;
            if min.is_nan() || max.is_nan() || min >= max {
                return Err(CatalogError::InvalidDomain {
                    name: metric.name.clone(),
                    min,
                    max,
                });
            }

            if let ColumnTemplate::Windowed { value, label } = &metric.columns {
                for template in [value, label] {
                    if !template.contains(ROOMS_PLACEHOLDER)
                        || !template.contains(MONTHS_PLACEHOLDER)
                    {
                        return Err(CatalogError::InvalidTemplate {
                            name: metric.name.clone(),
                            template: template.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { metrics })
    }

    /// Returns metric display names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }

    /// Returns all definitions in registration order.
    #[must_use]
    pub fn metrics(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    /// Returns the default (first registered) metric.
    #[must_use]
    pub fn default_metric(&self) -> &MetricDefinition {
        // `new` rejects empty registries.
        &self.metrics[0]
    }

    /// Looks up a metric by display name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownMetric`] if no metric has this name.
    pub fn lookup(&self, name: &str) -> Result<(MetricId, &MetricDefinition), CatalogError> {
        self.metrics
            .iter()
            .enumerate()
            .find(|(_, m)| m.name == name)
            .map(|(i, m)| (MetricId(i), m))
            .ok_or_else(|| CatalogError::UnknownMetric {
                name: name.to_string(),
            })
    }

    /// Returns the definition for a previously resolved [`MetricId`].
    #[must_use]
    pub fn get(&self, id: MetricId) -> Option<&MetricDefinition> {
        self.metrics.get(id.0)
    }

    /// Resolves the typed key for a metric and the current selectors.
    ///
    /// Fixed metrics ignore both parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownMetric`] for unregistered names and
    /// [`CatalogError::MissingParameters`] when a windowed metric is
    /// resolved without both a room count and a time window.
    pub fn key_for(
        &self,
        name: &str,
        rooms: Option<RoomCount>,
        window: Option<TimeWindow>,
    ) -> Result<ColumnKey, CatalogError> {
        let (metric, definition) = self.lookup(name)?;

        if !definition.columns.is_windowed() {
            return Ok(ColumnKey {
                metric,
                rooms: None,
                window: None,
            });
        }

        match (rooms, window) {
            (Some(rooms), Some(window)) => Ok(ColumnKey {
                metric,
                rooms: Some(rooms),
                window: Some(window),
            }),
            _ => Err(CatalogError::MissingParameters {
                name: definition.name.clone(),
            }),
        }
    }

    /// Resolves the concrete value and label column names for a metric.
    ///
    /// # Errors
    ///
    /// Same as [`Self::key_for`].
    pub fn column_for(
        &self,
        name: &str,
        rooms: Option<RoomCount>,
        window: Option<TimeWindow>,
    ) -> Result<ColumnPair, CatalogError> {
        let key = self.key_for(name, rooms, window)?;
        Ok(self.columns_of(key))
    }

    /// Returns the column names a resolved key points at.
    ///
    /// # Panics
    ///
    /// Panics if `key` was produced by a different catalog with more
    /// metrics than this one.
    #[must_use]
    pub fn columns_of(&self, key: ColumnKey) -> ColumnPair {
        match &self.metrics[key.metric.0].columns {
            ColumnTemplate::Fixed { value, label } => ColumnPair {
                value: value.clone(),
                label: label.clone(),
            },
            ColumnTemplate::Windowed { value, label } => {
                let rooms = key.rooms.unwrap_or_default();
                let window = key.window.unwrap_or_default();
                ColumnPair {
                    value: render_template(value, rooms, window),
                    label: render_template(label, rooms, window),
                }
            }
        }
    }

    /// Enumerates every key the catalog can resolve, in registration order
    /// and then selector order.
    #[must_use]
    pub fn all_keys(&self) -> Vec<ColumnKey> {
        let mut keys = Vec::new();
        for (i, metric) in self.metrics.iter().enumerate() {
            let id = MetricId(i);
            if metric.columns.is_windowed() {
                for rooms in RoomCount::all() {
                    for window in TimeWindow::all() {
                        keys.push(ColumnKey {
                            metric: id,
                            rooms: Some(*rooms),
                            window: Some(*window),
                        });
                    }
                }
            } else {
                keys.push(ColumnKey {
                    metric: id,
                    rooms: None,
                    window: None,
                });
            }
        }
        keys
    }
}

/// Interpolates room count and window length into a column template.
fn render_template(template: &str, rooms: RoomCount, window: TimeWindow) -> String {
    template
        .replace(ROOMS_PLACEHOLDER, &rooms.rooms().to_string())
        .replace(MONTHS_PLACEHOLDER, &window.months().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_METRICS: &str = r#"
        [[metric]]
        name = "Age"
        domain = { min = 0.0, max = 40.0 }
        columns = { kind = "fixed", value = "Age", label = "Age Label" }

        [[metric]]
        name = "Price"
        domain = { min = 0.0, max = 700000.0 }
        columns = { kind = "windowed", value = "Price {rooms}r {months}m", label = "Label {rooms}r {months}m" }
    "#;

    fn catalog() -> MetricCatalog {
        MetricCatalog::from_toml(TWO_METRICS).unwrap()
    }

    #[test]
    fn preserves_registration_order() {
        assert_eq!(catalog().names(), vec!["Age", "Price"]);
        assert_eq!(catalog().default_metric().name, "Age");
    }

    #[test]
    fn fixed_metric_ignores_parameters() {
        let catalog = catalog();
        let with = catalog
            .column_for("Age", Some(RoomCount::Five), Some(TimeWindow::TwelveMonths))
            .unwrap();
        let without = catalog.column_for("Age", None, None).unwrap();
        assert_eq!(with, without);
        assert_eq!(with.value, "Age");
        assert_eq!(with.label, "Age Label");
    }

    #[test]
    fn windowed_metric_interpolates_parameters() {
        let pair = catalog()
            .column_for("Price", Some(RoomCount::Four), Some(TimeWindow::SixMonths))
            .unwrap();
        assert_eq!(pair.value, "Price 4r 6m");
        assert_eq!(pair.label, "Label 4r 6m");
    }

    #[test]
    fn windowed_metric_without_parameters_is_reported() {
        let err = catalog()
            .column_for("Price", Some(RoomCount::Four), None)
            .unwrap_err();
        assert!(matches!(err, CatalogError::MissingParameters { .. }));
    }

    #[test]
    fn key_metric_id_resolves_to_its_definition() {
        let catalog = catalog();
        let key = catalog
            .key_for("Price", Some(RoomCount::Three), Some(TimeWindow::SixMonths))
            .unwrap();
        let (id, _) = catalog.lookup("Price").unwrap();
        assert_eq!(key.metric, id);
        assert_eq!(catalog.get(key.metric).unwrap().name, "Price");
    }

    #[test]
    fn unknown_metric_is_reported() {
        let err = catalog().column_for("Nope", None, None).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownMetric { .. }));
    }

    #[test]
    fn all_keys_covers_every_combination() {
        // One fixed key plus 3 room counts x 2 windows.
        assert_eq!(catalog().all_keys().len(), 1 + 3 * 2);
    }

    #[test]
    fn rejects_empty_registry() {
        assert!(matches!(
            MetricCatalog::new(Vec::new()),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn rejects_inverted_domain() {
        let toml = r#"
            [[metric]]
            name = "Age"
            domain = { min = 40.0, max = 0.0 }
            columns = { kind = "fixed", value = "Age", label = "Age Label" }
        "#;
        assert!(matches!(
            MetricCatalog::from_toml(toml),
            Err(CatalogError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn rejects_windowed_template_without_placeholders() {
        let toml = r#"
            [[metric]]
            name = "Price"
            domain = { min = 0.0, max = 1.0 }
            columns = { kind = "windowed", value = "Price {rooms}", label = "Label {rooms}r {months}m" }
        "#;
        assert!(matches!(
            MetricCatalog::from_toml(toml),
            Err(CatalogError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let toml = r#"
            [[metric]]
            name = "Age"
            domain = { min = 0.0, max = 40.0 }
            columns = { kind = "fixed", value = "Age", label = "Age Label" }

            [[metric]]
            name = "Age"
            domain = { min = 0.0, max = 40.0 }
            columns = { kind = "fixed", value = "Age2", label = "Age Label2" }
        "#;
        assert!(matches!(
            MetricCatalog::from_toml(toml),
            Err(CatalogError::DuplicateMetric { .. })
        ));
    }
}
