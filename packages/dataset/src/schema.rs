//! Typed binding of catalog metrics to aggregate table columns.
//!
//! Every [`ColumnKey`] the catalog can produce is checked against the
//! aggregate table once, at load time. Fixed metrics must be present;
//! windowed combinations that were never recorded (e.g. no 5-room sales
//! anywhere in a short window) are remembered as missing so projection can
//! report them without touching column names.

use std::collections::BTreeMap;

use hdb_map_catalog::{ColumnKey, MetricCatalog};

use crate::{AGGREGATE_TABLE, AggregateTable, DatasetError};

/// A metric combination whose columns exist in the aggregate table.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    /// Value column name.
    pub value_column: String,
    /// Hover-label column name.
    pub label_column: String,
    /// Parsed values, one per block, in block order.
    pub values: Vec<Option<f64>>,
}

/// Resolved columns for every catalog key.
#[derive(Debug, Default)]
pub struct ColumnIndex {
    bound: BTreeMap<ColumnKey, BoundColumn>,
    missing: Vec<ColumnKey>,
}

impl ColumnIndex {
    /// Binds every catalog key against the aggregate table.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] if a fixed metric's value or
    /// label column is absent, or if only one of a windowed combination's
    /// two columns exists. Returns [`DatasetError::InvalidValue`] if a value
    /// column holds non-numeric cells.
    pub fn bind(catalog: &MetricCatalog, table: &AggregateTable) -> Result<Self, DatasetError> {
        let mut index = Self::default();

        for key in catalog.all_keys() {
            let pair = catalog.columns_of(key);
            let has_value = table.has_column(&pair.value);
            let has_label = table.has_column(&pair.label);

            let windowed = key.rooms.is_some();

            match (has_value, has_label) {
                (true, true) => {
                    let values = table.numeric_column(&pair.value)?;
                    index.bound.insert(
                        key,
                        BoundColumn {
                            value_column: pair.value,
                            label_column: pair.label,
                            values,
                        },
                    );
                }
                (false, false) if windowed => {
                    log::warn!(
                        "Aggregate table has no columns for '{}'; this combination will render empty",
                        pair.value
                    );
                    index.missing.push(key);
                }
                (false, _) => {
                    return Err(DatasetError::MissingColumn {
                        table: AGGREGATE_TABLE,
                        column: pair.value,
                    });
                }
                (true, false) => {
                    return Err(DatasetError::MissingColumn {
                        table: AGGREGATE_TABLE,
                        column: pair.label,
                    });
                }
            }
        }

        Ok(index)
    }

    /// Returns the bound columns for `key`, or `None` if the combination
    /// was never recorded.
    #[must_use]
    pub fn get(&self, key: &ColumnKey) -> Option<&BoundColumn> {
        self.bound.get(key)
    }

    /// Returns the number of bound combinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Returns whether nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// Returns the combinations absent from the aggregate table.
    #[must_use]
    pub fn missing(&self) -> &[ColumnKey] {
        &self.missing
    }
}
