#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading and validation of the HDB block datasets.
//!
//! Two CSV tables are read once at startup and held immutable for the
//! process lifetime:
//!
//! - **Aggregate table**: one row per block with coordinates, address and
//!   pre-aggregated metric values and hover labels.
//! - **Transaction table**: one row per resale, joined to blocks by
//!   address.
//!
//! Loading fails if either table is missing, malformed, or lacks a column
//! required by the [`MetricCatalog`]. The resolved metric columns are
//! captured in a [`ColumnIndex`] so projection never formats column names
//! at request time.
//!
//! # Usage
//!
//! ```rust,no_run
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use hdb_map_dataset::{DataPaths, Dataset, LoadOptions};
//!
//! let catalog = hdb_map_catalog::registry::embedded()?;
//! let dataset = Dataset::load(&DataPaths::default(), &catalog, &LoadOptions::default())?;
//! println!("{} blocks", dataset.aggregate().len());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod credential;
pub mod paths;
pub mod schema;
pub mod transactions;

mod csv_table;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hdb_map_catalog::MetricCatalog;
use hdb_map_housing_models::TimeWindow;

pub use aggregate::AggregateTable;
pub use credential::{AccessToken, load_access_token};
pub use schema::{BoundColumn, ColumnIndex};
pub use transactions::TransactionTable;

/// Table name used in errors for the aggregate table.
pub const AGGREGATE_TABLE: &str = "aggregate";

/// Table name used in errors for the transaction table.
pub const TRANSACTION_TABLE: &str = "transaction";

/// Errors that prevent the datasets from loading. All are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// A source file could not be opened.
    #[error("Failed to open {table} table at {}: {source}", .path.display())]
    Io {
        /// Which table was being opened.
        table: &'static str,
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV could not be parsed.
    #[error("Malformed {table} table: {source}")]
    Csv {
        /// Which table was being parsed.
        table: &'static str,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row.
    #[error("The {table} table is missing required column '{column}'")]
    MissingColumn {
        /// Which table lacks the column.
        table: &'static str,
        /// Column name.
        column: String,
    },

    /// A cell could not be parsed as its column's type.
    #[error("Invalid value '{value}' in {table} table, row {row}, column '{column}'")]
    InvalidValue {
        /// Which table holds the cell.
        table: &'static str,
        /// 1-based data row number (excluding the header).
        row: usize,
        /// Column name.
        column: String,
        /// Offending cell content.
        value: String,
    },

    /// Two aggregate rows share an address.
    #[error("Duplicate block address in aggregate table: {address}")]
    DuplicateBlock {
        /// The repeated address.
        address: String,
    },

    /// A transaction references an address with no aggregate row.
    #[error("Transaction row {row} references unknown block: {address}")]
    UnknownBlock {
        /// 1-based data row number.
        row: usize,
        /// The unknown address.
        address: String,
    },

    /// A window's membership column is absent and no reference date was
    /// configured to derive it.
    #[error(
        "The transaction table has no '{column}' column and no reference date was given to derive it"
    )]
    MissingWindow {
        /// Window without membership data.
        window: TimeWindow,
        /// Expected column name.
        column: String,
    },
}

/// Filesystem locations of the startup inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Aggregate (per-block) CSV.
    pub aggregate: PathBuf,
    /// Transaction (per-sale) CSV.
    pub transactions: PathBuf,
    /// Optional Mapbox access token file.
    pub token: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            aggregate: paths::default_aggregate_path(),
            transactions: paths::default_transactions_path(),
            token: paths::default_token_path(),
        }
    }
}

/// Options controlling how the tables are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Date the time windows are measured back from. Only consulted for
    /// windows whose membership column is absent.
    pub reference_date: Option<NaiveDate>,
}

/// The two loaded tables plus the resolved metric column index.
///
/// Immutable after construction, so it can be shared across request
/// handlers without synchronization.
#[derive(Debug)]
pub struct Dataset {
    aggregate: AggregateTable,
    transactions: TransactionTable,
    columns: ColumnIndex,
}

impl Dataset {
    /// Loads both tables from disk and validates them against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if either file cannot be opened or fails
    /// validation.
    pub fn load(
        paths: &DataPaths,
        catalog: &MetricCatalog,
        options: &LoadOptions,
    ) -> Result<Self, DatasetError> {
        log::info!("Loading aggregate table from {}", paths.aggregate.display());
        let aggregate = open(AGGREGATE_TABLE, &paths.aggregate)?;

        log::info!(
            "Loading transaction table from {}",
            paths.transactions.display()
        );
        let transactions = open(TRANSACTION_TABLE, &paths.transactions)?;

        Self::from_readers(aggregate, transactions, catalog, options)
    }

    /// Loads both tables from arbitrary readers.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if either table fails to parse or validate.
    pub fn from_readers(
        aggregate: impl Read,
        transactions: impl Read,
        catalog: &MetricCatalog,
        options: &LoadOptions,
    ) -> Result<Self, DatasetError> {
        let aggregate = AggregateTable::from_reader(aggregate)?;
        let columns = ColumnIndex::bind(catalog, &aggregate)?;
        let transactions = TransactionTable::from_reader(transactions, &aggregate, options)?;

        log::info!(
            "Loaded {} blocks, {} transactions, {} metric columns ({} combinations absent)",
            aggregate.len(),
            transactions.len(),
            columns.len(),
            columns.missing().len()
        );

        Ok(Self {
            aggregate,
            transactions,
            columns,
        })
    }

    /// Returns the aggregate (per-block) table.
    #[must_use]
    pub const fn aggregate(&self) -> &AggregateTable {
        &self.aggregate
    }

    /// Returns the transaction table.
    #[must_use]
    pub const fn transactions(&self) -> &TransactionTable {
        &self.transactions
    }

    /// Returns the resolved metric column index.
    #[must_use]
    pub const fn columns(&self) -> &ColumnIndex {
        &self.columns
    }
}

fn open(table: &'static str, path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::Io {
        table,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use hdb_map_catalog::MetricCatalog;

    pub const CATALOG: &str = r#"
        [[metric]]
        name = "Age"
        domain = { min = 0.0, max = 40.0 }
        columns = { kind = "fixed", value = "Age", label = "Age Label" }

        [[metric]]
        name = "Resale Prices"
        domain = { min = 0.0, max = 700000.0 }
        columns = { kind = "windowed", value = "Price {rooms}-Room {months}m", label = "Label {rooms}-Room {months}m" }
    "#;

    pub const AGGREGATE: &str = "\
address,latitude,longitude,Age,Age Label,Price 4-Room 6m,Label 4-Room 6m,Price 4-Room 12m,Label 4-Room 12m
1 TEST ST,1.30,103.80,10,1 TEST ST<br>Age: 10,450000,1 TEST ST<br>$450000,460000,1 TEST ST<br>$460000
2 TEST ST,1.31,103.81,,2 TEST ST<br>Age: n/a,,2 TEST ST<br>n/a,500000,2 TEST ST<br>$500000
";

    pub const TRANSACTIONS: &str = "\
Transaction Date,address,flat_type,storey_range,floor_area_sqm,resale_price,Transaction Within 6-month Window,Transaction Within 12-month Window
2024-03,1 TEST ST,4 ROOM,07 TO 09,92.0,450000,True,True
2023-08,1 TEST ST,4 ROOM,01 TO 03,92.0,430000,False,True
2024-01,2 TEST ST,4 ROOM,10 TO 12,93.0,500000,False,True
2024-02,1 TEST ST,3 ROOM,04 TO 06,67.0,350000,True,True
";

    pub fn catalog() -> MetricCatalog {
        MetricCatalog::from_toml(CATALOG).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::{AGGREGATE, TRANSACTIONS, catalog};

    #[test]
    fn loads_fixture_tables() {
        let dataset = Dataset::from_readers(
            AGGREGATE.as_bytes(),
            TRANSACTIONS.as_bytes(),
            &catalog(),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(dataset.aggregate().len(), 2);
        assert_eq!(dataset.transactions().len(), 4);
    }

    #[test]
    fn rejects_missing_fixed_metric_column() {
        let aggregate = "address,latitude,longitude\n1 TEST ST,1.30,103.80\n";
        let err = Dataset::from_readers(
            aggregate.as_bytes(),
            TRANSACTIONS.as_bytes(),
            &catalog(),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(
            matches!(err, DatasetError::MissingColumn { ref column, .. } if column == "Age"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let paths = DataPaths {
            aggregate: PathBuf::from("/nonexistent/blocks.csv"),
            transactions: PathBuf::from("/nonexistent/transactions.csv"),
            token: PathBuf::from("/nonexistent/token.txt"),
        };
        let err = Dataset::load(&paths, &catalog(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Io {
                table: AGGREGATE_TABLE,
                ..
            }
        ));
    }
}
