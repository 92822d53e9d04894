//! Per-block aggregate table.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use hdb_map_housing_models::Block;

use crate::csv_table::{RawTable, parse_optional_f64};
use crate::{AGGREGATE_TABLE, DatasetError};

/// Column holding the block address.
pub const COL_ADDRESS: &str = "address";

/// Column holding the block latitude.
pub const COL_LATITUDE: &str = "latitude";

/// Column holding the block longitude.
pub const COL_LONGITUDE: &str = "longitude";

/// One row per block: identity, coordinates and every other column kept as
/// raw text for the metric column index to interpret.
#[derive(Debug)]
pub struct AggregateTable {
    blocks: Vec<Block>,
    by_address: HashMap<String, usize>,
    columns: BTreeMap<String, Vec<String>>,
}

impl AggregateTable {
    /// Parses the aggregate CSV.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the CSV is malformed, lacks the address
    /// or coordinate columns, has an unparseable coordinate, or repeats an
    /// address.
    pub fn from_reader(reader: impl Read) -> Result<Self, DatasetError> {
        let raw = RawTable::read(AGGREGATE_TABLE, reader)?;

        let address_col = raw.require(COL_ADDRESS)?;
        let lat_col = raw.require(COL_LATITUDE)?;
        let lon_col = raw.require(COL_LONGITUDE)?;

        let mut blocks = Vec::with_capacity(raw.records.len());
        let mut by_address = HashMap::with_capacity(raw.records.len());

        for index in 0..raw.records.len() {
            let address = raw.cell(index, address_col);
            if address.is_empty() {
                return Err(raw.invalid(index, address_col, address));
            }

            let block = Block {
                address: address.to_owned(),
                latitude: raw.parse_f64(index, lat_col)?,
                longitude: raw.parse_f64(index, lon_col)?,
            };

            if by_address.insert(block.address.clone(), index).is_some() {
                return Err(DatasetError::DuplicateBlock {
                    address: block.address,
                });
            }
            blocks.push(block);
        }

        let mut columns = BTreeMap::new();
        for (position, header) in raw.headers.iter().enumerate() {
            if position == address_col || position == lat_col || position == lon_col {
                continue;
            }
            let cells = (0..raw.records.len())
                .map(|index| raw.cell(index, position).to_owned())
                .collect();
            columns.insert(header.clone(), cells);
        }

        Ok(Self {
            blocks,
            by_address,
            columns,
        })
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns whether the table has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns all blocks in file order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Looks up a block by address.
    #[must_use]
    pub fn block(&self, address: &str) -> Option<&Block> {
        self.by_address.get(address).map(|&i| &self.blocks[i])
    }

    /// Returns whether a block with this address exists.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.by_address.contains_key(address)
    }

    /// Returns whether a metric column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Returns the raw text cells of a metric column, one per block.
    #[must_use]
    pub fn text_column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Parses a metric column as numbers, one per block.
    ///
    /// Empty and `NaN` cells are missing values.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] if the column does not exist
    /// and [`DatasetError::InvalidValue`] for a non-numeric cell.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, DatasetError> {
        let cells = self
            .columns
            .get(name)
            .ok_or_else(|| DatasetError::MissingColumn {
                table: AGGREGATE_TABLE,
                column: name.to_owned(),
            })?;

        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                parse_optional_f64(cell).map_err(|()| DatasetError::InvalidValue {
                    table: AGGREGATE_TABLE,
                    row: index + 1,
                    column: name.to_owned(),
                    value: cell.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::AGGREGATE;

    fn table() -> AggregateTable {
        AggregateTable::from_reader(AGGREGATE.as_bytes()).unwrap()
    }

    #[test]
    fn reads_blocks_in_file_order() {
        let table = table();
        let addresses: Vec<&str> = table.blocks().iter().map(|b| b.address.as_str()).collect();
        assert_eq!(addresses, vec!["1 TEST ST", "2 TEST ST"]);
    }

    #[test]
    fn looks_up_block_by_address() {
        let table = table();
        let block = table.block("1 TEST ST").unwrap();
        assert!((block.latitude - 1.30).abs() < f64::EPSILON);
        assert!((block.longitude - 103.80).abs() < f64::EPSILON);
        assert!(table.block("9 NOWHERE RD").is_none());
    }

    #[test]
    fn numeric_column_keeps_missing_values() {
        let values = table().numeric_column("Price 4-Room 6m").unwrap();
        assert_eq!(values, vec![Some(450_000.0), None]);
    }

    #[test]
    fn numeric_column_rejects_text() {
        let err = table().numeric_column("Age Label").unwrap_err();
        assert!(matches!(err, DatasetError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn numeric_column_rejects_infinite_values() {
        let csv = "address,latitude,longitude,Age\nA,1.3,103.8,10\nB,1.4,103.9,-inf\n";
        let table = AggregateTable::from_reader(csv.as_bytes()).unwrap();
        let err = table.numeric_column("Age").unwrap_err();
        assert!(
            matches!(err, DatasetError::InvalidValue { row: 2, ref value, .. } if value == "-inf")
        );
    }

    #[test]
    fn coordinates_are_not_metric_columns() {
        assert!(!table().has_column(COL_LATITUDE));
        assert!(table().has_column("Age"));
    }

    #[test]
    fn rejects_duplicate_address() {
        let csv = "address,latitude,longitude\nA,1.3,103.8\nA,1.4,103.9\n";
        assert!(matches!(
            AggregateTable::from_reader(csv.as_bytes()),
            Err(DatasetError::DuplicateBlock { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_coordinate() {
        let csv = "address,latitude,longitude\nA,north,103.8\n";
        assert!(matches!(
            AggregateTable::from_reader(csv.as_bytes()),
            Err(DatasetError::InvalidValue { row: 1, .. })
        ));
    }

    #[test]
    fn rejects_missing_coordinate_column() {
        let csv = "address,latitude\nA,1.3\n";
        assert!(matches!(
            AggregateTable::from_reader(csv.as_bytes()),
            Err(DatasetError::MissingColumn { .. })
        ));
    }
}
