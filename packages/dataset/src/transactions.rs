//! Per-sale transaction table.
//!
//! Window membership is normally precomputed into one boolean column per
//! [`TimeWindow`]. When a column is absent and a reference date is
//! configured, membership is derived from the transaction date instead: a
//! sale is inside an N-month window when
//! `reference - N months < date <= reference`.

use std::collections::HashMap;
use std::io::Read;

use chrono::{Months, NaiveDate};
use hdb_map_housing_models::{TimeWindow, Transaction, WindowMembership};

use crate::csv_table::{RawTable, parse_flag};
use crate::{AggregateTable, DatasetError, LoadOptions, TRANSACTION_TABLE};

/// Column holding the transaction date.
pub const COL_TRANSACTION_DATE: &str = "Transaction Date";

/// Column holding the block address.
pub const COL_ADDRESS: &str = "address";

/// Column holding the flat type (e.g. `"4 ROOM"`).
pub const COL_FLAT_TYPE: &str = "flat_type";

/// Column holding the storey range.
pub const COL_STOREY: &str = "storey_range";

/// Column holding the floor area in square meters.
pub const COL_AREA: &str = "floor_area_sqm";

/// Column holding the resale price.
pub const COL_PRICE: &str = "resale_price";

/// Where a window's membership comes from.
enum MembershipSource {
    Column(usize),
    Derived { start: NaiveDate, end: NaiveDate },
}

/// All transactions, in file order, indexed by block address.
#[derive(Debug)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
    by_address: HashMap<String, Vec<usize>>,
}

impl TransactionTable {
    /// Parses the transaction CSV and checks every row against the known
    /// blocks.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the CSV is malformed, a required column
    /// is absent, a numeric or flag cell fails to parse, a row references
    /// an unknown block, or a window has neither a membership column nor a
    /// reference date to derive it from.
    pub fn from_reader(
        reader: impl Read,
        blocks: &AggregateTable,
        options: &LoadOptions,
    ) -> Result<Self, DatasetError> {
        let raw = RawTable::read(TRANSACTION_TABLE, reader)?;

        let date_col = raw.require(COL_TRANSACTION_DATE)?;
        let address_col = raw.require(COL_ADDRESS)?;
        let flat_type_col = raw.require(COL_FLAT_TYPE)?;
        let storey_col = raw.require(COL_STOREY)?;
        let area_col = raw.require(COL_AREA)?;
        let price_col = raw.require(COL_PRICE)?;

        let sources = TimeWindow::all()
            .iter()
            .map(|&window| membership_source(&raw, window, options).map(|s| (window, s)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(raw.records.len());
        let mut by_address: HashMap<String, Vec<usize>> = HashMap::new();

        for index in 0..raw.records.len() {
            let address = raw.cell(index, address_col);
            if !blocks.contains(address) {
                return Err(DatasetError::UnknownBlock {
                    row: index + 1,
                    address: address.to_owned(),
                });
            }

            let transaction_date = raw.cell(index, date_col);

            let mut windows = WindowMembership::default();
            for (window, source) in &sources {
                let within = match source {
                    MembershipSource::Column(col) => {
                        let cell = raw.cell(index, *col);
                        parse_flag(cell).ok_or_else(|| raw.invalid(index, *col, cell))?
                    }
                    MembershipSource::Derived { start, end } => {
                        let date = parse_transaction_date(transaction_date)
                            .ok_or_else(|| raw.invalid(index, date_col, transaction_date))?;
                        *start < date && date <= *end
                    }
                };
                windows.set(*window, within);
            }

            by_address
                .entry(address.to_owned())
                .or_default()
                .push(rows.len());

            rows.push(Transaction {
                transaction_date: transaction_date.to_owned(),
                address: address.to_owned(),
                flat_type: raw.cell(index, flat_type_col).to_owned(),
                storey_range: raw.cell(index, storey_col).to_owned(),
                floor_area_sqm: raw.parse_f64(index, area_col)?,
                resale_price: raw.parse_f64(index, price_col)?,
                windows,
            });
        }

        Ok(Self { rows, by_address })
    }

    /// Returns the number of transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no transactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns all transactions in file order.
    #[must_use]
    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    /// Returns the transactions for one block, in file order.
    pub fn for_address<'a>(
        &'a self,
        address: &str,
    ) -> impl Iterator<Item = &'a Transaction> + use<'a> {
        self.by_address
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.rows[i])
    }
}

fn membership_source(
    raw: &RawTable,
    window: TimeWindow,
    options: &LoadOptions,
) -> Result<MembershipSource, DatasetError> {
    let column = window.membership_column();
    if let Some(position) = raw.position(&column) {
        return Ok(MembershipSource::Column(position));
    }

    let Some(end) = options.reference_date else {
        return Err(DatasetError::MissingWindow { window, column });
    };
    let start = end
        .checked_sub_months(Months::new(window.months()))
        .unwrap_or(NaiveDate::MIN);

    log::info!("Deriving '{column}' from transaction dates ({start} exclusive to {end} inclusive)");

    Ok(MembershipSource::Derived { start, end })
}

/// Parses a transaction date as a full date (`2024-03-15`) or a month
/// (`2024-03`, taken as the first of the month).
#[must_use]
pub fn parse_transaction_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .ok()
}
