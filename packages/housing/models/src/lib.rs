#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Housing block and resale transaction types.
//!
//! A [`Block`] is one physical HDB block, the unit of aggregation for map
//! points. A [`Transaction`] is one historical resale, joined to its block
//! by address. The fixed filter enumerations ([`RoomCount`],
//! [`TimeWindow`]) live here because both tables are keyed on them.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of rooms in a flat, as offered by the room-count selector.
///
/// The wire form is the bare digit (`"3"`, `"4"`, `"5"`), matching the
/// values the frontend dropdown submits.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RoomCount {
    /// 3-room flats
    #[serde(rename = "3")]
    #[strum(serialize = "3")]
    Three,
    /// 4-room flats
    #[default]
    #[serde(rename = "4")]
    #[strum(serialize = "4")]
    Four,
    /// 5-room flats
    #[serde(rename = "5")]
    #[strum(serialize = "5")]
    Five,
}

impl RoomCount {
    /// Returns the number of rooms.
    #[must_use]
    pub const fn rooms(self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// Returns the `flat_type` text used by the transaction table
    /// (e.g. `"4 ROOM"`).
    #[must_use]
    pub fn flat_type(self) -> String {
        format!("{} ROOM", self.rooms())
    }

    /// Returns the human-readable selector label (e.g. `"4-Room"`).
    #[must_use]
    pub fn label(self) -> String {
        format!("{}-Room", self.rooms())
    }

    /// Returns all variants of this enum, in selector order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Three, Self::Four, Self::Five]
    }
}

/// Recency filter applied to resale transactions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TimeWindow {
    /// Transactions in the last 6 months
    #[default]
    #[serde(rename = "6")]
    #[strum(serialize = "6")]
    SixMonths,
    /// Transactions in the last 12 months
    #[serde(rename = "12")]
    #[strum(serialize = "12")]
    TwelveMonths,
}

impl TimeWindow {
    /// Returns the window length in months.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
        }
    }

    /// Returns the human-readable selector label (e.g. `"Last 6 Months"`).
    #[must_use]
    pub fn label(self) -> String {
        format!("Last {} Months", self.months())
    }

    /// Returns the name of the precomputed membership column in the
    /// transaction table.
    #[must_use]
    pub fn membership_column(self) -> String {
        format!("Transaction Within {}-month Window", self.months())
    }

    /// Returns all variants of this enum, in selector order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::SixMonths, Self::TwelveMonths]
    }
}

/// A physical housing block as read from the aggregate table.
///
/// Metric values are not stored here: they stay in the aggregate table's
/// columns and are read through a resolved column index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Block identity (street address, e.g. `"123 ANG MO KIO AVE 3"`).
    pub address: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// Membership of a transaction in each supported [`TimeWindow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMembership {
    /// Falls inside the 6-month window.
    pub six_months: bool,
    /// Falls inside the 12-month window.
    pub twelve_months: bool,
}

impl WindowMembership {
    /// Returns whether the transaction falls inside `window`.
    #[must_use]
    pub const fn contains(self, window: TimeWindow) -> bool {
        match window {
            TimeWindow::SixMonths => self.six_months,
            TimeWindow::TwelveMonths => self.twelve_months,
        }
    }

    /// Sets the membership flag for `window`.
    pub const fn set(&mut self, window: TimeWindow, within: bool) {
        match window {
            TimeWindow::SixMonths => self.six_months = within,
            TimeWindow::TwelveMonths => self.twelve_months = within,
        }
    }
}

/// A single historical resale transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction date exactly as recorded in the source table.
    pub transaction_date: String,
    /// Block address; joins to [`Block::address`].
    pub address: String,
    /// Flat type category (e.g. `"4 ROOM"`).
    pub flat_type: String,
    /// Storey range (e.g. `"07 TO 09"`).
    pub storey_range: String,
    /// Floor area in square meters.
    pub floor_area_sqm: f64,
    /// Resale price in SGD.
    pub resale_price: f64,
    /// Time-window membership as of the dataset's reference date.
    pub windows: WindowMembership,
}

impl Transaction {
    /// Returns whether this transaction is for a flat with `rooms` rooms.
    #[must_use]
    pub fn is_room_count(&self, rooms: RoomCount) -> bool {
        self.flat_type == rooms.flat_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_count_parses_bare_digit() {
        assert_eq!("4".parse::<RoomCount>().unwrap(), RoomCount::Four);
        assert!("4 ROOM".parse::<RoomCount>().is_err());
    }

    #[test]
    fn room_count_flat_type_matches_transaction_table() {
        assert_eq!(RoomCount::Three.flat_type(), "3 ROOM");
        assert_eq!(RoomCount::Five.label(), "5-Room");
    }

    #[test]
    fn time_window_round_trips_through_display() {
        for window in TimeWindow::all() {
            let parsed: TimeWindow = window.to_string().parse().unwrap();
            assert_eq!(parsed, *window);
        }
    }

    #[test]
    fn time_window_membership_column_name() {
        assert_eq!(
            TimeWindow::TwelveMonths.membership_column(),
            "Transaction Within 12-month Window"
        );
    }

    #[test]
    fn window_membership_set_and_contains() {
        let mut membership = WindowMembership::default();
        membership.set(TimeWindow::TwelveMonths, true);
        assert!(membership.contains(TimeWindow::TwelveMonths));
        assert!(!membership.contains(TimeWindow::SixMonths));
    }

    #[test]
    fn defaults_match_initial_selector_values() {
        assert_eq!(RoomCount::default(), RoomCount::Four);
        assert_eq!(TimeWindow::default(), TimeWindow::SixMonths);
    }
}
