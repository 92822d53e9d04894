#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Declarative output types of the HDB block map core.
//!
//! A [`Scene`] tells the map widget what to draw; a [`SelectionView`] tells
//! the table widget which transactions to list. Both are plain data,
//! serialized to JSON for the frontend, and carry no references back into
//! the loaded datasets.

use hdb_map_catalog::ColorDomain;
use hdb_map_housing_models::{RoomCount, TimeWindow, Transaction};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Tile style for the base map.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum MapStyle {
    /// Public OpenStreetMap tiles
    #[default]
    #[serde(rename = "OSM")]
    #[strum(serialize = "OSM")]
    OpenStreetMap,
    /// Mapbox tiles, requiring an access token
    #[serde(rename = "MB")]
    #[strum(serialize = "MB")]
    Mapbox,
}

impl MapStyle {
    /// Returns the selector label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMaps",
            Self::Mapbox => "Mapbox",
        }
    }

    /// Returns whether this style needs an access token.
    #[must_use]
    pub const fn requires_token(self) -> bool {
        matches!(self, Self::Mapbox)
    }

    /// Returns all variants of this enum, in selector order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Mapbox, Self::OpenStreetMap]
    }
}

/// The user's current selector values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Selected metric display name.
    pub metric: String,
    /// Selected base map style.
    pub map_style: MapStyle,
    /// Selected room count.
    pub rooms: RoomCount,
    /// Selected time window.
    pub window: TimeWindow,
}

/// One plotted block.
///
/// The block's address travels alongside its display label so click
/// handling never has to recover identity from label text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Block identity.
    pub address: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Metric value, `None` when the block has no aggregate for the
    /// current selection. Rendered as a neutral marker.
    pub value: Option<f64>,
    /// Hover label, always prefixed by `"<address><br>"`.
    pub label: String,
}

/// The colored point layer for one metric projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointLayer {
    /// Metric display name, used as the legend entry.
    pub name: String,
    /// Plotted points, one per block in dataset order.
    pub points: Vec<MapPoint>,
    /// Color scale normalization bounds.
    pub color_domain: ColorDomain,
    /// Number of points plotted, including those with missing values.
    pub point_count: usize,
}

impl PointLayer {
    /// Creates a layer with no points, used when a projection cannot be
    /// resolved.
    #[must_use]
    pub const fn empty(name: String, color_domain: ColorDomain) -> Self {
        Self {
            name,
            points: Vec::new(),
            color_domain,
            point_count: 0,
        }
    }

    /// Returns `(latitude, longitude)` pairs in point order.
    #[must_use]
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.latitude, p.longitude))
            .collect()
    }

    /// Returns values in point order.
    #[must_use]
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Returns hover labels in point order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }
}

/// Map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Center latitude.
    pub center_latitude: f64,
    /// Center longitude.
    pub center_longitude: f64,
    /// Zoom level.
    pub zoom: f64,
}

/// The fixed viewport, centered on Singapore.
pub const SINGAPORE_VIEWPORT: Viewport = Viewport {
    center_latitude: 1.35,
    center_longitude: 103.8,
    zoom: 11.0,
};

/// Style-specific map configuration. The two styles need disjoint layout
/// shapes, so they are separate variants rather than optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StyleConfig {
    /// OpenStreetMap raster tiles.
    #[serde(rename_all = "camelCase")]
    OpenStreetMap {
        /// Widget style identifier (`"open-street-map"`).
        style: String,
        /// Additional overlay layers (none by default).
        layers: Vec<String>,
    },
    /// Mapbox vector tiles.
    #[serde(rename_all = "camelCase")]
    Mapbox {
        /// Mapbox style name (`"streets"`).
        style: String,
        /// Access token the widget authenticates with.
        access_token: String,
    },
}

/// Everything the map widget needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Title embedding the metric name and point count.
    pub title: String,
    /// Colored point layer.
    pub layer: PointLayer,
    /// Map center and zoom.
    pub viewport: Viewport,
    /// Base map configuration.
    pub style: StyleConfig,
    /// The selector values this scene was built from.
    pub filters: FilterState,
}

/// One transaction as listed under the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    /// Transaction date as recorded.
    pub transaction_date: String,
    /// Block address.
    pub address: String,
    /// Flat type (e.g. `"4 ROOM"`).
    pub flat_type: String,
    /// Storey range.
    pub storey_range: String,
    /// Floor area in square meters.
    pub floor_area_sqm: f64,
    /// Resale price.
    pub resale_price: f64,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            transaction_date: t.transaction_date.clone(),
            address: t.address.clone(),
            flat_type: t.flat_type.clone(),
            storey_range: t.storey_range.clone(),
            floor_area_sqm: t.floor_area_sqm,
            resale_price: t.resale_price,
        }
    }
}

/// Output of a point click: a transaction table, or a message when the
/// click could not be resolved to a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectionView {
    /// Transactions for the clicked block. `rows` may be empty.
    #[serde(rename_all = "camelCase")]
    Table {
        /// Heading shown above the table.
        title: String,
        /// Resolved block identity.
        address: String,
        /// Matching transactions in dataset order.
        rows: Vec<TransactionRow>,
    },
    /// The click did not identify a known block.
    Fallback {
        /// Message shown in place of the table.
        message: String,
    },
}

/// One entry in a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOption {
    /// Value submitted when selected.
    pub value: String,
    /// Text shown to the user.
    pub label: String,
    /// Whether the option is shown but cannot be chosen.
    pub disabled: bool,
}

impl ControlOption {
    /// Creates an enabled option.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }
}

/// Options for every selector plus their initial values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSet {
    /// Metric selector options, in registration order.
    pub metrics: Vec<ControlOption>,
    /// Map style options.
    pub map_styles: Vec<ControlOption>,
    /// Room count options.
    pub room_counts: Vec<ControlOption>,
    /// Time window options.
    pub time_windows: Vec<ControlOption>,
    /// Initial selector values.
    pub defaults: FilterState,
}
