#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the HDB block map server.
//!
//! Query parameters arrive as raw strings so that an unparseable selector
//! value can be reported as a 400 with a useful message instead of a
//! generic deserialization failure. Omitted parameters fall back to the
//! current defaults.

use std::str::FromStr;

use hdb_map_housing_models::{RoomCount, TimeWindow};
use hdb_map_view_models::{FilterState, MapStyle};
use serde::{Deserialize, Serialize};

/// A selector value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value '{value}' for parameter '{param}'")]
pub struct InvalidParam {
    /// Query parameter name.
    pub param: &'static str,
    /// Value as received.
    pub value: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned with 4xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable description.
    pub error: String,
}

impl ApiError {
    /// Builds an error body from anything displayable.
    #[must_use]
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Query parameters for the scene endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneQueryParams {
    /// Metric display name.
    pub metric: Option<String>,
    /// Map style code (`OSM` or `MB`).
    pub style: Option<String>,
    /// Room count (`3`, `4` or `5`).
    pub rooms: Option<String>,
    /// Time window in months (`6` or `12`).
    pub window: Option<String>,
}

impl SceneQueryParams {
    /// Overlays these parameters onto `defaults`.
    ///
    /// The metric name is taken verbatim; it is validated when the scene is
    /// rendered.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParam`] if `style`, `rooms` or `window` is not a
    /// known value.
    pub fn into_filters(self, defaults: FilterState) -> Result<FilterState, InvalidParam> {
        Ok(FilterState {
            metric: self.metric.unwrap_or(defaults.metric),
            map_style: parse_or::<MapStyle>("style", self.style, defaults.map_style)?,
            rooms: parse_or::<RoomCount>("rooms", self.rooms, defaults.rooms)?,
            window: parse_or::<TimeWindow>("window", self.window, defaults.window)?,
        })
    }
}

/// Query parameters for the transactions endpoint.
///
/// `address` takes precedence over `label` when both are given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQueryParams {
    /// Address of the clicked block.
    pub address: Option<String>,
    /// Hover label of the clicked point, for widgets that only echo text.
    pub label: Option<String>,
    /// Room count (`3`, `4` or `5`).
    pub rooms: Option<String>,
    /// Time window in months (`6` or `12`).
    pub window: Option<String>,
}

impl TransactionQueryParams {
    /// Resolves the room count and time window, falling back to the given
    /// defaults when omitted.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParam`] if either value is not known.
    pub fn selectors(
        &self,
        rooms: RoomCount,
        window: TimeWindow,
    ) -> Result<(RoomCount, TimeWindow), InvalidParam> {
        Ok((
            parse_or("rooms", self.rooms.clone(), rooms)?,
            parse_or("window", self.window.clone(), window)?,
        ))
    }
}

fn parse_or<T: FromStr>(
    param: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, InvalidParam> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| InvalidParam { param, value }),
    }
}
