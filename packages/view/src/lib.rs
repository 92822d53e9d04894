#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection-and-projection pipeline for the HDB block map.
//!
//! - [`projection`] maps the selected metric, room count and time window
//!   to a colored point layer.
//! - [`compose`] wraps a point layer into the declarative [`Scene`] the
//!   map widget renders.
//! - [`selection`] resolves a point click back to the clicked block's
//!   transaction history.
//! - [`controls`] lists selector options for the frontend.
//!
//! Every entry point takes the loaded [`AppContext`] explicitly; there is
//! no process-wide state.

pub mod compose;
pub mod context;
pub mod controls;
pub mod projection;
pub mod selection;

use hdb_map_catalog::CatalogError;
use hdb_map_view_models::{FilterState, PointLayer, Scene};

pub use context::{AppContext, StartupError};

use crate::compose::ComposeError;
use crate::projection::ProjectionError;

/// Errors that prevent a scene from being rendered at all.
///
/// Combinations missing from the dataset are not errors here: they render
/// as an empty layer with an explanatory title.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The metric is unknown or lacks parameters.
    #[error(transparent)]
    Metric(#[from] CatalogError),

    /// The requested map style cannot be used.
    #[error(transparent)]
    Style(#[from] ComposeError),
}

/// Projects and composes the scene for `filters`.
///
/// # Errors
///
/// Returns [`SceneError::Metric`] for an unknown metric and
/// [`SceneError::Style`] when an unavailable map style is requested.
pub fn render_scene(ctx: &AppContext, filters: &FilterState) -> Result<Scene, SceneError> {
    match projection::project(ctx, &filters.metric, filters.rooms, filters.window) {
        Ok(layer) => Ok(compose::compose(layer, filters, ctx.access_token())?),
        Err(ProjectionError::MissingColumn { .. }) => {
            let (_, definition) = ctx.catalog().lookup(&filters.metric)?;
            let reason = format!(
                "no data for {} in {}",
                filters.rooms.label(),
                filters.window.label()
            );
            log::warn!("Rendering empty '{}' layer: {reason}", definition.name);
            let layer = PointLayer::empty(definition.name.clone(), definition.domain);
            Ok(compose::compose_degenerate(
                layer,
                filters,
                ctx.access_token(),
                &reason,
            )?)
        }
        Err(ProjectionError::Catalog(e)) => Err(e.into()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{PRICE_METRIC, context, context_with_token};
    use hdb_map_housing_models::{RoomCount, TimeWindow};
    use hdb_map_view_models::{MapStyle, StyleConfig};

    fn filters(metric: &str, map_style: MapStyle, rooms: RoomCount) -> FilterState {
        FilterState {
            metric: metric.to_string(),
            map_style,
            rooms,
            window: TimeWindow::SixMonths,
        }
    }

    #[test]
    fn renders_price_scene() {
        let ctx = context();
        let scene = render_scene(
            &ctx,
            &filters(PRICE_METRIC, MapStyle::OpenStreetMap, RoomCount::Four),
        )
        .unwrap();
        assert_eq!(scene.title, "Resale Prices, 3 points plotted");
        assert_eq!(scene.layer.points[0].value, Some(450_000.0));
    }

    #[test]
    fn missing_combination_renders_empty_layer_with_reason() {
        let ctx = context();
        let scene = render_scene(
            &ctx,
            &filters(PRICE_METRIC, MapStyle::OpenStreetMap, RoomCount::Five),
        )
        .unwrap();
        assert_eq!(scene.layer.point_count, 0);
        assert_eq!(
            scene.title,
            "Resale Prices, 0 points plotted (no data for 5-Room in Last 6 Months)"
        );
    }

    #[test]
    fn unknown_metric_is_an_error() {
        let ctx = context();
        let err = render_scene(
            &ctx,
            &filters("Nope", MapStyle::OpenStreetMap, RoomCount::Four),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Metric(_)));
    }

    #[test]
    fn mapbox_requires_loaded_token() {
        let request = filters("Age", MapStyle::Mapbox, RoomCount::Four);

        let err = render_scene(&context(), &request).unwrap_err();
        assert!(matches!(err, SceneError::Style(_)));

        let scene = render_scene(&context_with_token(), &request).unwrap();
        assert!(matches!(scene.style, StyleConfig::Mapbox { .. }));
    }

    #[test]
    fn default_filters_render() {
        let ctx = context();
        let scene = render_scene(&ctx, &ctx.default_filters()).unwrap();
        assert_eq!(scene.title, "Age, 3 points plotted");
    }
}
