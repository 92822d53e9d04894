//! Scene composition.
//!
//! Stateless: the same layer, filters and credential always produce the
//! same [`Scene`].

use hdb_map_dataset::AccessToken;
use hdb_map_view_models::{
    FilterState, MapStyle, PointLayer, SINGAPORE_VIEWPORT, Scene, StyleConfig,
};

/// Widget style identifier for OpenStreetMap tiles.
pub const OSM_STYLE: &str = "open-street-map";

/// Mapbox style used when the authenticated tiles are selected.
pub const MAPBOX_STYLE: &str = "streets";

/// Errors raised while composing a scene.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    /// The style needs an access token and none was loaded.
    #[error("Map style '{}' is unavailable: no access token was loaded", .style.label())]
    StyleUnavailable {
        /// The rejected style.
        style: MapStyle,
    },
}

/// Assembles the scene for a projected layer under `filters`.
///
/// # Errors
///
/// Returns [`ComposeError::StyleUnavailable`] when `filters` selects
/// Mapbox and `token` is `None`. No Mapbox scene is ever produced without
/// a token.
pub fn compose(
    layer: PointLayer,
    filters: &FilterState,
    token: Option<&AccessToken>,
) -> Result<Scene, ComposeError> {
    let style = style_config(filters.map_style, token)?;
    Ok(Scene {
        title: scene_title(&layer.name, layer.point_count),
        layer,
        viewport: SINGAPORE_VIEWPORT,
        style,
        filters: filters.clone(),
    })
}

/// Assembles a scene with an empty layer and a title explaining why
/// nothing is plotted.
///
/// # Errors
///
/// Same as [`compose`].
pub fn compose_degenerate(
    layer: PointLayer,
    filters: &FilterState,
    token: Option<&AccessToken>,
    reason: &str,
) -> Result<Scene, ComposeError> {
    let mut scene = compose(layer, filters, token)?;
    scene.title = format!("{} ({reason})", scene.title);
    Ok(scene)
}

/// Returns the scene title, e.g. `"Age at 2024, 9876 points plotted"`.
#[must_use]
pub fn scene_title(metric: &str, point_count: usize) -> String {
    format!("{metric}, {point_count} points plotted")
}

fn style_config(
    style: MapStyle,
    token: Option<&AccessToken>,
) -> Result<StyleConfig, ComposeError> {
    match style {
        MapStyle::OpenStreetMap => Ok(StyleConfig::OpenStreetMap {
            style: OSM_STYLE.to_string(),
            layers: Vec::new(),
        }),
        MapStyle::Mapbox => {
            let token = token.ok_or(ComposeError::StyleUnavailable { style })?;
            Ok(StyleConfig::Mapbox {
                style: MAPBOX_STYLE.to_string(),
                access_token: token.expose().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdb_map_catalog::ColorDomain;
    use hdb_map_housing_models::{RoomCount, TimeWindow};

    fn filters(map_style: MapStyle) -> FilterState {
        FilterState {
            metric: "Age".to_string(),
            map_style,
            rooms: RoomCount::Four,
            window: TimeWindow::SixMonths,
        }
    }

    fn layer() -> PointLayer {
        let mut layer = PointLayer::empty("Age".to_string(), ColorDomain { min: 0.0, max: 40.0 });
        layer.point_count = 12;
        layer
    }

    #[test]
    fn title_embeds_metric_and_count() {
        let scene = compose(layer(), &filters(MapStyle::OpenStreetMap), None).unwrap();
        assert_eq!(scene.title, "Age, 12 points plotted");
        assert_eq!(scene.viewport, SINGAPORE_VIEWPORT);
    }

    #[test]
    fn osm_scene_has_no_token() {
        let scene = compose(layer(), &filters(MapStyle::OpenStreetMap), None).unwrap();
        assert_eq!(
            scene.style,
            StyleConfig::OpenStreetMap {
                style: OSM_STYLE.to_string(),
                layers: Vec::new()
            }
        );
    }

    #[test]
    fn mapbox_without_token_is_rejected() {
        let err = compose(layer(), &filters(MapStyle::Mapbox), None).unwrap_err();
        assert_eq!(
            err,
            ComposeError::StyleUnavailable {
                style: MapStyle::Mapbox
            }
        );
    }

    #[test]
    fn mapbox_with_token_embeds_it() {
        let token = AccessToken::new("pk.test").unwrap();
        let scene = compose(layer(), &filters(MapStyle::Mapbox), Some(&token)).unwrap();
        assert_eq!(
            scene.style,
            StyleConfig::Mapbox {
                style: MAPBOX_STYLE.to_string(),
                access_token: "pk.test".to_string()
            }
        );
    }

    #[test]
    fn composition_is_deterministic() {
        let a = compose(layer(), &filters(MapStyle::OpenStreetMap), None).unwrap();
        let b = compose(layer(), &filters(MapStyle::OpenStreetMap), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_title_explains_reason() {
        let scene = compose_degenerate(
            PointLayer::empty("Age".to_string(), ColorDomain { min: 0.0, max: 40.0 }),
            &filters(MapStyle::OpenStreetMap),
            None,
            "no data",
        )
        .unwrap();
        assert_eq!(scene.title, "Age, 0 points plotted (no data)");
    }
}
