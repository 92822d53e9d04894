//! Metric projection onto the block point layer.
//!
//! Every block is always plotted: blocks without an aggregate for the
//! selected combination keep their position with a missing value, so the
//! point count never depends on the data coverage of a selection.

use hdb_map_catalog::CatalogError;
use hdb_map_housing_models::{RoomCount, TimeWindow};
use hdb_map_view_models::{MapPoint, PointLayer};

use crate::AppContext;

/// Token separating the block identity from the rest of a hover label.
pub const LABEL_SEPARATOR: &str = "<br>";

/// Errors raised while projecting a metric.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// The metric is unknown or was resolved without its parameters.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The aggregate table has no columns for this combination.
    #[error("No data recorded for '{metric}' with {rooms}-Room in the last {window} months")]
    MissingColumn {
        /// Metric display name.
        metric: String,
        /// Requested room count.
        rooms: RoomCount,
        /// Requested time window.
        window: TimeWindow,
    },
}

/// Builds the point layer for `metric` under the given selectors.
///
/// Pure: the same inputs always yield the same layer.
///
/// # Errors
///
/// Returns [`ProjectionError::Catalog`] for an unknown metric and
/// [`ProjectionError::MissingColumn`] when the combination was never
/// recorded in the aggregate table.
pub fn project(
    ctx: &AppContext,
    metric: &str,
    rooms: RoomCount,
    window: TimeWindow,
) -> Result<PointLayer, ProjectionError> {
    let catalog = ctx.catalog();
    let key = catalog.key_for(metric, Some(rooms), Some(window))?;
    let definition = catalog
        .get(key.metric)
        .ok_or_else(|| CatalogError::UnknownMetric {
            name: metric.to_string(),
        })?;

    let dataset = ctx.dataset();
    let aggregate = dataset.aggregate();

    let bound = dataset
        .columns()
        .get(&key)
        .ok_or_else(|| ProjectionError::MissingColumn {
            metric: definition.name.clone(),
            rooms,
            window,
        })?;

    // Bound label columns always exist; an absent one would have failed load.
    let labels = aggregate.text_column(&bound.label_column).unwrap_or_default();

    let points: Vec<MapPoint> = aggregate
        .blocks()
        .iter()
        .enumerate()
        .map(|(i, block)| MapPoint {
            address: block.address.clone(),
            latitude: block.latitude,
            longitude: block.longitude,
            value: bound.values.get(i).copied().flatten(),
            label: hover_label(
                &block.address,
                labels.get(i).map_or("", String::as_str),
            ),
        })
        .collect();

    log::debug!(
        "Projected '{}' ({}) onto {} blocks",
        definition.name,
        bound.value_column,
        points.len()
    );

    Ok(PointLayer {
        name: definition.name.clone(),
        point_count: points.len(),
        points,
        color_domain: definition.domain,
    })
}

/// Returns a hover label guaranteed to start with `"<address><br>"`.
///
/// Labels already carrying that prefix are kept as-is; anything else is
/// appended after the prefix.
#[must_use]
pub fn hover_label(address: &str, raw: &str) -> String {
    if raw
        .strip_prefix(address)
        .is_some_and(|rest| rest.starts_with(LABEL_SEPARATOR))
    {
        raw.to_owned()
    } else {
        format!("{address}{LABEL_SEPARATOR}{raw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{PRICE_METRIC, context};

    #[test]
    fn plots_every_block_for_every_bound_combination() {
        let ctx = context();
        let block_count = ctx.dataset().aggregate().len();
        for metric in ctx.catalog().names() {
            for rooms in RoomCount::all() {
                for window in TimeWindow::all() {
                    match project(&ctx, metric, *rooms, *window) {
                        Ok(layer) => {
                            assert_eq!(layer.point_count, block_count);
                            assert_eq!(layer.coordinates().len(), block_count);
                        }
                        Err(ProjectionError::MissingColumn { .. }) => {}
                        Err(e) => panic!("unexpected error for {metric}: {e}"),
                    }
                }
            }
        }
    }

    #[test]
    fn places_price_at_block_coordinates() {
        let ctx = context();
        let layer = project(&ctx, PRICE_METRIC, RoomCount::Four, TimeWindow::SixMonths).unwrap();
        let a = &layer.points[0];
        assert_eq!(a.address, "1 TEST ST");
        assert!((a.latitude - 1.30).abs() < f64::EPSILON);
        assert!((a.longitude - 103.80).abs() < f64::EPSILON);
        assert_eq!(a.value, Some(450_000.0));
        assert_eq!(layer.point_count, ctx.dataset().aggregate().len());
    }

    #[test]
    fn missing_values_are_still_plotted() {
        let ctx = context();
        let layer = project(&ctx, PRICE_METRIC, RoomCount::Four, TimeWindow::SixMonths).unwrap();
        assert_eq!(layer.values(), vec![Some(450_000.0), None, Some(380_000.0)]);
        assert_eq!(layer.point_count, 3);
    }

    #[test]
    fn every_label_starts_with_its_block_address() {
        let ctx = context();
        let layer = project(&ctx, "Age", RoomCount::Four, TimeWindow::SixMonths).unwrap();
        assert_eq!(
            layer.labels(),
            vec![
                "1 TEST ST<br>Age: 10",
                "2 TEST ST<br>Age: 25",
                "3 TEST ST<br>Age: 40"
            ]
        );
    }

    #[test]
    fn projection_is_idempotent() {
        let ctx = context();
        let first = project(&ctx, PRICE_METRIC, RoomCount::Four, TimeWindow::TwelveMonths);
        let second = project(&ctx, PRICE_METRIC, RoomCount::Four, TimeWindow::TwelveMonths);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn fixed_metric_ignores_selectors() {
        let ctx = context();
        let a = project(&ctx, "Age", RoomCount::Three, TimeWindow::SixMonths).unwrap();
        let b = project(&ctx, "Age", RoomCount::Five, TimeWindow::TwelveMonths).unwrap();
        assert_eq!(a, b);
        assert!((a.color_domain.max - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrecorded_combination_is_missing_column() {
        let ctx = context();
        let err = project(&ctx, PRICE_METRIC, RoomCount::Five, TimeWindow::SixMonths).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::MissingColumn {
                rooms: RoomCount::Five,
                ..
            }
        ));
    }

    #[test]
    fn unknown_metric_is_catalog_error() {
        let ctx = context();
        let err = project(&ctx, "Nope", RoomCount::Four, TimeWindow::SixMonths).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::Catalog(CatalogError::UnknownMetric { .. })
        ));
    }

    #[test]
    fn hover_label_keeps_prefixed_label() {
        assert_eq!(
            hover_label("1 TEST ST", "1 TEST ST<br>$450000"),
            "1 TEST ST<br>$450000"
        );
    }

    #[test]
    fn hover_label_prefixes_foreign_label() {
        assert_eq!(hover_label("1 TEST ST", "$450000"), "1 TEST ST<br>$450000");
        assert_eq!(hover_label("1 TEST ST", ""), "1 TEST ST<br>");
        // An address that merely shares a prefix is not the block identity.
        assert_eq!(
            hover_label("1 TEST ST", "1 TEST STREET<br>x"),
            "1 TEST ST<br>1 TEST STREET<br>x"
        );
    }
}
