//! Selector options offered to the frontend.

use hdb_map_housing_models::{RoomCount, TimeWindow};
use hdb_map_view_models::{ControlOption, ControlSet, MapStyle};

use crate::AppContext;

/// Builds every selector's options and initial values.
///
/// Styles that need a credential the context does not have are listed but
/// disabled, so they cannot be chosen.
#[must_use]
pub fn controls(ctx: &AppContext) -> ControlSet {
    let metrics = ctx
        .catalog()
        .names()
        .into_iter()
        .map(|name| ControlOption::new(name, name))
        .collect();

    let map_styles = MapStyle::all()
        .iter()
        .map(|&style| ControlOption {
            value: style.to_string(),
            label: style.label().to_string(),
            disabled: !ctx.style_available(style),
        })
        .collect();

    let room_counts = RoomCount::all()
        .iter()
        .map(|rooms| ControlOption::new(rooms.to_string(), rooms.label()))
        .collect();

    let time_windows = TimeWindow::all()
        .iter()
        .map(|window| ControlOption::new(window.to_string(), window.label()))
        .collect();

    ControlSet {
        metrics,
        map_styles,
        room_counts,
        time_windows,
        defaults: ctx.default_filters(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{context, context_with_token};

    fn mapbox_option(set: &ControlSet) -> &ControlOption {
        set.map_styles.iter().find(|o| o.value == "MB").unwrap()
    }

    #[test]
    fn mapbox_disabled_without_token() {
        let set = controls(&context());
        assert!(mapbox_option(&set).disabled);
        assert!(set.map_styles.iter().any(|o| o.value == "OSM" && !o.disabled));
    }

    #[test]
    fn mapbox_enabled_with_token() {
        let set = controls(&context_with_token());
        assert!(!mapbox_option(&set).disabled);
    }

    #[test]
    fn lists_metrics_in_registration_order_with_first_as_default() {
        let set = controls(&context());
        let values: Vec<&str> = set.metrics.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["Age", "Resale Prices"]);
        assert_eq!(set.defaults.metric, "Age");
        assert_eq!(set.defaults.map_style, MapStyle::OpenStreetMap);
    }

    #[test]
    fn lists_fixed_selector_values() {
        let set = controls(&context());
        let rooms: Vec<&str> = set.room_counts.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(rooms, vec!["3", "4", "5"]);
        let windows: Vec<&str> = set.time_windows.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(windows, vec!["Last 6 Months", "Last 12 Months"]);
    }
}
