//! HTTP handler functions for the HDB block map API.

use actix_web::{HttpResponse, web};
use hdb_map_server_models::{ApiError, ApiHealth, SceneQueryParams, TransactionQueryParams};
use hdb_map_view::selection::{self, ClickPayload, FALLBACK_MESSAGE};
use hdb_map_view_models::SelectionView;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/controls`
///
/// Returns every selector's options and the initial selection. Styles
/// without a loaded credential are marked disabled.
pub async fn controls(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(hdb_map_view::controls::controls(&state.context))
}

/// `GET /api/scene`
///
/// Renders the map scene for the given selectors. A selector combination
/// with no recorded data renders an empty layer, not an error.
pub async fn scene(
    state: web::Data<AppState>,
    params: web::Query<SceneQueryParams>,
) -> HttpResponse {
    let ctx = &state.context;

    let filters = match params.into_inner().into_filters(ctx.default_filters()) {
        Ok(filters) => filters,
        Err(e) => {
            log::debug!("Rejected scene request: {e}");
            return HttpResponse::BadRequest().json(ApiError::new(e));
        }
    };

    match hdb_map_view::render_scene(ctx, &filters) {
        Ok(scene) => HttpResponse::Ok().json(scene),
        Err(e) => {
            log::warn!("Failed to render scene: {e}");
            HttpResponse::BadRequest().json(ApiError::new(e))
        }
    }
}

/// `GET /api/transactions`
///
/// Lists the clicked block's transactions for the selected room count and
/// time window. Clicks that cannot be resolved return the fallback view.
pub async fn transactions(
    state: web::Data<AppState>,
    params: web::Query<TransactionQueryParams>,
) -> HttpResponse {
    let ctx = &state.context;
    let defaults = ctx.default_filters();

    let (rooms, window) = match params.selectors(defaults.rooms, defaults.window) {
        Ok(selectors) => selectors,
        Err(e) => {
            log::debug!("Rejected transactions request: {e}");
            return HttpResponse::BadRequest().json(ApiError::new(e));
        }
    };

    let params = params.into_inner();
    let payload = match (params.address, params.label) {
        (Some(address), _) => ClickPayload::Address(address),
        (None, Some(label)) => ClickPayload::Label(label),
        (None, None) => {
            log::debug!("Transactions requested without a clicked point");
            return HttpResponse::Ok().json(SelectionView::Fallback {
                message: FALLBACK_MESSAGE.to_string(),
            });
        }
    };

    HttpResponse::Ok().json(selection::selection_view(ctx, &payload, rooms, window))
}
