//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{
    admin::{
        add_update, admin_index, create_screen, create_track, export_resource, import_resource,
        list_settings, list_tracks, screen_groups, set_setting,
    },
    fishtail::simpleplot,
    genefinder::opengenefinder,
    listgenes::listgenes,
    pages::{about, contact, help, home, not_found, updates},
};
use crate::state::{AppState, SharedState};

/// Datapoint files run to tens of megabytes.
const IMPORT_BODY_LIMIT: usize = 256 * 1024 * 1024;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",                get(home))
        .route("/simpleplot/",     get(simpleplot))
        .route("/opengenefinder/", get(opengenefinder))
        .route("/listgenes/",      get(listgenes))
        .route("/updates/",        get(updates))
        .route("/help/",           get(help))
        .route("/about/",          get(about))
        .route("/contact/",        get(contact))

        // Administration
        .route("/admin/",                   get(admin_index))
        .route(
            "/admin/import/{resource}",
            post(import_resource).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route("/admin/export/{resource}",  get(export_resource))
        .route("/admin/screens",            post(create_screen))
        .route("/admin/screens/{id}/groups", post(screen_groups))
        .route("/admin/updates",            post(add_update))
        .route("/admin/settings",           get(list_settings).post(set_setting))
        .route("/admin/tracks",             get(list_tracks).post(create_track))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
