//! Landing, information and error pages.

use axum::{extract::State, http::StatusCode, response::Html};
use minijinja::context;
use phenosaurus_common::ApiError;
use phenosaurus_db::ScreenType;

use crate::state::SharedState;
use crate::templates::render;
use crate::viewer::Viewer;

/// GET /
pub async fn home(State(state): State<SharedState>, viewer: Viewer) -> Result<Html<String>, ApiError> {
    let authorized = viewer.authorized_screen_ids(&state).await?;
    let ip_screens = state
        .screens()
        .authorized_of_type(&authorized, ScreenType::IntracellularPhenotype)
        .await?;
    render(
        &state.templates,
        "home.html",
        context! { title => "Home page", screen_count => ip_screens.len(), user => viewer.user },
    )
}

/// GET /help/
pub async fn help(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    render(&state.templates, "help.html", context! { title => "Help" })
}

/// GET /about/
pub async fn about(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    render(
        &state.templates,
        "about.html",
        context! {
            title => "About",
            message => "Phenosaurus: a visualization platform for human haploid screens",
        },
    )
}

/// GET /contact/
pub async fn contact(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    render(&state.templates, "contact.html", context! { title => "Contact" })
}

/// GET /updates/: changelog, newest first
pub async fn updates(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let updates = state.updates().all_newest_first().await?;
    render(&state.templates, "updates.html", context! { title => "Updates", updates })
}

/// Fallback for unknown paths.
pub async fn not_found(State(state): State<SharedState>) -> Result<(StatusCode, Html<String>), ApiError> {
    let page = render(&state.templates, "404.html", context! { title => "Page not found" })?;
    Ok((StatusCode::NOT_FOUND, page))
}
