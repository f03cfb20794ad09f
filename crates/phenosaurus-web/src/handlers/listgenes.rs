use axum::{extract::State, response::Html};
use minijinja::context;
use phenosaurus_common::ApiError;

use crate::state::SharedState;
use crate::templates::render;

/// GET /listgenes/: every gene with its chromosome and orientation
pub async fn listgenes(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let genes = state.genes().all().await?;
    render(
        &state.templates,
        "listgenes.html",
        context! { title => "Genes", genes },
    )
}
