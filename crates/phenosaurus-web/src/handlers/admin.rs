//! Staff-only administration: CSV import/export, screens, permissions,
//! update history, settings and custom tracks.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
};
use chrono::{NaiveDate, Utc};
use minijinja::context;
use phenosaurus_common::ApiError;
use phenosaurus_db::{CustomTrack, NewScreen, Setting};
use phenosaurus_import::{export_csv, import_csv, ResourceKind};
use phenosaurus_plots::{split_gene_input, validate_gene_list};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::state::SharedState;
use crate::templates::render;
use crate::viewer::Staff;

/// GET /admin/: table counts and the list of screens
pub async fn admin_index(
    State(state): State<SharedState>,
    Staff(user): Staff,
) -> Result<Html<String>, ApiError> {
    let stats = state.db.stats().await?;
    let screens = state.screens().all().await?;
    let groups = state.users().groups().await?;
    let settings = state.settings().all().await?;
    let tracks = state.tracks().all().await?;
    let resources: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.name()).collect();
    render(
        &state.templates,
        "admin.html",
        context! { title => "Administration", user, stats, screens, groups, settings, tracks, resources },
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub dry_run: bool,
}

/// POST /admin/import/{resource}: request body is the CSV file
pub async fn import_resource(
    State(state): State<SharedState>,
    Staff(user): Staff,
    Path(resource): Path<String>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let kind: ResourceKind = resource.parse()?;
    info!("{} imports {} ({} bytes)", user.username, kind, body.len());
    let report = import_csv(&state.db, kind, &body, params.dry_run).await?;
    let status = if report.has_errors() { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::OK };
    Ok((status, Json(report)))
}

/// GET /admin/export/{resource}
pub async fn export_resource(
    State(state): State<SharedState>,
    Staff(_): Staff,
    Path(resource): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind: ResourceKind = resource.parse()?;
    let mut csv = Vec::new();
    export_csv(&state.db, kind, &mut csv).await?;
    let disposition = format!("attachment; filename=\"{}-{}.csv\"", kind, Utc::now().format("%Y-%m-%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// POST /admin/screens
pub async fn create_screen(
    State(state): State<SharedState>,
    Staff(user): Staff,
    Json(mut screen): Json<NewScreen>,
) -> Result<impl IntoResponse, ApiError> {
    if screen.scientist_id.is_none() {
        screen.scientist_id = Some(user.id);
    }
    if screen.screen_date.is_none() {
        screen.screen_date = Some(Utc::now());
    }
    let id = state.screens().create(&screen).await?;
    info!("{} created screen {} ({})", user.username, screen.name, id);
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub group_id: i64,
    /// Revoke instead of grant
    #[serde(default)]
    pub revoke: bool,
}

/// POST /admin/screens/{id}/groups
pub async fn screen_groups(
    State(state): State<SharedState>,
    Staff(_): Staff,
    Path(screen_id): Path<i64>,
    Json(req): Json<GrantRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let screens = state.screens();
    if screens.find_by_id(screen_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("screen {screen_id}")));
    }
    if req.revoke {
        screens.revoke(screen_id, req.group_id).await?;
    } else {
        screens.grant(screen_id, req.group_id).await?;
    }
    let groups = screens.group_ids(screen_id).await?;
    Ok(Json(json!({ "screen_id": screen_id, "group_ids": groups })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub date: Option<NaiveDate>,
    pub version: String,
    #[serde(default)]
    pub changes: String,
}

/// POST /admin/updates
pub async fn add_update(
    State(state): State<SharedState>,
    Staff(_): Staff,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let id = state.updates().insert(date, &req.version, &req.changes).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /admin/settings
pub async fn list_settings(
    State(state): State<SharedState>,
    Staff(_): Staff,
) -> Result<Json<Vec<Setting>>, ApiError> {
    Ok(Json(state.settings().all().await?))
}

#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    pub variable_name: String,
    pub value: String,
    #[serde(default)]
    pub comment: String,
}

/// POST /admin/settings
pub async fn set_setting(
    State(state): State<SharedState>,
    Staff(user): Staff,
    Json(req): Json<SettingRequest>,
) -> Result<Json<Vec<Setting>>, ApiError> {
    let settings = state.settings();
    settings.set(&req.variable_name, &req.value, &req.comment).await?;
    info!("{} set {} = {}", user.username, req.variable_name, req.value);
    Ok(Json(settings.all().await?))
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Whitespace separated gene names
    pub genes: String,
}

/// GET /admin/tracks: the caller's own tracks
pub async fn list_tracks(
    State(state): State<SharedState>,
    Staff(user): Staff,
) -> Result<Json<Vec<CustomTrack>>, ApiError> {
    Ok(Json(state.tracks().for_user(user.id).await?))
}

/// POST /admin/tracks: every gene of a track must exist
pub async fn create_track(
    State(state): State<SharedState>,
    Staff(user): Staff,
    Json(req): Json<TrackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let requested = split_gene_input(&req.genes);
    let known = state.genes().find_by_names(&requested).await?;
    let validation = validate_gene_list(&requested, &known);
    if !validation.missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Unknown gene(s): {}",
            validation.missing.join(", ")
        )));
    }
    let id = state
        .tracks()
        .create(user.id, &req.name, &req.description, &validation.genes)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id, "genes": validation.genes }))))
}
