//! Identification of the requesting viewer.
//!
//! Every request sees the screens of the public group. A valid
//! `Authorization: Bearer <token>` header adds the groups of the token's
//! user; an unknown or malformed token is rejected.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use phenosaurus_common::ApiError;
use phenosaurus_db::User;
use tracing::{debug, warn};

use crate::state::{AppState, SharedState};

#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: Option<User>,
    pub group_ids: Vec<i64>,
}

impl Viewer {
    pub fn anonymous(public_group_id: i64) -> Self {
        Self { user: None, group_ids: vec![public_group_id] }
    }

    /// Ids of the screens this viewer may see.
    pub async fn authorized_screen_ids(&self, state: &AppState) -> Result<Vec<i64>, ApiError> {
        Ok(state.screens().authorized_ids(&self.group_ids).await?)
    }
}

impl FromRequestParts<SharedState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let mut viewer = Viewer::anonymous(state.config.auth.public_group_id);
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(viewer);
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized("Expected a bearer token".to_string()))?;

        let users = state.users();
        let Some(user) = users.find_by_token(bearer.token()).await? else {
            warn!("Rejected unknown API token");
            return Err(ApiError::Unauthorized("Unknown API token".to_string()));
        };

        for group_id in users.group_ids(user.id).await? {
            if !viewer.group_ids.contains(&group_id) {
                viewer.group_ids.push(group_id);
            }
        }
        debug!("Request by {} (groups {:?})", user.username, viewer.group_ids);
        viewer.user = Some(user);
        Ok(viewer)
    }
}

/// A viewer with staff rights, required by all admin endpoints.
#[derive(Debug, Clone)]
pub struct Staff(pub User);

impl FromRequestParts<SharedState> for Staff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        match Viewer::from_request_parts(parts, state).await?.user {
            Some(user) if user.is_staff => Ok(Staff(user)),
            Some(user) => Err(ApiError::Forbidden(format!("{} is not a staff member", user.username))),
            None => Err(ApiError::Unauthorized("Staff credentials required".to_string())),
        }
    }
}
