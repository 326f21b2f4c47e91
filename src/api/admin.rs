use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::session::{CurrentUser, PageContext};
use super::{ApiError, AppState, pages};
use crate::constants::export::{CONTENT_TYPE, DOWNLOAD_NAME};

/// GET /admin
pub async fn admin_panel(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let ctx = PageContext::load(&session).await?;
    let users = state.auth_service().list_users().await?;
    let items = state.item_service().list_items_in_store_order().await?;
    Ok(pages::admin(&ctx, &users, &items))
}

/// GET /export
pub async fn export_items(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.item_service().list_items_in_store_order().await?;
    let rows = items.len();
    let bytes = state.shared.export_service.export(items).await?;

    tracing::info!(username = %admin.username, rows, "Spreadsheet downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
            ),
        ],
        bytes,
    ))
}
