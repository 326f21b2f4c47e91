use axum::{
    extract::{Multipart, Path, State},
    response::{Html, Redirect},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::session::{CurrentUser, FlashLevel, PageContext, push_flash};
use super::validation::{
    MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, MAX_TITLE_LEN, parse_item_id, validate_field_length,
};
use super::{ApiError, AppState, pages};
use crate::constants::routes;
use crate::db::NewItem;
use crate::entities::items::ItemKind;
use crate::services::{ItemError, UploadedFile};

/// Fields of a report submission, read from `multipart/form-data`.
#[derive(Debug, Default)]
pub struct ReportForm {
    pub item: NewItem,
    pub image: Option<UploadedFile>,
}

impl ReportForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.item.title = field.text().await?,
                "description" => form.item.description = field.text().await?,
                "location" => form.item.location = field.text().await?,
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    form.image = Some(UploadedFile::new(file_name, bytes));
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Returns the notice for the first over-long field.
    pub fn check_lengths(&self) -> Result<(), String> {
        validate_field_length("Title", &self.item.title, MAX_TITLE_LEN)?;
        validate_field_length("Description", &self.item.description, MAX_DESCRIPTION_LEN)?;
        validate_field_length("Location", &self.item.location, MAX_LOCATION_LEN)
    }
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let ctx = PageContext::load(&session).await?;
    let items = state.item_service().list_items().await?;
    Ok(pages::index(&ctx, &items))
}

/// GET /items
pub async fn dashboard() -> Redirect {
    Redirect::to(routes::HOME)
}

/// GET /report/lost
pub async fn report_lost_page(session: Session) -> Result<Html<String>, ApiError> {
    Ok(pages::report(&PageContext::load(&session).await?, ItemKind::Lost))
}

/// POST /report/lost
pub async fn report_lost(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let form = ReportForm::from_multipart(multipart).await?;
    tracing::debug!(username = %user.username, "Lost report submitted");
    submit_report(&state, &session, ItemKind::Lost, form).await
}

/// GET /report/found
pub async fn report_found_page(session: Session) -> Result<Html<String>, ApiError> {
    Ok(pages::report(&PageContext::load(&session).await?, ItemKind::Found))
}

/// POST /report/found
pub async fn report_found(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let form = ReportForm::from_multipart(multipart).await?;
    tracing::debug!(username = %user.username, "Found report submitted");
    submit_report(&state, &session, ItemKind::Found, form).await
}

async fn submit_report(
    state: &AppState,
    session: &Session,
    kind: ItemKind,
    form: ReportForm,
) -> Result<Redirect, ApiError> {
    let form_route = match kind {
        ItemKind::Lost => routes::REPORT_LOST,
        ItemKind::Found => routes::REPORT_FOUND,
    };

    if let Err(msg) = form.check_lengths() {
        push_flash(session, FlashLevel::Error, msg).await?;
        return Ok(Redirect::to(form_route));
    }

    match state
        .item_service()
        .report_item(kind, form.item, form.image)
        .await
    {
        Ok(_) => {
            let notice = match kind {
                ItemKind::Lost => "Lost item reported successfully!",
                ItemKind::Found => "Found item reported successfully!",
            };
            push_flash(session, FlashLevel::Success, notice).await?;
            Ok(Redirect::to(routes::DASHBOARD))
        }
        Err(ItemError::InvalidImageFormat) => {
            push_flash(session, FlashLevel::Error, "Invalid image format!").await?;
            Ok(Redirect::to(form_route))
        }
        Err(ItemError::Validation(msg)) => {
            push_flash(session, FlashLevel::Error, msg).await?;
            Ok(Redirect::to(form_route))
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /delete/{id}
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Result<Redirect, ApiError> {
    if let Some(id) = parse_item_id(&raw_id)? {
        state.item_service().delete_item(id).await?;
    } else {
        tracing::debug!(item_id = %raw_id, "Delete requested for an id no item can have");
    }
    push_flash(&session, FlashLevel::Success, "Item deleted successfully").await?;
    Ok(Redirect::to(routes::DASHBOARD))
}
