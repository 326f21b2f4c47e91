//! Domain service for lost and found reports.
//!
//! Every report is validated (title, optional image) before any row is
//! written, so a rejected upload never leaves a half-stored item behind.

use thiserror::Error;

use crate::db::{Item, NewItem};
use crate::domain::ItemId;
use crate::entities::items::ItemKind;
use crate::services::upload::{UploadError, UploadedFile};

/// Errors for item registry operations.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Invalid image format!")]
    InvalidImageFormat,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ItemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<UploadError> for ItemError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidImageFormat { .. } => Self::InvalidImageFormat,
            UploadError::Io { .. } => Self::Internal(err.to_string()),
        }
    }
}

#[async_trait::async_trait]
pub trait ItemService: Send + Sync {
    /// Stores a new report with status `Pending`.
    ///
    /// # Errors
    ///
    /// - Returns [`ItemError::InvalidImageFormat`] if a file was selected
    ///   with a disallowed extension; nothing is stored in that case.
    /// - Returns [`ItemError::Validation`] for a blank title.
    async fn report_item(
        &self,
        kind: ItemKind,
        item: NewItem,
        image: Option<UploadedFile>,
    ) -> Result<ItemId, ItemError>;

    /// All items, newest first.
    async fn list_items(&self) -> Result<Vec<Item>, ItemError>;

    /// All items in store order, as shown to admins and exported.
    async fn list_items_in_store_order(&self) -> Result<Vec<Item>, ItemError>;

    /// Removes an item. Returns `false` when no such item existed.
    async fn delete_item(&self, id: ItemId) -> Result<bool, ItemError>;
}
