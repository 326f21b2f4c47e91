use crate::entities::items::{self, ItemKind, ItemStatus};
use crate::entities::prelude::*;
use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};
use tracing::info;

/// A stored lost/found report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub kind: ItemKind,
    pub image: Option<String>,
    pub status: ItemStatus,
    pub created_at: String,
}

impl From<items::Model> for Item {
    fn from(model: items::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            location: model.location,
            kind: model.kind,
            image: model.image,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

/// Fields supplied by the reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub location: String,
}

/// Repository for item operations
pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, kind: ItemKind, item: NewItem, image: Option<String>) -> Result<Item> {
        let active = items::ActiveModel {
            title: Set(item.title),
            description: Set(item.description),
            location: Set(item.location),
            kind: Set(kind),
            image: Set(image),
            status: Set(ItemStatus::Pending),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert item")?;

        info!(item_id = model.id, kind = kind.as_str(), "Item stored");
        Ok(Item::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Item>> {
        let row = Items::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item")?;

        Ok(row.map(Item::from))
    }

    /// Newest first (by id, descending).
    pub async fn list_newest_first(&self) -> Result<Vec<Item>> {
        let rows = Items::find()
            .order_by_desc(items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list items")?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Store order (by id, ascending).
    pub async fn list_all(&self) -> Result<Vec<Item>> {
        let rows = Items::find()
            .order_by_asc(items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list items")?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Returns whether a row was removed. Missing ids are not an error.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Items::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete item")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Items::find()
            .count(&self.conn)
            .await
            .context("Failed to count items")
    }
}
