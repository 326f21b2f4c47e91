//! `SeaORM` implementation of the `ItemService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::db::{Item, NewItem, Store};
use crate::domain::ItemId;
use crate::entities::items::ItemKind;
use crate::services::item_service::{ItemError, ItemService};
use crate::services::upload::{UploadService, UploadedFile};

pub struct SeaOrmItemService {
    store: Store,
    uploads: Arc<UploadService>,
}

impl SeaOrmItemService {
    #[must_use]
    pub const fn new(store: Store, uploads: Arc<UploadService>) -> Self {
        Self { store, uploads }
    }
}

fn normalize(item: NewItem) -> Result<NewItem, ItemError> {
    let title = item.title.trim().to_string();
    if title.is_empty() {
        return Err(ItemError::Validation("Title is required".to_string()));
    }

    Ok(NewItem {
        title,
        description: item.description.trim().to_string(),
        location: item.location.trim().to_string(),
    })
}

#[async_trait]
impl ItemService for SeaOrmItemService {
    async fn report_item(
        &self,
        kind: ItemKind,
        item: NewItem,
        image: Option<UploadedFile>,
    ) -> Result<ItemId, ItemError> {
        let item = normalize(item)?;

        let image = match self.uploads.accept_image(image).await {
            Ok(image) => image,
            Err(err) => {
                warn!(kind = kind.as_str(), error = %err, "Report rejected");
                return Err(err.into());
            }
        };

        let stored = self.store.insert_item(kind, item, image).await?;
        info!(
            item_id = stored.id,
            kind = kind.as_str(),
            image = stored.image.as_deref().unwrap_or("-"),
            "Item reported"
        );
        Ok(ItemId::new(stored.id))
    }

    async fn list_items(&self) -> Result<Vec<Item>, ItemError> {
        Ok(self.store.list_items_newest_first().await?)
    }

    async fn list_items_in_store_order(&self) -> Result<Vec<Item>, ItemError> {
        Ok(self.store.list_all_items().await?)
    }

    async fn delete_item(&self, id: ItemId) -> Result<bool, ItemError> {
        let removed = self.store.delete_item(id.value()).await?;
        if removed {
            info!(item_id = %id, "Item deleted");
        } else {
            debug!(item_id = %id, "Delete requested for missing item");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let err = normalize(NewItem {
            title: "   ".to_string(),
            ..NewItem::default()
        })
        .unwrap_err();
        assert!(matches!(err, ItemError::Validation(_)));
    }

    #[test]
    fn fields_are_trimmed() {
        let item = normalize(NewItem {
            title: " Wallet ".to_string(),
            description: "brown ".to_string(),
            location: "".to_string(),
        })
        .unwrap();
        assert_eq!(item.title, "Wallet");
        assert_eq!(item.description, "brown");
        assert_eq!(item.location, "");
    }
}
