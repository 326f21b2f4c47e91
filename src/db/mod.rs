use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::items::ItemKind;
use crate::entities::users::Role;

pub mod migrator;
pub mod repositories;

pub use repositories::item::{Item, NewItem};
pub use repositories::user::{InsertUserOutcome, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: String,
        role: Role,
    ) -> Result<InsertUserOutcome> {
        self.user_repo().insert(username, password_hash, role).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    // ========== Item Repository Methods ==========

    fn item_repo(&self) -> repositories::item::ItemRepository {
        repositories::item::ItemRepository::new(self.conn.clone())
    }

    pub async fn insert_item(
        &self,
        kind: ItemKind,
        item: NewItem,
        image: Option<String>,
    ) -> Result<Item> {
        self.item_repo().insert(kind, item, image).await
    }

    pub async fn get_item(&self, id: i32) -> Result<Option<Item>> {
        self.item_repo().get(id).await
    }

    pub async fn list_items_newest_first(&self) -> Result<Vec<Item>> {
        self.item_repo().list_newest_first().await
    }

    pub async fn list_all_items(&self) -> Result<Vec<Item>> {
        self.item_repo().list_all().await
    }

    pub async fn delete_item(&self, id: i32) -> Result<bool> {
        self.item_repo().delete(id).await
    }

    pub async fn count_items(&self) -> Result<u64> {
        self.item_repo().count().await
    }
}
