use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ExportService, ItemService, SeaOrmAuthService, SeaOrmItemService, UploadService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub item_service: Arc<dyn ItemService>,

    pub export_service: Arc<ExportService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let uploads = Arc::new(UploadService::new(&config.uploads));
        uploads.ensure_directory().await?;

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        ));

        let item_service: Arc<dyn ItemService> =
            Arc::new(SeaOrmItemService::new(store.clone(), uploads));

        let export_service = Arc::new(ExportService::new(&config.export));

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            item_service,
            export_service,
        })
    }
}
