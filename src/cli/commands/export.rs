//! Export command handler

use std::path::Path;

use crate::config::Config;
use crate::db::Store;
use crate::services::ExportService;

pub async fn cmd_export(config: &Config, output: Option<&Path>) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let items = store.list_all_items().await?;
    let count = items.len();

    let service = ExportService::new(&config.export);
    let path = output.unwrap_or_else(|| service.path());
    service.export_to(items, path).await?;

    println!("Exported {} item(s) to {}", count, path.display());
    Ok(())
}
