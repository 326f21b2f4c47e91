//! Spreadsheet export of every stored item.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;
use tokio::task;
use tracing::info;

use crate::config::ExportConfig;
use crate::constants::export::HEADER;
use crate::db::Item;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to build spreadsheet: {0}")]
    Spreadsheet(#[from] XlsxError),

    #[error("Failed to write export file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Export task failed: {0}")]
    Task(String),
}

pub struct ExportService {
    path: PathBuf,
}

impl ExportService {
    #[must_use]
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the workbook to the configured path, replacing any earlier
    /// export, and returns its bytes.
    pub async fn export(&self, items: Vec<Item>) -> Result<Vec<u8>, ExportError> {
        self.export_to(items, &self.path).await
    }

    pub async fn export_to(&self, items: Vec<Item>, path: &Path) -> Result<Vec<u8>, ExportError> {
        let rows = items.len();
        let bytes = task::spawn_blocking(move || render_workbook(&items))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))??;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ExportError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        tokio::fs::write(path, &bytes)
            .await
            .map_err(|source| ExportError::Io {
                path: path.display().to_string(),
                source,
            })?;

        info!(path = %path.display(), rows, "Items exported");
        Ok(bytes)
    }
}

/// One header row, then one row per item in the given order.
pub fn render_workbook(items: &[Item]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, title) in (0u16..).zip(HEADER) {
        sheet.write_string_with_format(0, col, title, &bold)?;
    }

    for (row, item) in (1u32..).zip(items) {
        sheet.write_number(row, 0, item.id)?;
        sheet.write_string(row, 1, &item.title)?;
        sheet.write_string(row, 2, &item.description)?;
        sheet.write_string(row, 3, &item.location)?;
        sheet.write_string(row, 4, item.kind.as_str())?;
        sheet.write_string(row, 5, item.status.as_str())?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::items::{ItemKind, ItemStatus};

    fn item(id: i32, title: &str) -> Item {
        Item {
            id,
            title: title.to_string(),
            description: String::new(),
            location: "Library".to_string(),
            kind: ItemKind::Lost,
            image: None,
            status: ItemStatus::Pending,
            created_at: String::new(),
        }
    }

    #[test]
    fn empty_export_is_a_valid_workbook() {
        let bytes = render_workbook(&[]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn export_overwrites_previous_file() {
        let path = std::env::temp_dir().join(format!("lostfound-export-{}.xlsx", uuid::Uuid::new_v4()));
        let service = ExportService::new(&ExportConfig {
            path: path.display().to_string(),
        });

        let first = service.export(vec![item(1, "Wallet")]).await.unwrap();
        let second = service
            .export(vec![item(1, "Wallet"), item(2, "Umbrella")])
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&path).unwrap(), second);
        std::fs::remove_file(&path).ok();
    }
}
