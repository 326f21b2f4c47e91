pub mod auth_service;
pub use auth_service::{AuthError, AuthService};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod item_service;
pub use item_service::{ItemError, ItemService};

pub mod item_service_impl;
pub use item_service_impl::SeaOrmItemService;

pub mod upload;
pub use upload::{UploadError, UploadService, UploadedFile};

pub mod export;
pub use export::{ExportError, ExportService};
