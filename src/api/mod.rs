use argon2::Argon2;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::constants::routes;
use crate::services::{AuthService, ItemService};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
mod items;
mod pages;
pub mod session;
mod validation;

pub use auth::{ACCESS_DENIED_HEADER, AccessDenied};
pub use error::ApiError;

const SESSION_KEY_SALT: &[u8] = b"lostfound.session-cookie";

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    session_key: Key,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn item_service(&self) -> &Arc<dyn ItemService> {
        &self.shared.item_service
    }
}

/// Stretches a secret of any length into the 64-byte cookie signing key.
pub fn derive_session_key(secret: &str) -> anyhow::Result<Key> {
    let mut material = [0u8; 64];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), SESSION_KEY_SALT, &mut material)
        .map_err(|e| anyhow::anyhow!("Failed to derive session key: {e}"))?;
    Ok(Key::from(&material))
}

pub async fn create_app_state(shared: Arc<SharedState>) -> anyhow::Result<Arc<AppState>> {
    let (secret, source) = shared.config.security.resolve_session_secret()?;
    tracing::debug!(source = ?source, "Session secret resolved");

    let session_key = tokio::task::spawn_blocking(move || derive_session_key(&secret))
        .await
        .map_err(|e| anyhow::anyhow!("Session key task failed: {e}"))??;

    Ok(Arc::new(AppState {
        shared,
        session_key,
    }))
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared).await
}

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.server.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            config.server.session_inactivity_minutes,
        )))
        .with_signed(state.session_key.clone());

    let upload_dir = ServeDir::new(&config.uploads.directory);
    let body_limit = DefaultBodyLimit::max(config.uploads.max_upload_bytes);

    Router::new()
        .merge(create_member_router(body_limit))
        .merge(create_admin_router())
        .route(routes::HOME, get(items::index))
        .route(
            routes::REGISTER,
            get(auth::register_page).post(auth::register),
        )
        .route(routes::LOGIN, get(auth::login_page).post(auth::login))
        .route(routes::LOGOUT, get(auth::logout))
        .layer(session_layer)
        .with_state(state)
        .nest_service(routes::UPLOADS, upload_dir)
        .layer(TraceLayer::new_for_http())
}

fn create_member_router(body_limit: DefaultBodyLimit) -> Router<Arc<AppState>> {
    let report_routes = Router::new()
        .route(
            routes::REPORT_LOST,
            get(items::report_lost_page).post(items::report_lost),
        )
        .route(
            routes::REPORT_FOUND,
            get(items::report_found_page).post(items::report_found),
        )
        .layer(body_limit);

    Router::new()
        .route(routes::DASHBOARD, get(items::dashboard))
        .merge(report_routes)
        .route_layer(middleware::from_fn(auth::require_auth))
}

fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(routes::ADMIN, get(admin::admin_panel))
        .route(&format!("{}/{{id}}", routes::DELETE), get(items::delete_item))
        .route(routes::EXPORT, get(admin::export_items))
        .route_layer(middleware::from_fn(auth::require_admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_is_deterministic_per_secret() {
        let a = derive_session_key("short").unwrap();
        let b = derive_session_key("short").unwrap();
        let c = derive_session_key("another secret").unwrap();
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
