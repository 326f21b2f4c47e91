//! `SeaORM` implementation of the `AuthService` trait.

use anyhow::Context;
use async_trait::async_trait;
use tokio::task;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password;
use crate::db::{InsertUserOutcome, Store, User};
use crate::entities::users::Role;
use crate::services::auth_service::{AuthError, AuthService, normalize_username};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = normalize_username(username);

        if username.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let role = Role::for_username(&username, &self.security.admin_username);

        let password = password.to_string();
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        match self.store.insert_user(&username, password_hash, role).await? {
            InsertUserOutcome::Created(user) => {
                info!(username = %user.username, role = user.role.as_str(), "User registered");
                Ok(user)
            }
            InsertUserOutcome::DuplicateUsername => {
                warn!(username = %username, "Registration rejected: username taken");
                Err(AuthError::DuplicateUser(username))
            }
        }
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = normalize_username(username);

        let user = self
            .store
            .verify_user_password(&username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        info!(username = %user.username, "User authenticated");
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.list_users().await?)
    }
}
