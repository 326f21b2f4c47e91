//! Session-backed identity and flash messages.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::ApiError;
use crate::constants::{routes, session::FLASH_KEY, session::USER_KEY};
use crate::domain::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Error => "error",
        }
    }
}

/// A one-shot notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

pub async fn push_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), ApiError> {
    let mut queue: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    queue.push(Flash {
        level,
        message: message.into(),
    });
    session.insert(FLASH_KEY, queue).await?;
    Ok(())
}

/// Drains the queue; a second call returns nothing.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, ApiError> {
    Ok(session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

pub async fn current_identity(session: &Session) -> Result<Option<Identity>, ApiError> {
    Ok(session.get::<Identity>(USER_KEY).await?)
}

/// Binds `identity` to a fresh session id.
pub async fn sign_in(session: &Session, identity: &Identity) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(USER_KEY, identity).await?;
    Ok(())
}

/// Drops every key, including queued flashes.
pub async fn sign_out(session: &Session) -> Result<(), ApiError> {
    session.flush().await?;
    Ok(())
}

/// What every rendered page needs from the session.
#[derive(Debug, Default)]
pub struct PageContext {
    pub identity: Option<Identity>,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    pub async fn load(session: &Session) -> Result<Self, ApiError> {
        Ok(Self {
            identity: current_identity(session).await?,
            flashes: take_flashes(session).await?,
        })
    }
}

/// The identity placed on the request by `require_auth` / `require_admin`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to(routes::LOGIN).into_response())
    }
}
