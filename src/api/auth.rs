use axum::{
    Form,
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::session::{FlashLevel, PageContext, current_identity, push_flash, sign_in, sign_out};
use super::validation::{MAX_USERNAME_LEN, validate_field_length};
use super::{ApiError, AppState, pages};
use crate::constants::routes;
use crate::domain::Identity;
use crate::services::AuthError;

/// Response header naming why a guard turned the request away.
pub const ACCESS_DENIED_HEADER: &str = "x-access-denied";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    NotAuthenticated,
    NotAuthorized,
}

impl AccessDenied {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AccessDenied::NotAuthenticated => "not-authenticated",
            AccessDenied::NotAuthorized => "not-authorized",
        }
    }

    const fn notice(self) -> &'static str {
        match self {
            AccessDenied::NotAuthenticated => "Please log in to continue.",
            AccessDenied::NotAuthorized => "Admin access required.",
        }
    }

    async fn respond(self, session: &Session, target: &'static str, path: &str) -> Response {
        tracing::info!(reason = self.as_str(), path = %path, "Access denied");

        if let Err(err) = push_flash(session, FlashLevel::Error, self.notice()).await {
            return err.into_response();
        }

        ([(ACCESS_DENIED_HEADER, self.as_str())], Redirect::to(target)).into_response()
    }
}

/// Lets the request through only with a signed-in identity; otherwise
/// redirects to the login page.
pub async fn require_auth(session: Session, mut request: Request, next: Next) -> Response {
    match current_identity(&session).await {
        Ok(Some(identity)) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Ok(None) => {
            AccessDenied::NotAuthenticated
                .respond(&session, routes::LOGIN, request.uri().path())
                .await
        }
        Err(err) => err.into_response(),
    }
}

/// Lets the request through only for admins. Anonymous visitors and
/// signed-in users both land on the home page, with distinct reasons.
pub async fn require_admin(session: Session, mut request: Request, next: Next) -> Response {
    let reason = match current_identity(&session).await {
        Ok(Some(identity)) if identity.is_admin() => {
            request.extensions_mut().insert(identity);
            return next.run(request).await;
        }
        Ok(Some(_)) => AccessDenied::NotAuthorized,
        Ok(None) => AccessDenied::NotAuthenticated,
        Err(err) => return err.into_response(),
    };

    reason
        .respond(&session, routes::HOME, request.uri().path())
        .await
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /register
pub async fn register_page(session: Session) -> Result<Html<String>, ApiError> {
    Ok(pages::register(&PageContext::load(&session).await?))
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect, ApiError> {
    if let Err(msg) = validate_field_length("Username", form.username.trim(), MAX_USERNAME_LEN) {
        push_flash(&session, FlashLevel::Error, msg).await?;
        return Ok(Redirect::to(routes::REGISTER));
    }

    match state
        .auth_service()
        .register(&form.username, &form.password)
        .await
    {
        Ok(_) => {
            push_flash(&session, FlashLevel::Success, "Account created successfully!").await?;
            Ok(Redirect::to(routes::LOGIN))
        }
        Err(AuthError::DuplicateUser(_)) => {
            push_flash(&session, FlashLevel::Error, "Username already exists!").await?;
            Ok(Redirect::to(routes::REGISTER))
        }
        Err(AuthError::Validation(msg)) => {
            push_flash(&session, FlashLevel::Error, msg).await?;
            Ok(Redirect::to(routes::REGISTER))
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /login
pub async fn login_page(session: Session) -> Result<Html<String>, ApiError> {
    Ok(pages::login(&PageContext::load(&session).await?))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect, ApiError> {
    let user = match state
        .auth_service()
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed: invalid credentials");
            push_flash(&session, FlashLevel::Error, "Invalid credentials").await?;
            return Ok(Redirect::to(routes::LOGIN));
        }
        Err(err) => return Err(err.into()),
    };

    let identity = Identity::from(user);
    sign_in(&session, &identity).await?;
    push_flash(&session, FlashLevel::Success, "Login successful!").await?;

    tracing::info!(username = %identity.username, role = identity.role.as_str(), "Session established");

    if identity.is_admin() {
        Ok(Redirect::to(routes::ADMIN))
    } else {
        Ok(Redirect::to(routes::HOME))
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Result<Redirect, ApiError> {
    if let Some(identity) = current_identity(&session).await? {
        tracing::info!(username = %identity.username, "Logged out");
    }
    sign_out(&session).await?;
    push_flash(&session, FlashLevel::Info, "Logged out successfully").await?;
    Ok(Redirect::to(routes::HOME))
}
