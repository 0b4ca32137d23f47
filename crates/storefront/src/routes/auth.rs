//! Authentication route handlers.
//!
//! Registration and the password reset request are deliberately
//! indistinguishable for existing and unknown emails: both answer the same
//! generic message, so the endpoints cannot be used to probe which
//! addresses have accounts.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use wellcomp_core::UserId;

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Body for `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// `POST /api/auth/register` - create an account.
///
/// Answers the same message whether or not the email was already taken.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    state
        .auth()
        .register(&body.email, &body.password, body.name.trim())
        .await?;

    Ok(Json(json!({
        "message": "Sikeres regisztráció, most már bejelentkezhet."
    })))
}

/// Body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The logged-in user as returned to the frontend.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

/// `POST /api/auth/login` - verify credentials and open a session.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let user = state.auth().login(&body.email, &body.password).await?;

    let current = CurrentUser {
        id: UserId::new(&user.id),
        email: user.email.clone(),
        name: user.name.clone(),
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("Session write failed: {e}")))?;

    tracing::info!("User logged in");
    Ok(Json(UserResponse {
        email: user.email,
        name: user.name,
    }))
}

/// `POST /api/auth/logout` - drop the session's user.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("Session write failed: {e}")))?;
    Ok(Json(json!({ "message": "Kijelentkezve." })))
}

/// `GET /api/auth/me` - the current user, or 401.
#[instrument(skip_all)]
pub async fn me(
    crate::middleware::RequireAuth(user): crate::middleware::RequireAuth,
) -> Json<UserResponse> {
    Json(UserResponse {
        email: user.email,
        name: user.name,
    })
}

/// Body for `POST /api/auth/password-reset/request`.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// `POST /api/auth/password-reset/request` - email a reset link.
///
/// Always answers the same message; email delivery failures are logged but
/// not surfaced, since a distinct error would reveal that the account
/// exists.
#[instrument(skip_all)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<Value>> {
    match state.auth().issue_reset_token(&body.email).await {
        Ok(Some(token)) => {
            let reset_url = format!(
                "{}/uj-jelszo?token={}",
                state.config().frontend_url,
                urlencoding::encode(&token)
            );
            if let Err(e) = state
                .resend()
                .send_password_reset(body.email.trim(), &reset_url)
                .await
            {
                tracing::error!("Password reset email failed: {e}");
                sentry::capture_error(&e);
            }
        }
        Ok(None) => {}
        Err(e) => {
            // Invalid email syntax lands here too; still answer generically.
            tracing::info!("Password reset request not actionable: {e}");
        }
    }

    Ok(Json(json!({
        "message": "Ha a megadott címhez tartozik fiók, elküldtük a jelszó-visszaállító linket."
    })))
}

/// Body for `POST /api/auth/password-reset/confirm`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

/// `POST /api/auth/password-reset/confirm` - set the new password.
#[instrument(skip_all)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetConfirmRequest>,
) -> Result<Json<Value>> {
    state
        .auth()
        .confirm_reset(body.token.trim(), &body.new_password)
        .await?;

    Ok(Json(json!({ "message": "A jelszó megváltozott, jelentkezzen be." })))
}
