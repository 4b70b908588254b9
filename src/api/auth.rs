//! Login, logout, and staff account management endpoints.
//!
//! Authentication is cookie-based: a successful login stores a session row
//! and hands the browser an `HttpOnly` cookie with its token. The
//! [`CurrentUser`] extractor resolves that cookie on every protected request.

use crate::{
    api::{
        AppState,
        response::{Envelope, success, success_empty},
    },
    core::auth,
    entities::user,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
    http::{HeaderMap, header, request::Parts},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// The authenticated user behind a request, resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = session_token(&parts.headers).ok_or(Error::Unauthorized)?;
        let found = auth::resolve_session(&state.db, &token).await?;
        let row = found.ok_or(Error::Unauthorized)?;
        Ok(Self {
            id: row.id,
            username: row.username,
            is_admin: row.is_admin,
        })
    }
}

/// Pulls the session token out of the `Cookie` header, if present.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn require_admin(current: &CurrentUser) -> Result<()> {
    if current.is_admin {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

/// User fields exposed over the API. The password hash never leaves the
/// server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<user::Model> for UserView {
    fn from(row: user::Model) -> Self {
        Self {
            id: row.id,
            username: row.username,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let row = auth::verify_login(&state.db, &request.username, &request.password).await?;
    let session_row =
        auth::create_session(&state.db, row.id, state.config.session_ttl_seconds).await?;
    tracing::info!(username = %row.username, "user logged in");

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; Max-Age={}",
        session_row.token, state.config.session_ttl_seconds
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        success(UserView::from(row)),
    ))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        auth::delete_session(&state.db, &token).await?;
    }

    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), success_empty()))
}

/// `GET /api/users` (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<Vec<UserView>>>> {
    require_admin(&current)?;
    let rows = auth::list_users(&state.db).await?;
    Ok(success(rows.into_iter().map(UserView::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// `POST /api/users` (admin only)
pub async fn add_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<AddUserRequest>,
) -> Result<Json<Envelope<UserView>>> {
    require_admin(&current)?;
    let row = auth::create_user(
        &state.db,
        &request.username,
        &request.password,
        request.is_admin,
    )
    .await?;
    tracing::info!(username = %row.username, "user account created");
    Ok(success(UserView::from(row)))
}

/// `DELETE /api/users/{id}` (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Envelope<()>>> {
    require_admin(&current)?;
    auth::delete_user(&state.db, user_id, current.id).await?;
    Ok(success_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// `PUT /api/users/{id}/password` - admins may change anyone's, others only
/// their own.
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Envelope<()>>> {
    if !current.is_admin && current.id != user_id {
        return Err(Error::Unauthorized);
    }
    auth::change_password(&state.db, user_id, &request.new_password).await?;
    Ok(success_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn test_require_admin() {
        let admin = CurrentUser {
            id: 1,
            username: "admin".to_string(),
            is_admin: true,
        };
        let staff = CurrentUser {
            id: 2,
            username: "teacher".to_string(),
            is_admin: false,
        };
        assert!(require_admin(&admin).is_ok());
        assert!(matches!(require_admin(&staff), Err(Error::Unauthorized)));
    }
}
