//! HTTP interface - router, shared state, and request handlers.
//!
//! Handlers stay thin: decode the request, call into [`crate::core`], wrap
//! the result in the response envelope. All business rules live below this
//! layer.

/// Login, logout, and staff account endpoints
pub mod auth;
/// Catalog and purchased-package endpoints
pub mod packages;
/// Class record and consumption ledger endpoints
pub mod records;
/// Response envelope and error-to-status mapping
pub mod response;
/// Student CRUD endpoints
pub mod students;
/// WeChat proxy endpoints
pub mod wechat;

use crate::{config::AppConfig, wechat::WechatClient};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Database handle, cheap to clone
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub wechat: WechatClient,
}

impl AppState {
    /// Assembles the state from its parts.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let wechat = WechatClient::new(config.wechat_api_base.clone());
        Self {
            db,
            config: Arc::new(config),
            wechat,
        }
    }
}

/// Builds the full application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/users", get(auth::list_users).post(auth::add_user))
        .route("/api/users/{id}", delete(auth::delete_user))
        .route("/api/users/{id}/password", put(auth::change_password))
        .route("/api/students", get(students::list_students))
        .route("/api/students/add", post(students::add_student))
        .route(
            "/api/students/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route(
            "/api/students/{id}/recalculate-hours",
            post(students::recalculate_hours),
        )
        .route(
            "/api/students/{id}/packages",
            get(packages::get_student_packages),
        )
        .route(
            "/api/packages/{id}",
            get(packages::get_package)
                .put(packages::update_package)
                .delete(packages::delete_package),
        )
        .route("/api/packages/add", post(packages::add_package))
        .route(
            "/api/catalog-packages",
            get(packages::list_catalog_packages),
        )
        .route(
            "/api/catalog-packages/add",
            post(packages::add_catalog_package),
        )
        .route(
            "/api/students/{id}/records",
            get(records::get_student_records),
        )
        .route("/api/records", post(records::add_class_record))
        .route(
            "/api/students/{id}/consumption-records",
            get(records::get_consumption_records),
        )
        .route(
            "/api/consumption-records",
            post(records::add_consumption_record),
        )
        .route("/wx/info/gettoken", get(wechat::get_token))
        .route("/wx/info/getopenid", get(wechat::get_openid))
        .route("/wx/info/getuserinfo", get(wechat::get_user_info))
        .route("/wx/act/sendmessage", post(wechat::send_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = setup_test_db().await.unwrap();
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            wechat_api_base: "http://127.0.0.1:9".to_string(),
            session_ttl_seconds: 3600,
        };
        router(AppState::new(db, config))
    }

    #[tokio::test]
    async fn test_protected_route_requires_session() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/students")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_opens_access() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"username": "admin", "password": "admin"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("session="));

        let session_pair = cookie.split(';').next().unwrap().to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/students")
                    .header(header::COOKIE, session_pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_login_returns_unauthorized() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"username": "admin", "password": "wrong"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_student_maps_to_not_found() {
        let app = test_router().await;

        let login = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"username": "admin", "password": "admin"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = login
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/students/999")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
