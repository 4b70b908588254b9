//! WeChat proxy endpoints - forward the admin UI's platform calls upstream.
//!
//! These endpoints validate required parameters and pass everything else
//! through untouched; the upstream JSON body comes back inside the standard
//! envelope.

use crate::{
    api::{
        AppState,
        auth::CurrentUser,
        response::{Envelope, success},
    },
    errors::{Error, Result},
    wechat::TemplateMessage,
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;

fn require_param(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| Error::InvalidArgument {
            message: format!("Missing required parameter: {name}"),
        })
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub appid: Option<String>,
    pub secret: Option<String>,
}

/// `GET /wx/info/gettoken?appid=&secret=`
pub async fn get_token(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Envelope<Value>>> {
    let appid = require_param(query.appid, "appid")?;
    let secret = require_param(query.secret, "secret")?;
    let body = state.wechat.get_token(&appid, &secret).await?;
    Ok(success(body))
}

#[derive(Debug, Deserialize)]
pub struct OpenidQuery {
    pub appid: Option<String>,
    pub secret: Option<String>,
    pub code: Option<String>,
}

/// `GET /wx/info/getopenid?appid=&secret=&code=`
pub async fn get_openid(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<OpenidQuery>,
) -> Result<Json<Envelope<Value>>> {
    let appid = require_param(query.appid, "appid")?;
    let secret = require_param(query.secret, "secret")?;
    let code = require_param(query.code, "code")?;
    let body = state.wechat.get_openid(&appid, &secret, &code).await?;
    Ok(success(body))
}

#[derive(Debug, Deserialize)]
pub struct UserInfoQuery {
    pub access_token: Option<String>,
    pub openid: Option<String>,
}

/// `GET /wx/info/getuserinfo?access_token=&openid=`
pub async fn get_user_info(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<UserInfoQuery>,
) -> Result<Json<Envelope<Value>>> {
    let access_token = require_param(query.access_token, "access_token")?;
    let openid = require_param(query.openid, "openid")?;
    let body = state.wechat.get_user_info(&access_token, &openid).await?;
    Ok(success(body))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub message: TemplateMessage,
}

/// `POST /wx/act/sendmessage`
pub async fn send_message(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Envelope<Value>>> {
    let access_token = require_param(request.access_token, "access_token")?;
    let body = state
        .wechat
        .send_template_message(&access_token, &request.message)
        .await?;
    Ok(success(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_param() {
        assert!(require_param(Some("x".to_string()), "appid").is_ok());
        assert!(matches!(
            require_param(None, "appid"),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            require_param(Some(String::new()), "appid"),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
