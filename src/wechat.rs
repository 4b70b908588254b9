//! WeChat messaging proxy - thin pass-through client for the handful of
//! upstream calls the admin UI needs.
//!
//! The base URL is configurable so tests (and offline deployments) can point
//! it at a stub server. Responses are forwarded as raw JSON; only the
//! template-send call interprets the upstream `errcode`.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client for the upstream WeChat HTTP API.
#[derive(Debug, Clone)]
pub struct WechatClient {
    http: reqwest::Client,
    base_url: String,
}

/// Template message payload forwarded to the upstream send endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMessage {
    /// Recipient openid
    pub touser: String,
    /// Template identifier registered with the platform
    pub template_id: String,
    /// Optional click-through URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Optional mini-program jump target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miniprogram: Option<Value>,
    /// Template field values
    pub data: Value,
}

impl WechatClient {
    /// Creates a client against the given API base (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetches an access token for an app id/secret pair.
    ///
    /// # Errors
    /// Returns [`Error::Upstream`] if the request fails.
    pub async fn get_token(&self, appid: &str, secret: &str) -> Result<Value> {
        self.http
            .get(format!("{}/cgi-bin/token", self.base_url))
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", appid),
                ("secret", secret),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Exchanges a login `js_code` for the user's openid.
    ///
    /// # Errors
    /// Returns [`Error::Upstream`] if the request fails.
    pub async fn get_openid(&self, appid: &str, secret: &str, js_code: &str) -> Result<Value> {
        self.http
            .get(format!("{}/sns/jscode2session", self.base_url))
            .query(&[
                ("appid", appid),
                ("secret", secret),
                ("js_code", js_code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Fetches profile information for an openid.
    ///
    /// # Errors
    /// Returns [`Error::Upstream`] if the request fails.
    pub async fn get_user_info(&self, access_token: &str, openid: &str) -> Result<Value> {
        self.http
            .get(format!("{}/sns/userinfo", self.base_url))
            .query(&[
                ("access_token", access_token),
                ("openid", openid),
                ("lang", "zh_CN"),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Sends a template message, surfacing a non-zero upstream `errcode` as
    /// an error.
    ///
    /// # Errors
    /// Returns [`Error::Upstream`] on transport failure or [`Error::Wechat`]
    /// when the platform rejects the message.
    pub async fn send_template_message(
        &self,
        access_token: &str,
        message: &TemplateMessage,
    ) -> Result<Value> {
        let response: Value = self
            .http
            .post(format!("{}/cgi-bin/message/template/send", self.base_url))
            .query(&[("access_token", access_token)])
            .json(message)
            .send()
            .await?
            .json()
            .await?;

        check_errcode(response)
    }
}

/// Rejects responses whose `errcode` is present and non-zero.
fn check_errcode(response: Value) -> Result<Value> {
    let errcode = response.get("errcode").and_then(Value::as_i64).unwrap_or(0);
    if errcode == 0 {
        Ok(response)
    } else {
        let errmsg = response
            .get("errmsg")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        Err(Error::Wechat {
            message: format!("{errmsg} (errcode {errcode})"),
        })
    }
}
