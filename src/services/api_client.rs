use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Thin wrapper over one shared `reqwest::Client` pointed at the REST backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a request, attaching `Authorization: Bearer` when a token is given.
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match token {
            Some(token) => req.headers(bearer_headers(token)),
            None => req,
        }
    }

    /// Sends `req` and decodes a JSON body.
    pub async fn json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let resp = send_checked(req, fallback).await?;
        resp.json::<T>().await.map_err(|e| {
            warn!("Backend JSON decode failed: {}", e);
            ApiError::Decode(e.to_string())
        })
    }

    /// Sends `req` and ignores whatever body comes back.
    pub async fn empty(&self, req: RequestBuilder, fallback: &str) -> Result<(), ApiError> {
        send_checked(req, fallback).await.map(|_| ())
    }
}

fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
        headers.insert(AUTHORIZATION, value);
    }
    headers
}

async fn send_checked(req: RequestBuilder, fallback: &str) -> Result<reqwest::Response, ApiError> {
    let resp = req.send().await.map_err(|e| {
        warn!("Backend unreachable: {}", e);
        ApiError::Transport(e.to_string())
    })?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = error_message(status, &body, fallback);
    debug!("Backend returned {}: {}", status, message);
    Err(ApiError::server(status, message))
}

/// Picks the most useful human-readable message out of an error response.
///
/// Prefers a JSON `message` field, then a plain-text body, then `fallback`.
/// A 403 without a message gets a fixed access-denied text.
pub(crate) fn error_message(status: StatusCode, body: &str, fallback: &str) -> String {
    let body = body.trim();

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::trim)
            .filter(|m| !m.is_empty())
        {
            return msg.to_string();
        }
        if let Some(msg) = value.as_str().map(str::trim).filter(|m| !m.is_empty()) {
            return msg.to_string();
        }
    } else if !body.is_empty() && !body.starts_with('<') {
        return body.to_string();
    }

    if status == StatusCode::FORBIDDEN {
        return "Access denied: you do not have permission for this action.".to_string();
    }
    fallback.to_string()
}
