// HTTP client for the Parish API: the Rust counterpart of the frontend
// service layer. Every mutating call validates its payload locally before
// any network I/O, attaches a bearer token, and retries exactly once
// after re-authenticating on a 401.
pub mod requests;

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationReport;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("validation failed: {0:?}")]
    Validation(HashMap<String, String>),

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("not authenticated and no credentials available")]
    MissingCredentials,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<ValidationReport> for ClientError {
    fn from(report: ValidationReport) -> Self {
        ClientError::Validation(report.errors)
    }
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
    credentials: Option<(String, String)>,
    dev_login: bool,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            token: None,
            credentials: None,
            dev_login: false,
        }
    }

    /// Development-only constructor: with no stored token and no
    /// credentials, a synthetic `dev-token-*` is minted on first use.
    /// A production server rejects these tokens outright.
    pub fn with_dev_login(base_url: impl Into<String>) -> Self {
        Self { dev_login: true, ..Self::new(base_url) }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.credentials = Some((username.into(), password.into()));
    }

    /// Connectivity probe, capped at 5 seconds
    pub async fn probe(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).timeout(Duration::from_secs(5)).send().await?;
        Ok(response.status().is_success())
    }

    /// Authenticate and store the token plus credentials for re-login
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Value, ClientError> {
        let url = format!("{}/api/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        self.token = body["data"]["token"].as_str().map(str::to_string);
        self.credentials = Some((username.to_string(), password.to_string()));
        Ok(body["data"].clone())
    }

    /// Anonymous GET (token attached when present, no auth requirement)
    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let response = self.send_once(Method::GET, path, None).await?;
        Self::parse(response).await
    }

    pub async fn authed_get(&mut self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&mut self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&mut self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::DELETE, path, None).await
    }

    async fn ensure_token(&mut self) -> Result<(), ClientError> {
        if self.token.is_some() {
            return Ok(());
        }
        if let Some((username, password)) = self.credentials.clone() {
            self.login(&username, &password).await?;
            return Ok(());
        }
        if self.dev_login {
            self.token = Some(format!("dev-token-{}", Uuid::new_v4()));
            return Ok(());
        }
        Err(ClientError::MissingCredentials)
    }

    async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        self.ensure_token().await?;

        let mut response = self.send_once(method.clone(), path, body).await?;

        // One re-login retry on an expired or revoked token, then surface
        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some((username, password)) = self.credentials.clone() {
                self.token = None;
                self.login(&username, &password).await?;
                response = self.send_once(method, path, body).await?;
            }
        }

        Self::parse(response).await
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await
    }

    async fn parse(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }
        Ok(body)
    }

    fn status_error(status: StatusCode, body: &Value) -> ClientError {
        let message = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"))
            .to_string();
        ClientError::Status { status: status.as_u16(), message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dev_login_mints_synthetic_token() {
        let mut client = ApiClient::with_dev_login("http://127.0.0.1:9");
        client.ensure_token().await.unwrap();
        assert!(client.token().unwrap().starts_with("dev-token-"));
    }

    #[tokio::test]
    async fn without_dev_login_missing_credentials_fail_before_io() {
        let mut client = ApiClient::new("http://127.0.0.1:9");
        let err = client.post("/api/notifications", &json!({})).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingCredentials));
    }
}
