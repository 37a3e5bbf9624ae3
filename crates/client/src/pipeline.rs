//! The request pipeline every backend call goes through.
//!
//! Outbound, [`ApiClient::execute`] attaches `Authorization: Bearer` from the
//! token store to authenticated requests. Inbound, success and every error
//! other than a 401 pass straight back to the caller. A 401 on an
//! authenticated request that has not been retried yet goes to the
//! [`RefreshCoordinator`], and the request is replayed once with the token
//! it hands back.

use std::sync::Arc;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::api::{AdminApi, AskApi, AuthApi, ItemApi, SellerApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::navigator::LoginNavigator;
use crate::refresh::RefreshCoordinator;
use crate::request::ApiRequest;
use crate::session::TokenStore;

/// Authenticated HTTP client for the marketplace backend.
///
/// Cheap to clone; clones share the connection pool, the token store and
/// the refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<dyn TokenStore>,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    /// Build a client with its own connection pool, applying the configured
    /// transport timeout to every call.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn LoginNavigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_http_client(http, config, store, navigator)
    }

    /// Build a client reusing an existing [`reqwest::Client`].
    pub fn with_http_client(
        http: reqwest::Client,
        config: &ClientConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn LoginNavigator>,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ClientError::Config(format!("invalid API URL '{}': {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "API URL cannot be a base: {}",
                config.api_url
            )));
        }

        let refresh_url = join_path(&base_url, &config.refresh_path)?;
        let refresh = RefreshCoordinator::new(
            http.clone(),
            refresh_url,
            store.clone(),
            navigator,
            config.login_path.clone(),
            config.rotate_refresh_token,
        );

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                store,
                refresh,
            }),
        })
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.inner.store.as_ref()
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn items(&self) -> ItemApi {
        ItemApi::new(self.clone())
    }

    pub fn seller(&self) -> SellerApi {
        SellerApi::new(self.clone())
    }

    pub fn admin(&self) -> AdminApi {
        AdminApi::new(self.clone())
    }

    pub fn ask(&self) -> AskApi {
        AskApi::new(self.clone())
    }

    /// Send `request` through the pipeline and return the successful
    /// response.
    ///
    /// Transport errors and non-401 failures are returned unchanged. A 401
    /// is recovered at most once per request.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<reqwest::Response, ClientError> {
        let sent_with = if request.authenticated {
            self.inner.store.access_token()
        } else {
            None
        };

        let response = self.send_once(&request, sent_with.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED
            || !request.authenticated
            || request.retried
        {
            return ensure_success(response).await;
        }

        let original = ensure_success(response)
            .await
            .err()
            .unwrap_or_else(|| ClientError::Unauthorized {
                message: String::new(),
            });

        request.mark_retried();
        let token = self
            .inner
            .refresh
            .recover(sent_with.as_deref(), original)
            .await?;

        tracing::debug!(request = %request.label(), "Replaying request with refreshed token");
        let response = self.send_once(&request, Some(&token)).await?;
        ensure_success(response).await
    }

    /// Execute and decode the JSON body. An empty body decodes as `null`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        let body = response.bytes().await?;
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        Ok(serde_json::from_slice(body)?)
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let builder = request.build(&self.inner.http, &self.inner.base_url, token)?;
        let response = builder.send().await.map_err(|e| {
            tracing::debug!(request = %request.label(), error = %e, "Transport error");
            ClientError::Transport(e)
        })?;
        tracing::debug!(
            request = %request.label(),
            status = response.status().as_u16(),
            retried = request.retried,
            "Response received",
        );
        Ok(response)
    }
}

/// Pass 2xx responses through; turn anything else into a [`ClientError`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(status = status.as_u16(), error = %e, "Failed to read error body");
            Default::default()
        }
    };
    let message = error_message(&body);
    if status == StatusCode::UNAUTHORIZED {
        Err(ClientError::Unauthorized { message })
    } else {
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// The backend's `message` (or `error`) field, else the raw body text.
pub(crate) fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(serde_json::Value::as_str) {
                return msg.to_owned();
            }
        }
    }
    String::from_utf8_lossy(body).trim().to_owned()
}

/// Append a `/`-separated path to `base`.
fn join_path(base: &Url, path: &str) -> Result<Url, ClientError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    ApiRequest::post(&segments).url(base)
}
