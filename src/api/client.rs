//! Configured HTTP client shared by every API module.
//!
//! [`ApiClient`] is built once from [`ClientConfig`] and handed to
//! [`super::ItemsApi`] and [`super::HistoryApi`] at construction. It owns
//! URL building, auth and correlation headers, and the mapping of failed
//! responses to [`ClientError`].

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorResponse};

/// Header carrying the client-generated request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP collaborator for the lost-and-found service.
///
/// Cheap to clone: the inner [`reqwest::Client`] is reference-counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    user_agent: String,
}

impl ApiClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the HTTP client cannot be built or
    /// the base URL cannot carry a path.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        if config.api_base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base url {} cannot carry a path",
                config.api_base_url
            )));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            token: config.api_token.clone(),
            user_agent: format!("lostfound-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path and attaches `query`.
    ///
    /// Segments are percent-encoded, so opaque ids cannot escape their path
    /// position.
    pub(crate) fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4();
        tracing::debug!(%method, path = url.path(), %request_id, "sending request");
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET` returning the raw JSON body.
    pub(crate) async fn get(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        fallback: &str,
    ) -> Result<Value, ClientError> {
        let url = self.url(segments, query);
        let response = self.request(Method::GET, url).send().await;
        Self::read(response, fallback).await
    }

    /// Request with a JSON body, returning the raw JSON body.
    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        fallback: &str,
    ) -> Result<Value, ClientError> {
        let url = self.url(segments, &[]);
        let response = self.request(method, url).json(body).send().await;
        Self::read(response, fallback).await
    }

    /// Request with a multipart body, returning the raw JSON body.
    pub(crate) async fn send_multipart(
        &self,
        method: Method,
        segments: &[&str],
        form: Form,
        fallback: &str,
    ) -> Result<Value, ClientError> {
        let url = self.url(segments, &[]);
        let response = self.request(method, url).multipart(form).send().await;
        Self::read(response, fallback).await
    }

    /// `DELETE` returning the raw JSON body (often just a confirmation).
    pub(crate) async fn delete(&self, segments: &[&str], fallback: &str) -> Result<Value, ClientError> {
        let url = self.url(segments, &[]);
        let response = self.request(Method::DELETE, url).send().await;
        Self::read(response, fallback).await
    }

    /// Checks the status and reads the body as JSON. An empty body reads as
    /// `null`.
    async fn read(response: reqwest::Result<Response>, fallback: &str) -> Result<Value, ClientError> {
        let response = response.map_err(|e| {
            tracing::warn!(error = %e, "request failed before a response");
            ClientError::from(e)
        })?;
        let status = response.status();
        let url = response.url().clone();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&bytes)
                .map(|body| body.message().to_string())
                .unwrap_or_else(|_| fallback.to_string());
            tracing::warn!(status = status.as_u16(), path = url.path(), %message, "request rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Decodes a JSON value into `T`, mapping failures to [`ClientError::Decode`].
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    Ok(serde_json::from_value(value)?)
}
