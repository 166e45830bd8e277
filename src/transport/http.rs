use crate::config::ClientConfig;
use crate::interceptors::{InterceptorPipeline, RequestContext};
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::error::ApiError;

/// Body of an outbound request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Single binary part under `field`.
    Multipart {
        field: String,
        bytes: Bytes,
        file_name: String,
        mime: String,
    },
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub query: Vec<(String, String)>,
    /// Overrides the client-wide timeout for this request.
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Successful (2xx) response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// The single point of outbound HTTP traffic.
///
/// Requests are credentialed: a cookie store carries the session cookie
/// between calls. No retries happen here.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    pipeline: InterceptorPipeline,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, pipeline: InterceptorPipeline) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("pronounce-client/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                "failed to build HTTP client",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("transport"),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            pipeline,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request. Any non-2xx response or network failure becomes an
    /// [`ApiError`] after the interceptor failure stage has run.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        config: RequestConfig,
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method.clone(), &url);

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(timeout) = config.timeout {
            req = req.timeout(timeout);
        }

        req = match body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(&value),
            RequestBody::Multipart {
                field,
                bytes,
                file_name,
                mime,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| {
                        Error::runtime_with_context(
                            format!("invalid content type '{}'", mime),
                            ErrorContext::new()
                                .with_field_path("request.body.mime")
                                .with_details(e.to_string())
                                .with_source("transport"),
                        )
                    })?;
                req.multipart(Form::new().part(field, part))
            }
        };

        let ctx = RequestContext::new(method, path);
        let response = self
            .pipeline
            .execute(&ctx, || async move {
                let resp = req.send().await.map_err(|e| ApiError::from_transport(&e))?;
                let status = resp.status().as_u16();
                let headers = resp.headers().clone();
                let body = resp.bytes().await.map_err(|e| ApiError::from_transport(&e))?;
                if !(200..300).contains(&status) {
                    return Err(ApiError::from_response(status, &body));
                }
                Ok((
                    status,
                    RawResponse {
                        status,
                        headers,
                        body,
                    },
                ))
            })
            .await?;

        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, config: RequestConfig) -> Result<T> {
        self.send(Method::GET, path, RequestBody::Empty, config)
            .await?
            .json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(
            Method::POST,
            path,
            RequestBody::json(body)?,
            RequestConfig::default(),
        )
        .await?
        .json()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(
            Method::PUT,
            path,
            RequestBody::json(body)?,
            RequestConfig::default(),
        )
        .await?
        .json()
    }

    /// Send and discard the response body.
    pub async fn execute(&self, method: Method, path: &str, body: RequestBody) -> Result<()> {
        self.send(method, path, body, RequestConfig::default())
            .await
            .map(|_| ())
    }
}
