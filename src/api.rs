// API client module: a small blocking HTTP client that talks to the
// Immich server. Every call is one synchronous request; nothing is
// retried, so the first failure surfaces to the caller.

use crate::config::Config;
use crate::plan::Body;
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Placeholder shown in errors for requests sent without a body.
pub const EMPTY_BODY: &str = "<empty>";

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// The seam between request building and the network. The real client
/// is `reqwest::blocking::Client`; tests plug in an in-memory server.
pub trait Transport {
    fn send(&self, request: Request) -> reqwest::Result<RawResponse>;
}

impl Transport for Client {
    fn send(&self, request: Request) -> reqwest::Result<RawResponse> {
        let response = self.execute(request)?;
        let status = response.status();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}

/// A non-2xx answer, with everything an operator needs to see why.
#[derive(Debug, Clone, Error)]
#[error(
    "API error: {method} {url}\nStatus: {} {}\nRequest body: {request_body}\nResponse body: {response_body}",
    .status.as_u16(),
    .status.canonical_reason().unwrap_or("Unknown")
)]
pub struct ApiError {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub request_body: String,
    pub response_body: String,
}

/// Holds the transport, the server root and the API key.
#[derive(Clone)]
pub struct ApiClient<T = Client> {
    transport: T,
    base_url: String,
    api_key: String,
}

impl ApiClient<Client> {
    /// Build a client backed by a real reqwest connection pool.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient::with_transport(client, &config.server, &config.api_key))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T, base_url: &str, api_key: &str) -> Self {
        ApiClient {
            transport,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build an authenticated request. The JSON content type is only set
    /// when a body is attached.
    pub fn build_request(&self, method: Method, path: &str, body: Option<&Body>) -> Result<Request> {
        let url = Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("invalid request URL {}{}", self.base_url, path))?;
        let mut request = Request::new(method, url);
        let key = HeaderValue::from_str(&self.api_key).context("API key is not a valid header value")?;
        request.headers_mut().insert(API_KEY_HEADER, key);
        if let Some(body) = body {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(body.get().to_owned().into());
        }
        Ok(request)
    }

    /// Perform a request and return the raw response body on a 2xx status.
    pub fn execute(&self, method: Method, path: &str, body: Option<&Body>) -> Result<String> {
        let request = self.build_request(method.clone(), path, body)?;
        let url = request.url().to_string();
        tracing::debug!(%method, %url, "sending request");

        let response = self
            .transport
            .send(request)
            .with_context(|| format!("performing request {method} {url}"))?;

        if !response.status.is_success() {
            return Err(ApiError {
                method,
                url,
                status: response.status,
                request_body: body.map_or_else(|| EMPTY_BODY.to_owned(), |b| b.get().to_owned()),
                response_body: response.body,
            }
            .into());
        }
        Ok(response.body)
    }

    /// Perform a request and decode the JSON response into `R`.
    pub fn call<R: DeserializeOwned>(&self, method: Method, path: &str, body: Option<&Body>) -> Result<R> {
        let text = self.execute(method.clone(), path, body)?;
        serde_json::from_str(&text).with_context(|| {
            format!("decoding response from {method} {path}\nResponse body: {text}")
        })
    }

    pub fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.call(Method::GET, path, None)
    }

    /// Serialize `payload` as the request body and decode the response.
    pub fn send_json<B, R>(&self, method: Method, path: &str, payload: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = Body::from_value(payload).context("encoding request body")?;
        self.call(method, path, Some(&body))
    }
}
