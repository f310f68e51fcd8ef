use super::errors::{TransportError, TransportResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, trace};
use url::Url;

/// A fully built request. Header names are lower case.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpRequest {
    /// Starts a request with the `host` header taken from `url`.
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        let mut headers = BTreeMap::new();
        if let Some(host) = host_header(&url) {
            headers.insert("host".to_string(), host);
        }
        HttpRequest {
            method: method.into(),
            url,
            headers,
            body: String::new(),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response. Implementations do not
/// retry.
#[async_trait]
pub trait ApiTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse>;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(verify_ssl: bool) -> TransportResult<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .user_agent(concat!("c2client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            TransportError::invalid_request(format!("invalid HTTP method '{}'", request.method))
        })?;

        debug!(method = %method, url = %request.url, "sending request");
        trace!(body = %request.body, "request body");

        let mut builder = self.http.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        debug!(status, "received response");
        trace!(body = %body, "response body");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// `host[:port]`, with the port only when it is not the scheme default.
pub fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
