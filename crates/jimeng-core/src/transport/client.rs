//! Signed HTTP client for the upstream web API
//!
//! Every call carries the browser header set, a cookie built from the
//! caller's session token, and a `Sign` header derived from the request path
//! and the device time. Response bodies are decoded here and their envelope
//! mapped to typed errors.

use std::time::Duration;

use reqwest::header::{CONTENT_ENCODING, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, Method};
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, GenerationConfig, UpstreamConfig};
use crate::error::{Error, Result};
use crate::identity::{DeviceIdentity, unix_timestamp};

use super::decode::decode_body;
use super::envelope;
use super::sign::request_sign;

/// Browser header set sent with every request
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json, text/plain, */*"),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("Accept-Language", "zh-CN,zh;q=0.9"),
    ("Cache-Control", "no-cache"),
    ("Last-Event-Id", "undefined"),
    ("Pragma", "no-cache"),
    ("Priority", "u=1, i"),
    (
        "Sec-Ch-Ua",
        "\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"",
    ),
    ("Sec-Ch-Ua-Mobile", "?0"),
    ("Sec-Ch-Ua-Platform", "\"Windows\""),
    ("Sec-Fetch-Dest", "empty"),
    ("Sec-Fetch-Mode", "cors"),
    ("Sec-Fetch-Site", "same-origin"),
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    ),
];

/// Cookie fields that all carry the session token
const SESSION_COOKIE_FIELDS: &[&str] = &["sessionid", "sessionid_ss", "sid_tt", "uid_tt", "uid_tt_ss"];

/// Signature scheme version
const SIGN_VERSION: &str = "1";

/// A single call against the upstream service
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub uri: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Create a request with the given method and path
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Create a POST request
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Add a query parameter (overrides a default of the same name)
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the JSON body
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header (overrides a default of the same name)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Client for the upstream web API
///
/// Cheap to clone; clones share the connection pool. Holds no credential:
/// the session token is passed into every call.
#[derive(Clone)]
pub struct JimengClient {
    http_client: HttpClient,
    upstream: UpstreamConfig,
    generation: GenerationConfig,
    identity: DeviceIdentity,
}

impl std::fmt::Debug for JimengClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JimengClient")
            .field("base_url", &self.upstream.base_url)
            .field("web_id", &self.identity.web_id)
            .finish()
    }
}

/// Builder for JimengClient
pub struct JimengClientBuilder {
    upstream: Option<UpstreamConfig>,
    generation: Option<GenerationConfig>,
    identity: Option<DeviceIdentity>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for JimengClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JimengClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            upstream: None,
            generation: None,
            identity: None,
            base_url: None,
            timeout_secs: None,
        }
    }

    /// Set the upstream configuration
    pub fn config(mut self, config: UpstreamConfig) -> Self {
        self.upstream = Some(config);
        self
    }

    /// Set the generation configuration (poll cadence, defaults)
    pub fn generation(mut self, config: GenerationConfig) -> Self {
        self.generation = Some(config);
        self
    }

    /// Use a fixed device identity instead of generating one
    pub fn identity(mut self, identity: DeviceIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the base URL (defaults to the upstream host)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the JimengClient
    pub fn build(self) -> Result<JimengClient> {
        let mut upstream = self.upstream.unwrap_or_default();
        if upstream.session_token.is_some() {
            return Err(Error::ConfigError(
                "session tokens are passed per call, not stored in the client".to_string(),
            ));
        }
        if let Some(url) = self.base_url {
            upstream.base_url = url;
        }
        upstream.base_url = upstream.base_url.trim_end_matches('/').to_string();
        if upstream.base_url.is_empty() {
            return Err(Error::ConfigError("base URL must not be empty".to_string()));
        }
        if let Some(secs) = self.timeout_secs {
            upstream.timeout_secs = secs;
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(upstream.timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(JimengClient {
            http_client,
            upstream,
            generation: self.generation.unwrap_or_default(),
            identity: self.identity.unwrap_or_else(DeviceIdentity::generate),
        })
    }
}

impl JimengClient {
    /// Create a client with default configuration and a fresh identity
    pub fn new() -> Result<Self> {
        JimengClientBuilder::new().build()
    }

    /// Create a new builder
    pub fn builder() -> JimengClientBuilder {
        JimengClientBuilder::new()
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        JimengClientBuilder::new()
            .config(config.upstream.clone())
            .generation(config.generation.clone())
            .build()
    }

    pub fn upstream_config(&self) -> &UpstreamConfig {
        &self.upstream
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Referer used by the image generation page
    pub(crate) fn generate_page_referer(&self) -> String {
        format!("{}/ai-tool/image/generate", self.upstream.base_url)
    }

    /// Perform one authenticated call and return the envelope payload
    pub async fn request(&self, request: UpstreamRequest, token: &str) -> Result<Value> {
        let device_time = unix_timestamp();
        let sign = request_sign(
            &request.uri,
            &self.upstream.platform_code,
            &self.upstream.version_code,
            device_time,
        );
        let headers = self.build_headers(token, device_time, &sign, &request.headers)?;
        let query = merge_query(self.default_query(), request.query);
        let url = format!("{}{}", self.upstream.base_url, request.uri);

        debug!(method = %request.method, uri = %request.uri, "Sending upstream request");

        let mut builder = self
            .http_client
            .request(request.method, &url)
            .headers(headers)
            .query(&query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(Error::NetworkError)?;

        let status = response.status();
        let encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(Error::NetworkError)?;

        debug!(uri = %request.uri, status = status.as_u16(), "Upstream responded");

        let text = decode_body(encoding.as_deref(), &bytes);
        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            Error::request_failed(format!(
                "Malformed response from {} (HTTP {}): {}",
                request.uri, status, e
            ))
        })?;

        envelope::interpret(parsed)
    }

    /// Shorthand for a POST with a JSON body
    pub async fn post(&self, uri: &str, body: Value, token: &str) -> Result<Value> {
        self.request(UpstreamRequest::post(uri).with_json(body), token)
            .await
    }

    fn default_query(&self) -> Vec<(String, String)> {
        vec![
            ("aid".to_string(), self.upstream.assistant_id.clone()),
            ("device_platform".to_string(), "web".to_string()),
            ("region".to_string(), self.upstream.region.clone()),
            ("web_id".to_string(), self.identity.web_id.to_string()),
        ]
    }

    fn build_headers(
        &self,
        token: &str,
        device_time: i64,
        sign: &str,
        overrides: &[(String, String)],
    ) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in BROWSER_HEADERS {
            headers.insert(*name, HeaderValue::from_static(*value));
        }

        let origin = self.upstream.base_url.as_str();
        insert_header(&mut headers, "Appid", &self.upstream.assistant_id)?;
        insert_header(&mut headers, "Appvr", &self.upstream.version_code)?;
        insert_header(&mut headers, "Pf", &self.upstream.platform_code)?;
        insert_header(&mut headers, "Origin", origin)?;
        insert_header(&mut headers, "Referer", origin)?;

        let cookie = session_cookie(token);
        let mut cookie_value = HeaderValue::from_str(&cookie).map_err(|_| {
            Error::invalid_params("session token contains characters not allowed in a cookie")
        })?;
        cookie_value.set_sensitive(true);
        headers.insert("Cookie", cookie_value);

        insert_header(&mut headers, "Device-Time", &device_time.to_string())?;
        insert_header(&mut headers, "Sign", sign)?;
        insert_header(&mut headers, "Sign-Ver", SIGN_VERSION)?;

        for (name, value) in overrides {
            insert_header(&mut headers, name, value)?;
        }
        Ok(headers)
    }
}

/// Cookie header value repeating the token over every session field
pub fn session_cookie(token: &str) -> String {
    SESSION_COOKIE_FIELDS
        .iter()
        .map(|field| format!("{}={}", field, token))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Merge caller query parameters over the defaults; caller values win
fn merge_query(
    mut defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
) -> Vec<(String, String)> {
    for (key, value) in overrides {
        match defaults.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => defaults.push((key, value)),
        }
    }
    defaults
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::invalid_params(format!("Invalid header name: {}", name)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_params(format!("Invalid value for header {}", name)))?;
    headers.insert(name, value);
    Ok(())
}
