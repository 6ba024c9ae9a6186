//! Session with one ICE instance.
//!
//! [`IceClient`] owns the HTTP session (authentication headers, root
//! URL, optional response cache) and generic request plumbing; the
//! endpoint surface lives in the sibling modules, grouped the way the
//! REST API groups them.

mod collections;
mod folders;
mod parts;
mod search;

pub use folders::EntryQuery;
pub use parts::PartScope;
pub use search::SearchQuery;

use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{Error, Result};

/// Batch size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: NonZeroU64 = NonZeroU64::new(10).unwrap();

/// Authentication modes understood by ICE.
#[derive(Debug, Clone)]
pub enum Auth {
    /// Long-lived API token issued for a named client.
    ApiToken { client_id: String, token: String },
    /// Short-lived session id obtained from a login call.
    SessionId(String),
}

impl Auth {
    fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        match self {
            Auth::ApiToken { client_id, token } => {
                headers.insert("X-ICE-API-Token-Client", HeaderValue::from_str(client_id)?);
                headers.insert("X-ICE-API-Token", HeaderValue::from_str(token)?);
            }
            Auth::SessionId(session_id) => {
                headers.insert(
                    "X-ICE-Authentication-SessionId",
                    HeaderValue::from_str(session_id)?,
                );
            }
        }
        Ok(())
    }
}

/// Settings for the in-memory GET response cache.
///
/// Caching can speed up scripts that re-read the same folders by
/// orders of magnitude, at the price of ignoring remote updates for
/// the lifetime of an entry. Eviction is moka's concern, not ours.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub capacity: u64,
    pub time_to_live: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            time_to_live: Duration::from_secs(3600),
        }
    }
}

/// Builder for [`IceClient`].
#[derive(Debug)]
pub struct IceClientBuilder {
    root: String,
    auth: Option<Auth>,
    cache: Option<CacheConfig>,
    page_size: NonZeroU64,
    timeout: Option<Duration>,
}

impl IceClientBuilder {
    /// Select an authentication mode. Without one, only endpoints the
    /// instance exposes publicly will answer.
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn api_token(self, client_id: impl Into<String>, token: impl Into<String>) -> Self {
        self.auth(Auth::ApiToken {
            client_id: client_id.into(),
            token: token.into(),
        })
    }

    pub fn session_id(self, session_id: impl Into<String>) -> Self {
        self.auth(Auth::SessionId(session_id.into()))
    }

    /// Cache GET responses in memory. Off by default.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = Some(config);
        self
    }

    /// Batch size for paginated endpoints. Smaller batches mean less
    /// data per request but more requests.
    pub fn page_size(mut self, page_size: NonZeroU64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Transport-level timeout per request. Unset means reqwest's
    /// default (no timeout).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<IceClient> {
        let root = Url::parse(self.root.trim_end_matches('/'))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(auth) = &self.auth {
            auth.apply(&mut headers)?;
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let cache = self.cache.map(|config| {
            Cache::builder()
                .max_capacity(config.capacity)
                .time_to_live(config.time_to_live)
                .build()
        });

        Ok(IceClient {
            http,
            root,
            cache,
            page_size: self.page_size,
        })
    }
}

/// Session with one ICE instance.
pub struct IceClient {
    http: reqwest::Client,
    root: Url,
    cache: Option<Cache<String, Arc<Value>>>,
    page_size: NonZeroU64,
}

impl IceClient {
    /// Start building a client for the instance at `root`, e.g.
    /// `https://ice.genomefoundry.org`.
    pub fn builder(root: impl Into<String>) -> IceClientBuilder {
        IceClientBuilder {
            root: root.into(),
            auth: None,
            cache: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }

    pub fn page_size(&self) -> NonZeroU64 {
        self.page_size
    }

    /// Absolute URL for an endpoint under `{root}/rest/`.
    fn endpoint_url(&self, endpoint: &str) -> Url {
        let mut url = self.root.clone();
        let path = format!("{}/rest/{}", url.path().trim_end_matches('/'), endpoint);
        url.set_path(&path);
        url
    }

    /// GET an endpoint and decode its JSON body, consulting the
    /// response cache if one is configured.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut url = self.endpoint_url(endpoint);
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            drop(pairs);
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(url.as_str()).await {
                tracing::trace!("cache hit for {}", url);
                return Ok(serde_json::from_value((*hit).clone())?);
            }
        }

        tracing::debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;
        let value: Value = decode_json("GET", &url, response).await?;

        if let Some(cache) = &self.cache {
            cache
                .insert(url.to_string(), Arc::new(value.clone()))
                .await;
        }
        Ok(serde_json::from_value(value)?)
    }

    /// POST a JSON body to an endpoint and decode the JSON response.
    /// Never cached.
    pub(crate) async fn post_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint);
        tracing::debug!("POST {}", url);
        let response = self.http.post(url.clone()).json(body).send().await?;
        let value: Value = decode_json("POST", &url, response).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET an endpoint serving a file rather than JSON. Never cached.
    pub(crate) async fn get_bytes(&self, endpoint: &str) -> Result<Bytes> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error("GET", &url, status, response).await);
        }
        Ok(response.bytes().await?)
    }
}

async fn decode_json(method: &'static str, url: &Url, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(method, url, status, response).await);
    }
    Ok(response.json().await?)
}

/// Non-success response body, truncated, folded into an error.
async fn api_error(
    method: &'static str,
    url: &Url,
    status: StatusCode,
    response: reqwest::Response,
) -> Error {
    const MAX_MESSAGE: usize = 500;
    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(MAX_MESSAGE).collect();
    Error::Api {
        method,
        url: url.to_string(),
        status,
        message,
    }
}
