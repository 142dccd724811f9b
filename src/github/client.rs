//! Authenticated GitHub REST client.
//!
//! All configuration is threaded in through [`ClientConfig`]; nothing in
//! this module reads the environment. Transient failures (5xx, 429,
//! connection errors) are retried with exponential backoff up to the
//! configured bound; everything else surfaces immediately as a structured
//! [`HttpFailure`](crate::error::HttpFailure).

use crate::error::{Error, HttpFailure, Result};
use crate::github::models::{
    Asset, NewReference, NewRelease, Reference, Release, ReleasePatch,
};
use crate::github::ReleaseApi;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio::time::Duration;
use url::Url;

/// Default API root for github.com
pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// Media type for the JSON API
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Media type requested when downloading asset content
const OCTET_STREAM: &str = "application/octet-stream";

/// Retry bound for transient failures
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    pub attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { attempts: 3 }
    }
}

impl RetryConfig {
    /// Upper bound on configurable attempts
    const MAX_ATTEMPTS: u32 = 10;

    /// Read the retry bound from `GHREL_RETRY_ATTEMPTS`, clamped to
    /// `[1, 10]`, falling back to the default on unset or unparsable input
    pub fn from_env() -> Self {
        let attempts = std::env::var("GHREL_RETRY_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .map(|v| v.clamp(1, Self::MAX_ATTEMPTS))
            .unwrap_or(Self::default().attempts);
        Self { attempts }
    }
}

/// Explicit client configuration.
///
/// Built once at the CLI boundary and handed to [`GitHubClient::new`]; the
/// core protocol never sees environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, `https://api.github.com` unless pointed at an Enterprise
    /// host
    pub api_root: Url,
    /// Bearer token; anonymous clients can still read public repositories
    pub token: Option<String>,
    /// Transient-failure retry bound
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Configuration against github.com with the given token
    pub fn new(token: Option<String>) -> Self {
        Self {
            api_root: Url::parse(DEFAULT_API_ROOT).expect("default API root is a valid URL"),
            token,
            retry: RetryConfig::default(),
        }
    }

    /// Replace the API root, e.g. for GitHub Enterprise
    pub fn with_api_root(mut self, api_root: Url) -> Self {
        self.api_root = api_root;
        self
    }

    /// Replace the retry bound
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Blocking-from-the-caller's-view REST client for releases, assets and
/// references. One instance per repository host; repository names are
/// passed per call in `owner/name` form.
pub struct GitHubClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GitHubClient {
    /// Create a client from explicit configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ghrel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Transport {
                url: config.api_root.to_string(),
                source,
            })?;
        Ok(Self { http, config })
    }

    /// Fail with [`Error::MissingToken`] unless a token is configured.
    ///
    /// Mutating commands call this up front so an unauthenticated run fails
    /// before any remote state is touched.
    pub fn require_token(&self) -> Result<()> {
        if self.config.token.is_none() {
            return Err(Error::MissingToken);
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_root.as_str().trim_end_matches('/'), path)
    }

    fn builder(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, GITHUB_JSON);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send one request, translating transport failures and non-2xx
    /// responses into [`Error`]
    async fn try_once(&self, make: &impl Fn() -> reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let request = make().build().map_err(|source| Error::Transport {
            url: "<unbuildable request>".to_string(),
            source,
        })?;

        let method = request.method().to_string();
        let url = request.url().to_string();
        let request_headers = sorted_headers(request.headers());
        let request_body = request.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| Error::Transport { url: url.clone(), source })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let response_headers = sorted_headers(response.headers());
        let body = response.bytes().await.unwrap_or_default();

        Err(Error::Http(Box::new(HttpFailure {
            method,
            url,
            request_headers,
            request_body: request_body.as_deref().map(preview),
            request_body_len: request_body.as_deref().map_or(0, <[u8]>::len),
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
            response_headers,
            response_body: preview(&body),
            response_body_len: body.len(),
        })))
    }

    /// Run a request through the bounded transient-retry loop
    async fn run(
        &self,
        operation: &str,
        make: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let max_attempts = self.config.retry.attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_once(&make).await {
                Ok(response) => {
                    if attempt > 1 {
                        log::info!("{operation} succeeded after {attempt} attempt(s)");
                    }
                    return Ok(response);
                }
                Err(err) if err.is_transient() => {
                    if attempt >= max_attempts {
                        return Err(Error::RetriesExhausted {
                            operation: operation.to_string(),
                            attempts: attempt,
                            source: Box::new(err),
                        });
                    }
                    // 1s, 2s, 4s, ... capped at 32s
                    let wait = Duration::from_secs(1 << (attempt - 1).min(5));
                    log::warn!(
                        "{operation} failed (attempt {attempt}/{max_attempts}): {err}; retrying in {}s",
                        wait.as_secs()
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|source| Error::Transport { url, source })
    }

    /// `GET /repos/{repo}/releases`
    pub async fn releases(&self, repo: &str) -> Result<Vec<Release>> {
        let url = self.endpoint(&format!("repos/{repo}/releases"));
        let response = self
            .run("list releases", || self.builder(Method::GET, &url))
            .await?;
        Self::json(response).await
    }

    /// `POST /repos/{repo}/releases`
    pub async fn create_release(&self, repo: &str, new: &NewRelease) -> Result<Release> {
        let url = self.endpoint(&format!("repos/{repo}/releases"));
        let response = self
            .run("create release", || {
                self.builder(Method::POST, &url).json(new)
            })
            .await?;
        Self::json(response).await
    }

    /// `PATCH /repos/{repo}/releases/{id}` — full replace over the supplied
    /// fields; renaming the tag implicitly creates the new reference
    pub async fn patch_release(
        &self,
        repo: &str,
        release_id: u64,
        patch: &ReleasePatch,
    ) -> Result<Release> {
        let url = self.endpoint(&format!("repos/{repo}/releases/{release_id}"));
        let response = self
            .run("patch release", || {
                self.builder(Method::PATCH, &url).json(patch)
            })
            .await?;
        Self::json(response).await
    }

    /// `DELETE /repos/{repo}/releases/{id}`
    pub async fn delete_release(&self, repo: &str, release_id: u64) -> Result<()> {
        let url = self.endpoint(&format!("repos/{repo}/releases/{release_id}"));
        self.run("delete release", || self.builder(Method::DELETE, &url))
            .await?;
        Ok(())
    }

    /// `GET /repos/{repo}/git/refs`
    pub async fn refs(&self, repo: &str) -> Result<Vec<Reference>> {
        let url = self.endpoint(&format!("repos/{repo}/git/refs"));
        let response = self
            .run("list refs", || self.builder(Method::GET, &url))
            .await;
        match response {
            Ok(response) => Self::json(response).await,
            // A repository with no refs at all answers 404 here
            Err(Error::Http(failure)) if failure.status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// `POST /repos/{repo}/git/refs`
    pub async fn create_ref(&self, repo: &str, reference: &NewReference) -> Result<Reference> {
        let url = self.endpoint(&format!("repos/{repo}/git/refs"));
        let response = self
            .run("create ref", || {
                self.builder(Method::POST, &url).json(reference)
            })
            .await?;
        Self::json(response).await
    }

    /// `DELETE /repos/{repo}/git/{ref}`
    pub async fn delete_ref(&self, repo: &str, ref_name: &str) -> Result<()> {
        let url = self.endpoint(&format!("repos/{repo}/git/{ref_name}"));
        self.run("delete ref", || self.builder(Method::DELETE, &url))
            .await?;
        Ok(())
    }

    /// Upload an asset through the release's upload endpoint.
    ///
    /// Callers are expected to have checked for a name collision first; the
    /// remote answers 422 for duplicate names.
    pub async fn upload_asset(
        &self,
        release: &Release,
        file_name: &str,
        content: Bytes,
    ) -> Result<Asset> {
        let url = format!("{}?name={}", release.upload_endpoint(), file_name);
        let response = self
            .run("upload asset", || {
                self.builder(Method::POST, &url)
                    .header(CONTENT_TYPE, OCTET_STREAM)
                    .body(content.clone())
            })
            .await?;
        Self::json(response).await
    }

    /// `GET /repos/{repo}/releases/assets/{id}` with an octet-stream
    /// accept header, following the storage redirect
    pub async fn download_asset(&self, repo: &str, asset_id: u64) -> Result<Bytes> {
        let url = self.endpoint(&format!("repos/{repo}/releases/assets/{asset_id}"));
        let response = self
            .run("download asset", || {
                self.builder(Method::GET, &url).header(ACCEPT, OCTET_STREAM)
            })
            .await?;
        let url = response.url().to_string();
        response
            .bytes()
            .await
            .map_err(|source| Error::Transport { url, source })
    }

    /// `DELETE /repos/{repo}/releases/assets/{id}`
    pub async fn delete_asset(&self, repo: &str, asset_id: u64) -> Result<()> {
        let url = self.endpoint(&format!("repos/{repo}/releases/assets/{asset_id}"));
        self.run("delete asset", || self.builder(Method::DELETE, &url))
            .await?;
        Ok(())
    }
}

impl ReleaseApi for GitHubClient {
    async fn releases(&self, repo: &str) -> Result<Vec<Release>> {
        GitHubClient::releases(self, repo).await
    }

    async fn patch_release(
        &self,
        repo: &str,
        release_id: u64,
        patch: &ReleasePatch,
    ) -> Result<Release> {
        GitHubClient::patch_release(self, repo, release_id, patch).await
    }

    async fn refs(&self, repo: &str) -> Result<Vec<Reference>> {
        GitHubClient::refs(self, repo).await
    }

    async fn delete_ref(&self, repo: &str, ref_name: &str) -> Result<()> {
        GitHubClient::delete_ref(self, repo, ref_name).await
    }
}

fn sorted_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    let mut collected: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| {
            let value = if name.as_str() == reqwest::header::AUTHORIZATION.as_str() {
                "<redacted>".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.as_str().to_string(), value)
        })
        .collect();
    collected.sort();
    collected
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(HttpFailure::BODY_PREVIEW).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_config_defaults_to_three_attempts() {
        assert_eq!(RetryConfig::default().attempts, 3);
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = GitHubClient::new(ClientConfig::new(None)).expect("client");
        assert_eq!(
            client.endpoint("repos/o/r/releases"),
            "https://api.github.com/repos/o/r/releases"
        );
    }

    #[test]
    fn enterprise_root_is_respected() {
        let config = ClientConfig::new(None)
            .with_api_root(Url::parse("https://ghe.example.com/api/v3/").expect("url"));
        let client = GitHubClient::new(config).expect("client");
        assert_eq!(
            client.endpoint("repos/o/r/git/refs"),
            "https://ghe.example.com/api/v3/repos/o/r/git/refs"
        );
    }

    #[test]
    fn missing_token_is_rejected_for_mutations() {
        let client = GitHubClient::new(ClientConfig::new(None)).expect("client");
        assert!(matches!(client.require_token(), Err(Error::MissingToken)));
        let client =
            GitHubClient::new(ClientConfig::new(Some("t0ken".into()))).expect("client");
        assert!(client.require_token().is_ok());
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(500);
        assert_eq!(preview(body.as_bytes()).len(), HttpFailure::BODY_PREVIEW);
        assert_eq!(preview(b"short"), "short");
    }
}
