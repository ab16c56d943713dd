use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, LOCATION,
};
use reqwest::{Client, Proxy, Response, StatusCode};
use url::Url;

use super::models::{FetchOutcome, FetchResponse, Validators};
use super::parser::inspect_feed;
use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_FEED_BYTES: usize = 10 * 1024 * 1024;
const FEED_ACCEPT: &str =
    "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.8";

/// Anything that can answer "did this feed change?" for a URL.
///
/// The run orchestrator only talks to this trait, so a check can be driven by
/// the real HTTP client or by a scripted source in tests.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch `url`, sending `validators` as conditional request headers
    async fn fetch(&self, url: &str, validators: &Validators) -> FetchOutcome;
}

/// Feed source backed by reqwest, doing conditional GETs
pub struct HttpFeedSource {
    client: Client,
    max_redirects: usize,
}

impl HttpFeedSource {
    /// Create a new feed source with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(config)?;

        Ok(Self {
            client,
            max_redirects: config.sync.max_redirects,
        })
    }

    /// Build HTTP client with optional proxy.
    /// Redirects are not followed by reqwest: permanent ones must be observed.
    fn build_client(config: &AppConfig) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(config.sync.request_timeout())
            .user_agent(config.sync.user_agent.as_str())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::none());

        if let Some(proxy) = config.sync.proxy_url.as_deref().filter(|p| !p.is_empty()) {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for feed fetching");
        }

        builder.build().map_err(Error::Http)
    }

    /// Build the headers of a conditional request
    fn build_headers(validators: &Validators) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));
        if validators.is_empty() {
            tracing::debug!("No validators stored, unconditional fetch");
        }

        if let Some(etag) = &validators.etag {
            match HeaderValue::from_str(etag) {
                Ok(value) => {
                    headers.insert(IF_NONE_MATCH, value);
                }
                Err(_) => tracing::warn!(
                    etag = %etag,
                    "Stored ETag is not a valid header value, not sent"
                ),
            }
        }
        if let Some(modified) = &validators.modified {
            match HeaderValue::from_str(modified) {
                Ok(value) => {
                    headers.insert(IF_MODIFIED_SINCE, value);
                }
                Err(_) => tracing::warn!(
                    modified = %modified,
                    "Stored Last-Modified is not a valid header value, not sent"
                ),
            }
        }
        headers
    }

    /// Issue the request, following redirects by hand
    async fn fetch_following(&self, url: &str, validators: &Validators) -> FetchOutcome {
        let mut current = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => return FetchOutcome::TransportError(format!("Invalid URL {}: {}", url, e)),
        };
        let headers = Self::build_headers(validators);
        let mut moved_to: Option<Url> = None;

        for hop in 0..=self.max_redirects {
            tracing::debug!(url = %current, hop, "Fetching feed");

            let request = self.client.get(current.clone()).headers(headers.clone());
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => return classify_error(e),
            };

            let status = response.status();
            if !is_followed_redirect(status) {
                return finish(response, moved_to).await;
            }

            let location = response.headers().get(LOCATION).and_then(|v| v.to_str().ok());
            let Some(location) = location else {
                return FetchOutcome::Unknown(format!("HTTP {} without a Location header", status));
            };
            let next = match current.join(location) {
                Ok(next) => next,
                Err(e) => {
                    return FetchOutcome::TransportError(format!(
                        "Bad redirect location {:?}: {}",
                        location, e
                    ))
                }
            };

            if matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::PERMANENT_REDIRECT) {
                tracing::info!(from = %current, to = %next, "Feed moved permanently");
                moved_to = Some(next.clone());
            } else {
                tracing::debug!(
                    from = %current,
                    to = %next,
                    status = %status,
                    "Following temporary redirect"
                );
            }
            current = next;
        }

        FetchOutcome::TransportError(format!(
            "Too many redirects (more than {})",
            self.max_redirects
        ))
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str, validators: &Validators) -> FetchOutcome {
        self.fetch_following(url, validators).await
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Turn the final response into an outcome.
///
/// A successful answer reached through a permanent redirect reports 301, so the
/// caller rewrites the stored URL.
async fn finish(response: Response, moved_to: Option<Url>) -> FetchOutcome {
    let status = response.status();
    let validators = Validators {
        modified: header_string(response.headers(), LAST_MODIFIED),
        etag: header_string(response.headers(), ETAG),
    };

    if status.is_success() {
        let body = match read_limited_bytes(response, MAX_FEED_BYTES).await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Unknown(e.to_string()),
        };
        match inspect_feed(&body) {
            Ok(summary) => tracing::debug!(
                title = summary.title.as_deref().unwrap_or("(no title)"),
                entries = summary.entries,
                "Feed parsed"
            ),
            Err(e) => return FetchOutcome::TransportError(e.to_string()),
        }
    }

    let reached = status.is_success() || status == StatusCode::NOT_MODIFIED;
    let (status, redirected_to) = match moved_to {
        Some(target) if reached => (StatusCode::MOVED_PERMANENTLY, Some(target.to_string())),
        _ => (status, None),
    };

    FetchOutcome::Response(FetchResponse {
        status: status.as_u16(),
        validators,
        redirected_to,
    })
}

fn header_string(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn classify_error(err: reqwest::Error) -> FetchOutcome {
    if err.is_timeout()
        || err.is_connect()
        || err.is_request()
        || err.is_builder()
        || err.is_redirect()
    {
        FetchOutcome::TransportError(err.to_string())
    } else {
        FetchOutcome::Unknown(err.to_string())
    }
}

async fn read_limited_bytes(mut response: Response, limit: usize) -> Result<Vec<u8>> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(Error::Other(format!("Feed too large ({} bytes)", len)));
        }
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(Error::Other(format!("Feed larger than {} bytes", limit)));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
