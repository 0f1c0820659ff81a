use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use thiserror::Error;

use crate::config::{FetchMode, ScrapeConfig};

pub type PageContent = String;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("render API error (status {status}): {message}")]
    Render { status: u16, message: String },
}

impl FetchError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else {
            FetchError::Network { url: url.to_string(), message: err.to_string() }
        }
    }

    /// Timeouts, connection errors and 5xx responses are retried; everything
    /// else fails the URL immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Network { .. } => true,
            FetchError::HttpStatus { status, .. } => *status >= 500,
            FetchError::Render { status, .. } => *status >= 500,
        }
    }
}

/// Minimum inter-request delay, per client instance. `reserve` is pure over
/// an injected instant so pacing is testable without wall-clock sleeps.
pub struct RateLimiter {
    min_delay: Duration,
    next_allowed: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        RateLimiter { min_delay, next_allowed: None }
    }

    /// How long a request arriving at `now` must wait, advancing the
    /// next-allowed mark past this request.
    pub fn reserve(&mut self, now: Instant) -> Duration {
        let wait = match self.next_allowed {
            Some(t) if t > now => t - now,
            _ => Duration::ZERO,
        };
        self.next_allowed = Some(now + wait + self.min_delay);
        wait
    }

    pub async fn pace(&mut self) {
        let wait = self.reserve(Instant::now());
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Round-robin over a fixed set of browser-like User-Agent strings.
pub struct AgentRotation {
    idx: usize,
}

impl AgentRotation {
    pub fn new() -> Self {
        AgentRotation { idx: 0 }
    }

    pub fn next(&mut self) -> &'static str {
        let ua = USER_AGENTS[self.idx % USER_AGENTS.len()];
        self.idx = self.idx.wrapping_add(1);
        ua
    }
}

/// Client for a Browserless-style /content endpoint that returns the
/// rendered DOM for a URL. Acquired once per adapter, released when the
/// adapter is dropped.
pub struct RenderClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RenderClient {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build render HTTP client")?;
        Ok(RenderClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    /// Fetch fully-rendered HTML, waiting for the DOM up to the client
    /// timeout.
    pub async fn content(&self, url: &str) -> Result<PageContent, FetchError> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = serde_json::json!({
            "url": url,
            "gotoOptions": { "waitUntil": "domcontentloaded" },
        });

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FetchError::Render { status: status.as_u16(), message });
        }

        resp.text().await.map_err(|e| FetchError::from_reqwest(url, e))
    }
}

/// Issues single page fetches with pacing, retries and header rotation.
/// One instance per adapter; the pacing state is not shared across sites.
pub struct FetchClient {
    client: reqwest::Client,
    limiter: RateLimiter,
    agents: AgentRotation,
    rotate_user_agent: bool,
    max_retries: u32,
    renderer: Option<RenderClient>,
}

impl FetchClient {
    pub fn new(cfg: &ScrapeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(FetchClient {
            client,
            limiter: RateLimiter::new(cfg.delay_between_requests),
            agents: AgentRotation::new(),
            rotate_user_agent: cfg.rotate_user_agent,
            max_retries: cfg.max_retries.max(1),
            renderer: None,
        })
    }

    /// A client for a rendered_browser site. Fails (adapter setup error)
    /// when no renderer endpoint is configured.
    pub fn with_renderer(cfg: &ScrapeConfig) -> Result<Self> {
        let Some(base_url) = cfg.renderer_url.as_deref() else {
            bail!("rendered_browser site requires BROWSERLESS_URL");
        };
        let renderer = RenderClient::new(base_url, cfg.renderer_token.as_deref(), cfg.timeout)?;
        let mut client = Self::new(cfg)?;
        client.renderer = Some(renderer);
        Ok(client)
    }

    pub async fn fetch(&mut self, url: &str, mode: FetchMode) -> Result<PageContent, FetchError> {
        let mut last_err = None;
        for _ in 0..self.max_retries {
            self.limiter.pace().await;
            match self.fetch_once(url, mode).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() => {
                    tracing::debug!("transient fetch failure for {}: {}", url, e);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.expect("at least one attempt"))
    }

    async fn fetch_once(&mut self, url: &str, mode: FetchMode) -> Result<PageContent, FetchError> {
        match mode {
            FetchMode::RenderedBrowser => match self.renderer {
                Some(ref renderer) => renderer.content(url).await,
                None => Err(FetchError::Render {
                    status: 0,
                    message: "no render session for this client".to_string(),
                }),
            },
            FetchMode::PlainHttp => {
                let mut req = self.client.get(url);
                if self.rotate_user_agent {
                    req = req
                        .header("User-Agent", self.agents.next())
                        .header(
                            "Accept",
                            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
                        )
                        .header("Accept-Language", "pt-BR,pt;q=0.8,en;q=0.6")
                        .header("Accept-Encoding", "gzip, deflate");
                }
                let resp = req.send().await.map_err(|e| FetchError::from_reqwest(url, e))?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::HttpStatus { status: status.as_u16(), url: url.to_string() });
                }
                resp.text().await.map_err(|e| FetchError::from_reqwest(url, e))
            }
        }
    }
}
