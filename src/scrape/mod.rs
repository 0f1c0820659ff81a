use anyhow::Result;
use async_trait::async_trait;

use crate::config::{FetchMode, ScrapeConfig, SiteProfile};
use crate::fetch::{FetchClient, FetchError, PageContent};
use crate::telemetry;

pub mod generic;
pub mod reclame_aqui;
pub mod select;
pub mod trustpilot;
pub mod types;

use types::{Candidate, RawRecord};

/// Capability contract every site implements. Variants differ only in
/// selector strategy and discovery-URL construction; the pipeline step is
/// identical, so the orchestrator treats all sites uniformly.
#[async_trait]
pub trait SiteAdapter: Send {
    fn profile(&self) -> &SiteProfile;

    /// URLs visited per unit of the max_pages budget.
    fn per_page_fanout(&self) -> usize {
        5
    }

    async fn fetch_page(&mut self, url: &str) -> Result<PageContent, FetchError>;

    /// Collect candidate item URLs for the search terms. Returns a
    /// deduplicated set in discovery order.
    async fn discover_urls(&mut self, terms: &[String]) -> Result<Vec<Candidate>>;

    /// Extract the raw field set from a fetched page. Missing fields come
    /// back empty, never as errors.
    fn extract(&self, page: &PageContent) -> RawRecord;

    /// Discovery followed by bounded extraction: at most
    /// `max_pages × per_page_fanout` URLs are visited, each paced through
    /// the fetch client; individual page failures are skipped.
    async fn scrape(&mut self, terms: &[String], max_pages: usize) -> Result<Vec<RawRecord>> {
        let log = telemetry::run();
        let candidates = self.discover_urls(terms).await?;
        let budget = max_pages.saturating_mul(self.per_page_fanout());
        log.info(format!(
            "{}: {} candidate URLs, visiting up to {}",
            self.profile().name,
            candidates.len(),
            budget
        ));

        let mut records = Vec::new();
        for cand in candidates.into_iter().take(budget) {
            let page = match self.fetch_page(&cand.url).await {
                Ok(p) => p,
                Err(e) => {
                    log.warn(format!("skipping {}: {}", cand.url, e));
                    continue;
                }
            };
            let mut rec = self.extract(&page);
            if rec.is_empty() {
                continue;
            }
            rec.source_url = cand.url;
            records.push(rec);
        }
        Ok(records)
    }
}

/// Adapter registry, keyed by site name; unknown sites get the generic
/// fallback. Construction acquires the fetch client (and render session for
/// rendered sites) — a failure here is a site-level setup error.
pub fn adapter_for(profile: &SiteProfile, cfg: &ScrapeConfig) -> Result<Box<dyn SiteAdapter>> {
    match profile.name.as_str() {
        "reclame_aqui" => Ok(Box::new(reclame_aqui::ReclameAqui::new(profile.clone(), cfg)?)),
        "trustpilot" => Ok(Box::new(trustpilot::Trustpilot::new(profile.clone(), cfg)?)),
        _ => Ok(Box::new(generic::GenericSite::new(profile.clone(), cfg)?)),
    }
}

/// Fetch client matching the profile's fetch mode. Rendered sites fail here
/// when no renderer endpoint is configured.
pub(crate) fn client_for(profile: &SiteProfile, cfg: &ScrapeConfig) -> Result<FetchClient> {
    match profile.fetch_mode {
        FetchMode::RenderedBrowser => FetchClient::with_renderer(cfg),
        FetchMode::PlainHttp => FetchClient::new(cfg),
    }
}
