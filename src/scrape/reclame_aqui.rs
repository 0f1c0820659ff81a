use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;

use crate::config::{ScrapeConfig, SiteProfile};
use crate::fetch::{FetchClient, FetchError, PageContent};
use crate::telemetry;
use crate::util::text::clean_text;

use super::select;
use super::types::{Candidate, RawRecord};
use super::SiteAdapter;

/// Reclame Aqui: search-driven discovery, complaint pages rendered
/// client-side so the profile normally runs in rendered_browser mode.
pub struct ReclameAqui {
    profile: SiteProfile,
    client: FetchClient,
    terms_per_site: usize,
}

const LINKS_PER_TERM: usize = 10;

impl ReclameAqui {
    pub fn new(profile: SiteProfile, cfg: &ScrapeConfig) -> Result<Self> {
        let client = super::client_for(&profile, cfg)?;
        Ok(ReclameAqui { profile, client, terms_per_site: cfg.search_term_count })
    }

    /// Candidate complaint links on a search results page: the card link
    /// class first, then any href under /reclamacao/.
    pub(crate) fn candidate_links(doc: &Html, base: &str) -> Vec<String> {
        let by_class = select::links_by_selector(doc, "a.complaint-card-link", base, LINKS_PER_TERM);
        if !by_class.is_empty() {
            return by_class;
        }
        select::links_matching(doc, base, |h| h.contains("/reclamacao/"), LINKS_PER_TERM)
    }
}

#[async_trait]
impl SiteAdapter for ReclameAqui {
    fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    fn per_page_fanout(&self) -> usize {
        10
    }

    async fn fetch_page(&mut self, url: &str) -> Result<PageContent, FetchError> {
        self.client.fetch(url, self.profile.fetch_mode).await
    }

    async fn discover_urls(&mut self, terms: &[String]) -> Result<Vec<Candidate>> {
        let log = telemetry::run();
        let mut seen: Vec<String> = Vec::new();
        let mut out = Vec::new();

        for term in terms.iter().take(self.terms_per_site) {
            let search_url = self.profile.search_url_for(term);
            let page = match self.client.fetch(&search_url, self.profile.fetch_mode).await {
                Ok(p) => p,
                Err(e) => {
                    log.warn(format!("{}: search for '{}' failed: {}", self.profile.name, term, e));
                    continue;
                }
            };
            let doc = Html::parse_document(&page);
            for url in Self::candidate_links(&doc, &self.profile.base_url) {
                if seen.contains(&url) {
                    continue;
                }
                seen.push(url.clone());
                out.push(Candidate {
                    site_name: self.profile.name.clone(),
                    url,
                    discovered_via_term: Some(term.clone()),
                });
            }
        }
        Ok(out)
    }

    fn extract(&self, page: &PageContent) -> RawRecord {
        let doc = Html::parse_document(page);
        let mut rec = RawRecord::default();

        rec.title = clean_text(&select::first_text(
            &doc,
            &["h1.complaint-title", "h1[data-testid=complaint-title]", "h1"],
            5,
        ));
        rec.company_name = clean_text(&select::first_text(
            &doc,
            &["span.company-name", "a.company-link", "span[data-testid=company-name]"],
            2,
        ));
        rec.date_text = {
            let dt = select::first_attr(&doc, &["time"], "datetime");
            if dt.is_empty() {
                select::first_text(&doc, &["time", "span.complaint-date"], 1)
            } else {
                dt
            }
        };
        rec.description = clean_text(&select::first_text(
            &doc,
            &[
                "div.complaint-text",
                "div[data-testid=complaint-description]",
                "div.complaint-description",
            ],
            10,
        ));
        rec.status_text = clean_text(&select::first_text(&doc, &["span.status", "div.complaint-status"], 1));
        rec.category_text =
            clean_text(&select::first_text(&doc, &["span.category", "div.complaint-category"], 1));
        rec.rating_text = select::first_text(&doc, &["span.rating", "div.stars"], 1);
        rec.company_response = clean_text(&select::first_text(
            &doc,
            &[
                "div.company-response div.response-text",
                "div.company-response",
                "div[data-testid=company-response]",
            ],
            1,
        ));
        rec
    }
}
