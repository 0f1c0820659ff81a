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

/// Trustpilot: discovery walks the technology category page rather than a
/// per-term search, collecting /review/ links.
pub struct Trustpilot {
    profile: SiteProfile,
    client: FetchClient,
}

const COMPANY_LINK_LIMIT: usize = 20;

impl Trustpilot {
    pub fn new(profile: SiteProfile, cfg: &ScrapeConfig) -> Result<Self> {
        let client = super::client_for(&profile, cfg)?;
        Ok(Trustpilot { profile, client })
    }

    pub(crate) fn review_links(doc: &Html, base: &str) -> Vec<String> {
        let by_class = select::links_by_selector(doc, "a.company-link", base, COMPANY_LINK_LIMIT);
        if !by_class.is_empty() {
            return by_class;
        }
        select::links_matching(doc, base, |h| h.contains("/review/"), COMPANY_LINK_LIMIT)
    }
}

#[async_trait]
impl SiteAdapter for Trustpilot {
    fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    async fn fetch_page(&mut self, url: &str) -> Result<PageContent, FetchError> {
        self.client.fetch(url, self.profile.fetch_mode).await
    }

    async fn discover_urls(&mut self, _terms: &[String]) -> Result<Vec<Candidate>> {
        let log = telemetry::run();
        let category_url = self.profile.search_url.clone();
        let page = match self.client.fetch(&category_url, self.profile.fetch_mode).await {
            Ok(p) => p,
            Err(e) => {
                log.warn(format!("{}: category page failed: {}", self.profile.name, e));
                return Ok(Vec::new());
            }
        };
        let doc = Html::parse_document(&page);
        let out = Self::review_links(&doc, &self.profile.base_url)
            .into_iter()
            .map(|url| Candidate {
                site_name: self.profile.name.clone(),
                url,
                discovered_via_term: None,
            })
            .collect();
        Ok(out)
    }

    fn extract(&self, page: &PageContent) -> RawRecord {
        let doc = Html::parse_document(page);
        let mut rec = RawRecord::default();

        rec.title = clean_text(&select::first_text(
            &doc,
            &["h2.review-title", "h2[data-service-review-title-typography=true]", "h2"],
            5,
        ));
        rec.company_name =
            clean_text(&select::first_text(&doc, &["span.company-name", "a.company-link", "h1"], 2));
        rec.date_text = {
            let dt = select::first_attr(&doc, &["time"], "datetime");
            if dt.is_empty() {
                select::first_text(&doc, &["time", "span.review-date", "div.review-date"], 1)
            } else {
                dt
            }
        };
        rec.description = clean_text(&select::first_text(
            &doc,
            &[
                "div.review-content",
                "p[data-service-review-text-typography=true]",
                "div.review-text",
            ],
            10,
        ));
        rec.rating_text = select::first_text(&doc, &["div.star-rating", "div.stars", "span.rating"], 1);
        // reviews carry no complaint status; published is all we know
        rec.status_text = "Publicada".to_string();
        rec.category_text = "Tecnologia".to_string();
        rec.company_response = clean_text(&select::first_text(
            &doc,
            &["div.company-response", "div.business-response"],
            1,
        ));
        rec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SiteProfile {
        SiteProfile {
            name: "trustpilot".into(),
            base_url: "https://www.trustpilot.com".into(),
            search_url: "https://www.trustpilot.com/categories/technology".into(),
            enabled: true,
            fetch_mode: crate::config::FetchMode::PlainHttp,
        }
    }

    #[test]
    fn review_links_deduplicated() {
        let html = r#"<html><body>
            <a href="/review/acme.com">Acme</a>
            <a href="/review/acme.com">Acme de novo</a>
            <a href="/review/globex.io">Globex</a>
            <a href="/categories/other">categoria</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let got = Trustpilot::review_links(&doc, "https://www.trustpilot.com");
        assert_eq!(
            got,
            vec![
                "https://www.trustpilot.com/review/acme.com".to_string(),
                "https://www.trustpilot.com/review/globex.io".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn extract_reads_review_fields() {
        let adapter = Trustpilot::new(profile(), &ScrapeConfig::default()).unwrap();
        let page = r#"<html><body>
            <h1>Globex</h1>
            <h2 class="review-title">Aplicativo cheio de bug</h2>
            <time datetime="2024-02-01T09:00:00Z">1 de fevereiro</time>
            <div class="review-content">O app trava toda vez que tento fazer login.</div>
            <div class="star-rating">2/5</div>
        </body></html>"#
            .to_string();

        let rec = adapter.extract(&page);
        assert_eq!(rec.title, "Aplicativo cheio de bug");
        assert_eq!(rec.company_name, "Globex");
        assert_eq!(rec.date_text, "2024-02-01T09:00:00Z");
        assert_eq!(rec.rating_text, "2/5");
        assert_eq!(rec.status_text, "Publicada");
        assert_eq!(rec.category_text, "Tecnologia");
    }
}
