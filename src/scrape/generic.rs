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

/// Fallback adapter for any site without a dedicated variant. Discovery
/// searches per term and keeps hyperlinks whose path carries one of the
/// complaint/review tokens; extraction uses broad selector heuristics.
pub struct GenericSite {
    profile: SiteProfile,
    client: FetchClient,
    terms_per_site: usize,
}

const PATH_TOKENS: &[&str] = &["reclamacao", "complaint", "review", "avaliacao"];
const LINKS_PER_TERM: usize = 20;

impl GenericSite {
    pub fn new(profile: SiteProfile, cfg: &ScrapeConfig) -> Result<Self> {
        let client = super::client_for(&profile, cfg)?;
        Ok(GenericSite { profile, client, terms_per_site: cfg.search_term_count })
    }

    pub(crate) fn complaint_links(doc: &Html, base: &str) -> Vec<String> {
        select::links_matching(
            doc,
            base,
            |href| {
                let lower = href.to_lowercase();
                PATH_TOKENS.iter().any(|t| lower.contains(t))
            },
            LINKS_PER_TERM,
        )
    }
}

#[async_trait]
impl SiteAdapter for GenericSite {
    fn profile(&self) -> &SiteProfile {
        &self.profile
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
            for url in Self::complaint_links(&doc, &self.profile.base_url) {
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
            &["h1", "h2", ".title", ".complaint-title", ".review-title"],
            5,
        ));
        rec.company_name = clean_text(&select::first_text(
            &doc,
            &[".company-name", ".company", ".business-name", "h1", "h2"],
            2,
        ));
        rec.date_text = {
            let dt = select::first_attr(&doc, &["time"], "datetime");
            if dt.is_empty() {
                select::first_text(&doc, &["time"], 1)
            } else {
                dt
            }
        };
        rec.description = clean_text(&select::collect_text(
            &doc,
            &[".description", ".complaint-text", ".review-text", ".content", "p"],
            50,
        ));
        rec.rating_text = select::first_text(&doc, &[".rating", ".stars", ".score"], 1);
        rec.status_text = clean_text(&select::first_text(&doc, &[".status", ".complaint-status"], 1));
        rec.category_text = "Tecnologia".to_string();
        rec.company_response = clean_text(&select::first_text(
            &doc,
            &[".company-response", ".business-response", ".response"],
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
            name: "consumidor_gov".into(),
            base_url: "https://www.consumidor.gov.br".into(),
            search_url: "https://www.consumidor.gov.br/pages/indicador/pesquisar".into(),
            enabled: true,
            fetch_mode: crate::config::FetchMode::PlainHttp,
        }
    }

    #[test]
    fn term_budget_follows_config() {
        let cfg = ScrapeConfig { search_term_count: 8, ..ScrapeConfig::default() };
        let adapter = GenericSite::new(profile(), &cfg).unwrap();
        assert_eq!(adapter.terms_per_site, 8);
    }

    #[test]
    fn link_discovery_matches_path_tokens_only() {
        let html = r#"<html><body>
            <a href="/reclamacao/111">reclamação</a>
            <a href="/complaints/big-corp">complaint board</a>
            <a href="/review/acme">review</a>
            <a href="/avaliacao/9">avaliação</a>
            <a href="/institucional">institucional</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let got = GenericSite::complaint_links(&doc, "https://www.consumidor.gov.br");
        assert_eq!(got.len(), 4);
        assert!(got.iter().all(|u| u.starts_with("https://www.consumidor.gov.br/")));
    }

    #[test]
    fn link_discovery_is_a_set() {
        let html = r#"<html><body>
            <a href="/reclamacao/111">uma</a>
            <a href="/reclamacao/111">duas</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let got = GenericSite::complaint_links(&doc, "https://www.consumidor.gov.br");
        assert_eq!(got.len(), 1);
    }

    #[tokio::test]
    async fn extract_uses_broad_heuristics() {
        let adapter = GenericSite::new(profile(), &ScrapeConfig::default()).unwrap();
        let page = r#"<html><body>
            <h1>Internet fora do ar na região inteira</h1>
            <p>Primeiro parágrafo da reclamação com detalhes suficientes do problema.</p>
            <p>Segundo parágrafo, igualmente longo, explicando o erro de conexão.</p>
            <span class="rating">1/5</span>
        </body></html>"#
            .to_string();

        let rec = adapter.extract(&page);
        assert_eq!(rec.title, "Internet fora do ar na região inteira");
        assert!(rec.description.contains("Primeiro parágrafo"));
        assert!(rec.description.contains("Segundo parágrafo"));
        assert_eq!(rec.rating_text, "1/5");
        assert_eq!(rec.category_text, "Tecnologia");
    }

    #[tokio::test]
    async fn empty_page_yields_empty_record() {
        let adapter = GenericSite::new(profile(), &ScrapeConfig::default()).unwrap();
        let rec = adapter.extract(&"<html><body></body></html>".to_string());
        assert!(rec.is_empty());
    }
}
