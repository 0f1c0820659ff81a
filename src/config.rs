use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::warn;
use url::form_urlencoded;

/// How a site's pages are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    PlainHttp,
    RenderedBrowser,
}

/// Static descriptor of one target site. Created from configuration,
/// never mutated after load.
#[derive(Debug, Clone, Serialize)]
pub struct SiteProfile {
    pub name: String,
    pub base_url: String,
    pub search_url: String,
    pub enabled: bool,
    pub fetch_mode: FetchMode,
}

impl SiteProfile {
    /// Build a search URL for a term, appending `?q=` or `&q=` depending on
    /// whether the configured search URL already has a query string.
    pub fn search_url_for(&self, term: &str) -> String {
        let sep = if self.search_url.contains('?') { '&' } else { '?' };
        let encoded: String = form_urlencoded::byte_serialize(term.as_bytes()).collect();
        format!("{}{}q={}", self.search_url, sep, encoded)
    }
}

/// Scraping knobs, read from the environment with the defaults the rest of
/// the pipeline was tuned against.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub delay_between_requests: Duration,
    pub delay_between_sites: Duration,
    pub max_retries: u32,
    pub timeout: Duration,
    pub rotate_user_agent: bool,
    pub max_pages_per_site: usize,
    /// How many taxonomy terms each site searches during discovery.
    pub search_term_count: usize,
    /// Minimum relevance score for a record to be persisted.
    pub min_relevance: u32,
    /// Browserless-style /content endpoint for rendered_browser sites.
    pub renderer_url: Option<String>,
    pub renderer_token: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            delay_between_requests: Duration::from_secs(2),
            delay_between_sites: Duration::from_secs(5),
            max_retries: 3,
            timeout: Duration::from_secs(30),
            rotate_user_agent: true,
            max_pages_per_site: 10,
            search_term_count: 8,
            min_relevance: 20,
            renderer_url: None,
            renderer_token: None,
        }
    }
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        let mut cfg = ScrapeConfig::default();
        if let Some(secs) = env_u64("TECHWATCH_REQUEST_DELAY_SECS") {
            cfg.delay_between_requests = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("TECHWATCH_SITE_DELAY_SECS") {
            cfg.delay_between_sites = Duration::from_secs(secs);
        }
        if let Some(n) = env_u64("TECHWATCH_MAX_RETRIES") {
            cfg.max_retries = n as u32;
        }
        if let Some(secs) = env_u64("TECHWATCH_TIMEOUT_SECS") {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env_u64("TECHWATCH_MAX_PAGES") {
            cfg.max_pages_per_site = n as usize;
        }
        if let Some(n) = env_u64("TECHWATCH_SEARCH_TERMS") {
            cfg.search_term_count = n as usize;
        }
        if let Some(n) = env_u64("TECHWATCH_MIN_RELEVANCE") {
            cfg.min_relevance = n as u32;
        }
        if let Ok(v) = std::env::var("TECHWATCH_UA_ROTATION") {
            cfg.rotate_user_agent = v != "0" && !v.eq_ignore_ascii_case("false");
        }
        cfg.renderer_url = std::env::var("BROWSERLESS_URL").ok().filter(|s| !s.is_empty());
        cfg.renderer_token = std::env::var("BROWSERLESS_TOKEN").ok().filter(|s| !s.is_empty());
        cfg
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}

/// Parse the pipe-delimited site configuration:
/// `name|base_url|search_url|enabled(sim/não)|uses_rendering(sim/não)`.
/// Comment lines start with `#`; lines with fewer than 4 fields are skipped.
pub fn parse_sites(content: &str) -> Vec<SiteProfile> {
    let mut sites = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('|').map(|p| p.trim()).collect();
        if parts.len() < 4 {
            warn!("skipping malformed site line: {}", line);
            continue;
        }
        let uses_rendering = parts.get(4).map(|p| parse_sim(p)).unwrap_or(false);
        sites.push(SiteProfile {
            name: parts[0].to_string(),
            base_url: parts[1].to_string(),
            search_url: parts[2].to_string(),
            enabled: parse_sim(parts[3]),
            fetch_mode: if uses_rendering { FetchMode::RenderedBrowser } else { FetchMode::PlainHttp },
        });
    }
    sites
}

fn parse_sim(s: &str) -> bool {
    s.eq_ignore_ascii_case("sim")
}

/// Load site profiles from the config file. A missing file yields an empty
/// site set (a no-op run), not an error.
pub fn load_sites(path: &Path) -> Result<Vec<SiteProfile>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_sites(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("site config not found at {}; no sites to scrape", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sites de reclamação
reclame_aqui|https://www.reclameaqui.com.br|https://www.reclameaqui.com.br/busca|sim|sim
consumidor_gov|https://www.consumidor.gov.br|https://www.consumidor.gov.br/pages/indicador/pesquisar|sim|não
ebit|https://www.ebit.com.br|https://www.ebit.com.br/reclamacoes|não|não
quebrado|so-dois-campos
trustpilot|https://www.trustpilot.com|https://www.trustpilot.com/categories/technology|sim
";

    #[test]
    fn parses_well_formed_lines() {
        let sites = parse_sites(SAMPLE);
        assert_eq!(sites.len(), 4); // malformed line dropped
        assert_eq!(sites[0].name, "reclame_aqui");
        assert_eq!(sites[0].fetch_mode, FetchMode::RenderedBrowser);
        assert!(sites[0].enabled);
        assert_eq!(sites[1].fetch_mode, FetchMode::PlainHttp);
        assert!(!sites[2].enabled);
    }

    #[test]
    fn missing_rendering_field_defaults_to_plain() {
        let sites = parse_sites(SAMPLE);
        let tp = sites.iter().find(|s| s.name == "trustpilot").unwrap();
        assert_eq!(tp.fetch_mode, FetchMode::PlainHttp);
        assert!(tp.enabled);
    }

    #[test]
    fn comments_and_blanks_ignored() {
        let sites = parse_sites("# apenas comentário\n\n");
        assert!(sites.is_empty());
    }

    #[test]
    fn search_url_separator() {
        let mut site = SiteProfile {
            name: "x".into(),
            base_url: "https://x.test".into(),
            search_url: "https://x.test/busca".into(),
            enabled: true,
            fetch_mode: FetchMode::PlainHttp,
        };
        assert_eq!(site.search_url_for("bug"), "https://x.test/busca?q=bug");
        assert_eq!(site.search_url_for("lentidão"), "https://x.test/busca?q=lentid%C3%A3o");
        site.search_url = "https://x.test/busca?tipo=t".into();
        assert_eq!(site.search_url_for("fora do ar"), "https://x.test/busca?tipo=t&q=fora+do+ar");
    }
}
