use scraper::{Html, Selector};
use url::Url;

use crate::util::text::collapse_whitespace;

/// Try each selector in order and return the first match whose text is at
/// least `min_len` characters. Misses yield an empty string.
pub fn first_text(doc: &Html, selectors: &[&str], min_len: usize) -> String {
    for sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else { continue };
        for node in doc.select(&sel) {
            let text = collapse_whitespace(&node.text().collect::<String>());
            if text.chars().count() >= min_len {
                return text;
            }
        }
    }
    String::new()
}

/// Concatenate the text of every element matched by any selector whose text
/// clears `min_len`. Used for description bodies spread over several blocks.
pub fn collect_text(doc: &Html, selectors: &[&str], min_len: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else { continue };
        for node in doc.select(&sel) {
            let text = collapse_whitespace(&node.text().collect::<String>());
            if text.chars().count() >= min_len && !parts.contains(&text) {
                parts.push(text);
            }
        }
    }
    parts.join(" ")
}

/// Attribute of the first element matching any selector.
pub fn first_attr(doc: &Html, selectors: &[&str], attr: &str) -> String {
    for sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else { continue };
        if let Some(node) = doc.select(&sel).next() {
            if let Some(v) = node.value().attr(attr) {
                let v = v.trim();
                if !v.is_empty() {
                    return v.to_string();
                }
            }
        }
    }
    String::new()
}

/// Hyperlinks whose href satisfies `pred`, absolutized against `base` and
/// deduplicated in document order, capped at `limit`.
pub fn links_matching<F>(doc: &Html, base: &str, pred: F, limit: usize) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let Ok(sel) = Selector::parse("a[href]") else { return Vec::new() };
    let mut out: Vec<String> = Vec::new();
    for node in doc.select(&sel) {
        if out.len() >= limit {
            break;
        }
        let Some(href) = node.value().attr("href") else { continue };
        if !pred(href) {
            continue;
        }
        if let Some(abs) = absolutize(base, href) {
            if !out.contains(&abs) {
                out.push(abs);
            }
        }
    }
    out
}

/// Links matched by an explicit selector (e.g. `a.complaint-card-link`).
pub fn links_by_selector(doc: &Html, selector: &str, base: &str, limit: usize) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else { return Vec::new() };
    let mut out: Vec<String> = Vec::new();
    for node in doc.select(&sel) {
        if out.len() >= limit {
            break;
        }
        let Some(href) = node.value().attr("href") else { continue };
        if let Some(abs) = absolutize(base, href) {
            if !out.contains(&abs) {
                out.push(abs);
            }
        }
    }
    out
}

/// Resolve a possibly-relative href against the site base URL.
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_strategy_that_clears_min_len_wins() {
        let html = r#"<html><body>
            <h1 class="complaint-title">ok</h1>
            <h1>Sistema fora do ar há dois dias</h1>
        </body></html>"#;
        let doc = Html::parse_document(html);
        // "ok" is below the minimum, falls through to the bare h1
        let got = first_text(&doc, &["h1.complaint-title", "h1"], 5);
        assert_eq!(got, "Sistema fora do ar há dois dias");
    }

    #[test]
    fn later_node_of_same_selector_can_clear_gate() {
        let html = r#"<html><body>
            <h1>ok</h1>
            <h1>Sistema fora do ar há dois dias</h1>
        </body></html>"#;
        let doc = Html::parse_document(html);
        // first h1 is below the minimum; the second one counts
        let got = first_text(&doc, &["h1"], 5);
        assert_eq!(got, "Sistema fora do ar há dois dias");
    }

    #[test]
    fn miss_yields_empty_not_error() {
        let doc = Html::parse_document("<html><body><p>x</p></body></html>");
        assert_eq!(first_text(&doc, &[".nope", "h1"], 1), "");
        assert_eq!(first_attr(&doc, &["time"], "datetime"), "");
    }

    #[test]
    fn collect_text_joins_long_blocks_only() {
        let html = r#"<html><body>
            <p>curto</p>
            <p>Primeiro parágrafo relevante com bastante texto aqui.</p>
            <p>Segundo parágrafo igualmente relevante e comprido.</p>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let got = collect_text(&doc, &["p"], 20);
        assert!(got.contains("Primeiro parágrafo"));
        assert!(got.contains("Segundo parágrafo"));
        assert!(!got.contains("curto"));
    }

    #[test]
    fn duplicate_links_collapse() {
        let html = r#"<html><body>
            <a href="/reclamacao/123">uma vez</a>
            <a href="/reclamacao/123">de novo</a>
            <a href="/reclamacao/456">outra</a>
            <a href="/sobre">ignorada</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let got = links_matching(&doc, "https://site.test", |h| h.contains("/reclamacao/"), 20);
        assert_eq!(
            got,
            vec![
                "https://site.test/reclamacao/123".to_string(),
                "https://site.test/reclamacao/456".to_string(),
            ]
        );
    }

    #[test]
    fn limit_caps_results() {
        let html = r#"<html><body>
            <a href="/r/1">1</a><a href="/r/2">2</a><a href="/r/3">3</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let got = links_matching(&doc, "https://site.test", |h| h.contains("/r/"), 2);
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn absolutize_variants() {
        assert_eq!(
            absolutize("https://site.test", "/reclamacao/9").as_deref(),
            Some("https://site.test/reclamacao/9")
        );
        assert_eq!(
            absolutize("https://site.test/busca", "https://outro.test/x").as_deref(),
            Some("https://outro.test/x")
        );
        assert!(absolutize("not a url", "/x").is_none());
    }
}
