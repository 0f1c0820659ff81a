use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn date_res() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").unwrap(),
            Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap(),
            Regex::new(r"(\d{1,2})-(\d{1,2})-(\d{4})").unwrap(),
        ]
    })
}

/// Parse a date out of free text. Recognizes YYYY-MM-DD, DD/MM/YYYY and
/// DD-MM-YYYY; returns None when nothing parseable is present.
pub fn extract_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    let [iso, slash, dash] = date_res();

    if let Some(c) = iso.captures(s) {
        let (y, m, d) = (c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return Some(date);
        }
    }
    for re in [slash, dash] {
        if let Some(c) = re.captures(s) {
            let (d, m, y) = (c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }
    }
    None
}

fn rating_res() -> &'static [Regex; 4] {
    static RES: OnceLock<[Regex; 4]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"(\d+(?:\.\d+)?)/5").unwrap(),
            Regex::new(r"(\d+(?:\.\d+)?)/10").unwrap(),
            Regex::new(r"(\d+(?:\.\d+)?)★").unwrap(),
            Regex::new(r"(\d+(?:\.\d+)?)").unwrap(),
        ]
    })
}

/// Parse a numeric rating out of strings like "4.5/5", "8/10" or "3★",
/// normalized to the 0–5 scale.
pub fn extract_rating(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    for re in rating_res() {
        if let Some(c) = re.captures(s) {
            if let Ok(mut rating) = c[1].parse::<f64>() {
                if s.contains("/10") || rating > 5.0 {
                    rating /= 2.0;
                }
                return Some(rating.min(5.0));
            }
        }
    }
    None
}

fn company_res() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"empresa\s+([A-ZÀ-Ü][a-zA-ZÀ-ü]+(?:\s+[A-ZÀ-Ü][a-zA-ZÀ-ü]+)*)",
            r"problema\s+com\s+(?:a\s+|o\s+)?([A-ZÀ-Ü][a-zA-ZÀ-ü]+(?:\s+[A-ZÀ-Ü][a-zA-ZÀ-ü]+)*)",
            r"sistema\s+d[ao]\s+([A-ZÀ-Ü][a-zA-ZÀ-ü]+(?:\s+[A-ZÀ-Ü][a-zA-ZÀ-ü]+)*)",
            r"([A-ZÀ-Ü][a-zA-ZÀ-ü]+)\s+não\s+(?:resolve|funciona)",
            r"([A-ZÀ-Ü][a-zA-ZÀ-ü]+)\s+tem\s+(?:bug|falha)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Best-effort company name inference for records whose page carried no
/// explicit company field. Falls back to a fixed placeholder.
pub fn extract_company_name(text: &str) -> String {
    for re in company_res() {
        if let Some(c) = re.captures(text) {
            return c[1].trim().to_string();
        }
    }
    "Empresa não identificada".to_string()
}
