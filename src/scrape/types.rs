/// A discovered URL awaiting extraction. Discarded after the extraction
/// attempt.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub site_name: String,
    pub url: String,
    pub discovered_via_term: Option<String>,
}

/// Raw field set extracted from one page, before classification. Every field
/// defaults to empty on an extraction miss; a miss is never an error.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub date_text: String,
    pub rating_text: String,
    pub status_text: String,
    pub category_text: String,
    pub company_response: String,
    pub source_url: String,
}

impl RawRecord {
    /// The text the classifier scores: title plus description.
    pub fn combined_text(&self) -> String {
        let mut out = String::with_capacity(self.title.len() + self.description.len() + 1);
        out.push_str(&self.title);
        if !self.title.is_empty() && !self.description.is_empty() {
            out.push(' ');
        }
        out.push_str(&self.description);
        out
    }

    /// Pages that yielded neither a title nor a description are dropped.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_text_joins_title_and_description() {
        let rec = RawRecord {
            title: "erro no login".into(),
            description: "o sistema não abre".into(),
            ..Default::default()
        };
        assert_eq!(rec.combined_text(), "erro no login o sistema não abre");
    }

    #[test]
    fn combined_text_without_title() {
        let rec = RawRecord { description: "só descrição".into(), ..Default::default() };
        assert_eq!(rec.combined_text(), "só descrição");
    }

    #[test]
    fn emptiness_requires_both_fields_blank() {
        assert!(RawRecord::default().is_empty());
        let rec = RawRecord { title: "t".into(), ..Default::default() };
        assert!(!rec.is_empty());
    }
}
