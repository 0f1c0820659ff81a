use serde::Serialize;

use crate::taxonomy::Taxonomy;

/// Severity tier, assigned by first-matching keyword tier (critical > high >
/// medium; low when no tier matches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Score a text against the taxonomy: base weight per distinct vocabulary
/// term present as a substring of the lower-cased text, bonus weight for
/// high-priority terms, clamped to 100. Returns the matched terms in
/// vocabulary order.
pub fn score(taxonomy: &Taxonomy, text: &str) -> (u32, Vec<String>) {
    if text.is_empty() {
        return (0, Vec::new());
    }
    let lower = text.to_lowercase();
    let mut total = 0u32;
    let mut found = Vec::new();
    for kw in &taxonomy.keywords {
        if lower.contains(kw.as_str()) {
            total += taxonomy.base_weight;
            if taxonomy.high_priority.iter().any(|h| h == kw) {
                total += taxonomy.bonus_weight;
            }
            found.push(kw.clone());
        }
    }
    (total.min(100), found)
}

pub fn is_relevant(taxonomy: &Taxonomy, text: &str, min_score: u32) -> bool {
    score(taxonomy, text).0 >= min_score
}

/// First-match-wins over the severity tiers; independent of the score.
pub fn classify_severity(taxonomy: &Taxonomy, text: &str) -> Severity {
    let lower = text.to_lowercase();
    let hit = |tier: &[String]| tier.iter().any(|kw| lower.contains(kw.as_str()));
    if hit(&taxonomy.critical) {
        Severity::Critical
    } else if hit(&taxonomy.high) {
        Severity::High
    } else if hit(&taxonomy.medium) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped_to_100() {
        let tax = Taxonomy::default();
        // long text containing many keywords
        let text = tax.keywords.join(" ");
        let (s, found) = score(&tax, &text);
        assert_eq!(s, 100);
        assert!(found.len() > 10);
    }

    #[test]
    fn score_never_decreases_with_more_matches() {
        let tax = Taxonomy::default();
        let mut text = String::new();
        let mut last = 0;
        for kw in tax.keywords.iter().take(15) {
            text.push(' ');
            text.push_str(kw);
            let (s, _) = score(&tax, &text);
            assert!(s >= last, "adding '{}' decreased score {} -> {}", kw, last, s);
            last = s;
        }
    }

    #[test]
    fn empty_text_scores_zero() {
        let tax = Taxonomy::default();
        assert_eq!(score(&tax, ""), (0, vec![]));
        assert!(!is_relevant(&tax, "", 10));
    }

    #[test]
    fn keywords_found_keeps_vocabulary_order() {
        let tax = Taxonomy::default();
        let (_, found) = score(&tax, "o bug do sistema");
        assert_eq!(found, vec!["sistema".to_string(), "bug".to_string()]);
    }

    #[test]
    fn high_priority_terms_earn_bonus() {
        let tax = Taxonomy::default();
        let (with_bonus, _) = score(&tax, "bug"); // high-priority
        let (plain, _) = score(&tax, "backup"); // plain vocabulary term
        assert_eq!(plain, tax.base_weight);
        assert_eq!(with_bonus, tax.base_weight + tax.bonus_weight);
    }

    #[test]
    fn severity_tiers_in_priority_order() {
        let tax = Taxonomy::default();
        // "crash" (critical) wins over "bug" (high) and "lento" (medium)
        assert_eq!(classify_severity(&tax, "crash com bug e tudo lento"), Severity::Critical);
        assert_eq!(classify_severity(&tax, "bug e tudo lento"), Severity::High);
        assert_eq!(classify_severity(&tax, "tudo muito lento"), Severity::Medium);
        assert_eq!(classify_severity(&tax, "queria elogiar o atendimento"), Severity::Low);
    }

    #[test]
    fn severity_is_deterministic() {
        let tax = Taxonomy::default();
        let text = "o aplicativo está travando sempre";
        let first = classify_severity(&tax, text);
        for _ in 0..5 {
            assert_eq!(classify_severity(&tax, text), first);
        }
    }

    #[test]
    fn bug_critical_when_tiers_say_so() {
        // tier membership lives in the taxonomy, not the classifier
        let tax = Taxonomy {
            keywords: vec!["sistema".into(), "bug".into()],
            high_priority: vec![],
            critical: vec!["bug".into()],
            high: vec![],
            medium: vec![],
            base_weight: 10,
            bonus_weight: 5,
        };
        let text = "O sistema apresenta um bug crítico";
        let (s, found) = score(&tax, text);
        assert!(found.contains(&"sistema".to_string()));
        assert!(found.contains(&"bug".to_string()));
        assert!(s >= 20);
        assert_eq!(classify_severity(&tax, text), Severity::Critical);
    }

    #[test]
    fn default_tiers_match_reference_lists() {
        let tax = Taxonomy::default();
        assert_eq!(classify_severity(&tax, "site fora do ar de novo"), Severity::Critical);
        assert_eq!(classify_severity(&tax, "erro ao fazer login"), Severity::High);
        assert_eq!(classify_severity(&tax, "muita lentidão na plataforma"), Severity::Medium);
    }
}
