/// Keyword taxonomy for the technology-support domain.
///
/// Loaded once at startup into an immutable value and shared by `Arc`;
/// the classifier and adapters only ever read it.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    /// Full vocabulary, matched case-insensitively as substrings.
    pub keywords: Vec<String>,
    /// Subset that earns a bonus on top of the base weight.
    pub high_priority: Vec<String>,
    /// Severity tiers, evaluated critical > high > medium; anything else is low.
    pub critical: Vec<String>,
    pub high: Vec<String>,
    pub medium: Vec<String>,
    /// Weight added per matched vocabulary term.
    pub base_weight: u32,
    /// Extra weight for high-priority matches.
    pub bonus_weight: u32,
}

const TI_KEYWORDS: &[&str] = &[
    "sistema", "bug", "falha", "erro", "lentidão", "suporte técnico",
    "internet", "servidor", "segurança", "atendimento online", "plataforma",
    "aplicativo", "app", "site", "website", "login", "senha", "acesso",
    "conexão", "rede", "tecnologia", "digital", "online", "software",
    "hardware", "dados", "backup", "vírus", "malware", "firewall",
    "database", "banco de dados", "api", "integração", "sincronização",
    "atualização", "versão", "instalação", "configuração", "performance",
    "lento", "travando", "fora do ar", "indisponível", "manutenção",
    "técnico", "suporte", "helpdesk", "ti", "informática", "crash",
    "timeout", "loading", "carregamento", "freeze", "trava",
];

const HIGH_PRIORITY: &[&str] = &["bug", "falha", "erro", "sistema", "suporte técnico", "servidor"];

const CRITICAL_TIER: &[&str] =
    &["fora do ar", "indisponível", "crash", "perda de dados", "hack", "vírus", "malware"];

const HIGH_TIER: &[&str] = &["bug", "falha", "erro", "não funciona", "travando", "freeze"];

const MEDIUM_TIER: &[&str] = &["lentidão", "lento", "demora", "timeout", "loading"];

impl Default for Taxonomy {
    fn default() -> Self {
        let lower = |xs: &[&str]| xs.iter().map(|s| s.to_lowercase()).collect();
        Taxonomy {
            keywords: lower(TI_KEYWORDS),
            high_priority: lower(HIGH_PRIORITY),
            critical: lower(CRITICAL_TIER),
            high: lower(HIGH_TIER),
            medium: lower(MEDIUM_TIER),
            base_weight: 10,
            bonus_weight: 5,
        }
    }
}

impl Taxonomy {
    /// Ordered prefix of the vocabulary used as search terms during discovery.
    pub fn search_terms(&self, n: usize) -> &[String] {
        &self.keywords[..n.min(self.keywords.len())]
    }
}
