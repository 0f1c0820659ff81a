pub mod db;
pub mod types;

use anyhow::Result;
use sqlx::SqlitePool;

pub use types::{
    ClassifiedComplaint, CompanyCount, ComplaintRow, SaveOutcome, SeverityCount, SiteCount,
    SiteRunStats, StoreSummary,
};

/// Persistence facade over the complaint tables. Insert-only for complaint
/// rows; duplicates on `(site_source, title, company_name)` are swallowed
/// and reported as [`SaveOutcome::Duplicate`].
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Store { pool }
    }

    pub async fn save(&self, rec: &ClassifiedComplaint) -> Result<SaveOutcome> {
        if db::insert_complaint(&self.pool, rec).await? {
            Ok(SaveOutcome::Inserted)
        } else {
            Ok(SaveOutcome::Duplicate)
        }
    }

    pub async fn total(&self) -> Result<i64> {
        db::total(&self.pool).await
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<ComplaintRow>> {
        db::recent(&self.pool, limit).await
    }

    /// Full dump, newest first. Used by the CSV export.
    pub async fn all_newest_first(&self) -> Result<Vec<ComplaintRow>> {
        db::recent(&self.pool, -1).await
    }

    pub async fn record_run_stats(&self, stats: &SiteRunStats) -> Result<()> {
        db::insert_run_stats(&self.pool, stats).await
    }

    pub async fn summary(&self, top_n: i64) -> Result<StoreSummary> {
        Ok(StoreSummary {
            total: db::total(&self.pool).await?,
            by_site: db::count_by_site(&self.pool).await?,
            by_severity: db::count_by_severity(&self.pool).await?,
            top_companies: db::top_companies(&self.pool, top_n).await?,
            avg_relevance: db::avg_relevance(&self.pool).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Severity;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        // in-memory sqlite is per-connection; keep the pool at one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::init::ensure_schema(&pool).await.unwrap();
        pool
    }

    fn complaint(title: &str, company: &str) -> ClassifiedComplaint {
        ClassifiedComplaint {
            site_source: "reclame_aqui".into(),
            company_name: company.into(),
            complaint_date: None,
            title: title.into(),
            description: "Sistema fora do ar, erro de login.".into(),
            category: "Tecnologia".into(),
            rating: Some(1.0),
            status: "Não resolvido".into(),
            company_response: String::new(),
            url: "https://example.com/reclamacao/1".into(),
            keywords_found: vec!["sistema".into(), "erro".into()],
            relevance_score: 25,
            severity: Severity::High,
        }
    }

    #[tokio::test]
    async fn save_then_duplicate() {
        let store = Store::new(test_pool().await);
        let rec = complaint("Sistema fora do ar", "Acme Telecom");

        assert_eq!(store.save(&rec).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(store.save(&rec).await.unwrap(), SaveOutcome::Duplicate);
        assert_eq!(store.total().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn dedup_key_ignores_description() {
        let store = Store::new(test_pool().await);
        let first = complaint("App trava no login", "Globex");
        let mut second = first.clone();
        second.description = "Texto completamente diferente sobre o mesmo caso.".into();

        assert_eq!(store.save(&first).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(store.save(&second).await.unwrap(), SaveOutcome::Duplicate);
        assert_eq!(store.total().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn different_company_is_a_new_row() {
        let store = Store::new(test_pool().await);
        let a = complaint("App trava no login", "Globex");
        let b = complaint("App trava no login", "Initech");

        assert_eq!(store.save(&a).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(store.save(&b).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(store.total().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn summary_aggregates() {
        let store = Store::new(test_pool().await);
        let mut a = complaint("Fora do ar", "Acme Telecom");
        a.relevance_score = 40;
        a.severity = Severity::Critical;
        let mut b = complaint("Cobrança indevida no app", "Acme Telecom");
        b.relevance_score = 20;
        b.severity = Severity::Medium;
        let c = complaint("Erro no site", "Globex");

        for rec in [&a, &b, &c] {
            assert_eq!(store.save(rec).await.unwrap(), SaveOutcome::Inserted);
        }

        let summary = store.summary(10).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_site.len(), 1);
        assert_eq!(summary.by_site[0].cnt, 3);
        assert_eq!(summary.top_companies[0].company_name, "Acme Telecom");
        assert_eq!(summary.top_companies[0].cnt, 2);
        let expected = (40.0 + 20.0 + 25.0) / 3.0;
        assert!((summary.avg_relevance - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn recent_is_newest_first() {
        let store = Store::new(test_pool().await);
        store.save(&complaint("Primeira", "Acme")).await.unwrap();
        store.save(&complaint("Segunda", "Acme")).await.unwrap();

        let rows = store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        // same-timestamp ties break on id, newest insert first
        assert_eq!(rows[0].title, "Segunda");
        assert_eq!(rows[1].title, "Primeira");
    }

    #[tokio::test]
    async fn run_stats_row_persists() {
        let pool = test_pool().await;
        let store = Store::new(pool.clone());
        store
            .record_run_stats(&SiteRunStats {
                site_name: "trustpilot".into(),
                complaints_found: 7,
                execution_time_seconds: 12.5,
                success_rate: 0.875,
            })
            .await
            .unwrap();

        let n: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM scrape_stats").fetch_one(&pool).await.unwrap();
        assert_eq!(n, 1);
    }
}
