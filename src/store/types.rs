use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::classify::Severity;

/// The unit persisted: one raw record plus its classification. Immutable
/// once saved — the store only inserts and reads.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedComplaint {
    pub site_source: String,
    pub company_name: String,
    pub complaint_date: Option<NaiveDate>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub rating: Option<f64>,
    pub status: String,
    pub company_response: String,
    pub url: String,
    pub keywords_found: Vec<String>,
    pub relevance_score: u32,
    pub severity: Severity,
}

/// Outcome of a save. Storage failures are errors, not a third variant —
/// duplicates and I/O problems are distinct conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Duplicate,
}

#[derive(Debug, FromRow, Serialize)]
pub struct ComplaintRow {
    pub id: i64,
    pub site_source: String,
    pub company_name: String,
    pub complaint_date: Option<NaiveDate>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub rating: Option<f64>,
    pub status: String,
    pub company_response: String,
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub keywords_found: String,
    pub relevance_score: i64,
    pub severity: String,
}

#[derive(Debug, FromRow, Serialize)]
pub struct SiteCount {
    pub site_source: String,
    pub cnt: i64,
}

#[derive(Debug, FromRow, Serialize)]
pub struct CompanyCount {
    pub company_name: String,
    pub cnt: i64,
}

#[derive(Debug, FromRow, Serialize)]
pub struct SeverityCount {
    pub severity: String,
    pub cnt: i64,
}

/// Aggregate view over the complaint table, used by stats and reports.
#[derive(Debug, Serialize)]
pub struct StoreSummary {
    pub total: i64,
    pub by_site: Vec<SiteCount>,
    pub by_severity: Vec<SeverityCount>,
    pub top_companies: Vec<CompanyCount>,
    pub avg_relevance: f64,
}

/// One row per site per run in the scrape_stats table.
#[derive(Debug, Clone, Serialize)]
pub struct SiteRunStats {
    pub site_name: String,
    pub complaints_found: i64,
    pub execution_time_seconds: f64,
    pub success_rate: f64,
}
