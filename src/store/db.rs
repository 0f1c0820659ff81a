use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use super::types::{
    ClassifiedComplaint, CompanyCount, ComplaintRow, SeverityCount, SiteCount, SiteRunStats,
};

/// Atomic insert-if-absent on the uniqueness key
/// `(site_source, title, company_name)`. Returns whether a row was inserted;
/// a conflict means the record already exists.
pub async fn insert_complaint(pool: &SqlitePool, rec: &ClassifiedComplaint) -> Result<bool> {
    let exec = sqlx::query(
        r#"
        INSERT INTO complaints (
            site_source, company_name, complaint_date, title, description,
            category, rating, status, company_response, url,
            scraped_at, keywords_found, relevance_score, severity
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (site_source, title, company_name) DO NOTHING
        "#,
    )
    .bind(&rec.site_source)
    .bind(&rec.company_name)
    .bind(rec.complaint_date)
    .bind(&rec.title)
    .bind(&rec.description)
    .bind(&rec.category)
    .bind(rec.rating)
    .bind(&rec.status)
    .bind(&rec.company_response)
    .bind(&rec.url)
    .bind(Utc::now())
    .bind(rec.keywords_found.join(","))
    .bind(rec.relevance_score as i64)
    .bind(rec.severity.as_str())
    .execute(pool)
    .await?;
    Ok(exec.rows_affected() == 1)
}

pub async fn total(pool: &SqlitePool) -> Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM complaints").fetch_one(pool).await?;
    Ok(n)
}

pub async fn count_by_site(pool: &SqlitePool) -> Result<Vec<SiteCount>> {
    let rows = sqlx::query_as::<_, SiteCount>(
        r#"
        SELECT site_source, COUNT(*) AS cnt
        FROM complaints
        GROUP BY site_source
        ORDER BY cnt DESC, site_source
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_by_severity(pool: &SqlitePool) -> Result<Vec<SeverityCount>> {
    let rows = sqlx::query_as::<_, SeverityCount>(
        r#"
        SELECT severity, COUNT(*) AS cnt
        FROM complaints
        GROUP BY severity
        ORDER BY cnt DESC, severity
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn top_companies(pool: &SqlitePool, limit: i64) -> Result<Vec<CompanyCount>> {
    let rows = sqlx::query_as::<_, CompanyCount>(
        r#"
        SELECT company_name, COUNT(*) AS cnt
        FROM complaints
        GROUP BY company_name
        ORDER BY cnt DESC, company_name
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn avg_relevance(pool: &SqlitePool) -> Result<f64> {
    let avg: f64 =
        sqlx::query_scalar("SELECT COALESCE(AVG(relevance_score), 0.0) FROM complaints")
            .fetch_one(pool)
            .await?;
    Ok(avg)
}

/// Most-recent-first listing; `limit < 0` means no cap (full dump).
pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<ComplaintRow>> {
    let rows = sqlx::query_as::<_, ComplaintRow>(
        r#"
        SELECT id, site_source, company_name, complaint_date, title, description,
               category, rating, status, company_response, url,
               scraped_at, keywords_found, relevance_score, severity
        FROM complaints
        ORDER BY scraped_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert_run_stats(pool: &SqlitePool, stats: &SiteRunStats) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO scrape_stats (site_name, complaints_found, execution_time, success_rate, scraped_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&stats.site_name)
    .bind(stats.complaints_found)
    .bind(stats.execution_time_seconds)
    .bind(stats.success_rate)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}
