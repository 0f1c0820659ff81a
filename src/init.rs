use std::str::FromStr;

use anyhow::Result;
use clap::Args;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

#[derive(Args, Debug)]
pub struct InitCmd {}

pub async fn connect(dsn: &str) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(5).connect_with(opts).await?;
    Ok(pool)
}

/// Create the complaint tables and indexes. Idempotent; safe to run on an
/// existing database.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS complaints (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            site_source TEXT NOT NULL,
            company_name TEXT NOT NULL,
            complaint_date TEXT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            rating REAL,
            status TEXT NOT NULL,
            company_response TEXT NOT NULL,
            url TEXT NOT NULL,
            scraped_at TEXT NOT NULL,
            keywords_found TEXT NOT NULL,
            relevance_score INTEGER NOT NULL,
            severity TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // dedup key: one row per (site, title, company)
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_complaint_identity
        ON complaints (site_source, title, company_name)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_site_source ON complaints (site_source)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_company_name ON complaints (company_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_scraped_at ON complaints (scraped_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scrape_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            site_name TEXT NOT NULL,
            complaints_found INTEGER NOT NULL,
            execution_time REAL NOT NULL,
            success_rate REAL NOT NULL,
            scraped_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn run(pool: &SqlitePool, _args: InitCmd) -> Result<()> {
    let log = telemetry::init();
    let _g = log.root_span_kv([]).entered();

    let _s = log.span(&InitPhase::Schema).entered();
    ensure_schema(pool).await?;
    log.info("✅ Database initialized");

    if telemetry::config::json_mode() {
        #[derive(serde::Serialize)]
        struct InitResult {
            tables: Vec<&'static str>,
        }
        log.result(&InitResult { tables: vec!["complaints", "scrape_stats"] })?;
    }
    Ok(())
}
