use anyhow::Result;
use clap::Args;
use sqlx::SqlitePool;

use crate::store::Store;
use crate::telemetry::{self};
use crate::telemetry::ops::stats::Phase as StatsPhase;

#[derive(Args)]
pub struct StatsCmd {
    /// Number of companies in the ranking
    #[arg(long, default_value_t = 10)]
    top: i64,
    /// Number of recent complaints listed
    #[arg(long, default_value_t = 5)]
    recent: i64,
}

pub async fn run(pool: &SqlitePool, args: StatsCmd) -> Result<()> {
    let log = telemetry::stats();
    let _g = log
        .root_span_kv([("top", args.top.to_string()), ("recent", args.recent.to_string())])
        .entered();

    let _s = log.span(&StatsPhase::Summary).entered();
    let store = Store::new(pool.clone());
    let summary = store.summary(args.top).await?;

    log.info(format!("📊 Complaints: total={}", summary.total));
    log.info(format!("   Avg relevance: {:.1}", summary.avg_relevance));

    log.info("🌐 By site:");
    for s in &summary.by_site {
        log.info(format!("  {:<20} {}", s.site_source, s.cnt));
    }

    log.info("⚠️  By severity:");
    for s in &summary.by_severity {
        log.info(format!("  {:<10} {}", s.severity, s.cnt));
    }

    log.info(format!("🏢 Top {} companies:", args.top));
    for c in &summary.top_companies {
        log.info(format!("  {:<30} {}", c.company_name, c.cnt));
    }

    let recent = store.recent(args.recent).await?;
    if !recent.is_empty() {
        log.info(format!("📜 Recent (latest {}):", recent.len()));
        for r in &recent {
            log.info(format!(
                "  id={}  [{}] score={} {} — {}",
                r.id, r.severity, r.relevance_score, r.site_source, r.title
            ));
        }
    }

    if telemetry::config::json_mode() {
        log.result(&summary)?;
    }
    Ok(())
}
