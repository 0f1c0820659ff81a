use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use sqlx::SqlitePool;

use crate::store::{Store, StoreSummary};
use crate::telemetry::{self};
use crate::telemetry::ops::report::Phase as ReportPhase;

#[derive(Args)]
pub struct ReportCmd {
    /// Directory the report file is written into
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,
}

const TOP_COMPANIES: i64 = 10;

fn severity_marker(severity: &str) -> &'static str {
    match severity {
        "critical" => "🔴",
        "high" => "🟠",
        "medium" => "🟡",
        _ => "🟢",
    }
}

/// Render the run report as plain text from the store summary.
pub fn render_report(summary: &StoreSummary) -> String {
    let mut out = String::new();
    out.push_str("RELATÓRIO DE RECLAMAÇÕES DE TECNOLOGIA\n");
    out.push_str("======================================\n");
    out.push_str(&format!("Gerado em: {}\n\n", Local::now().format("%d/%m/%Y %H:%M:%S")));

    out.push_str(&format!("Total de reclamações: {}\n", summary.total));
    out.push_str(&format!("Relevância média: {:.1}\n\n", summary.avg_relevance));

    out.push_str("Por site:\n");
    for s in &summary.by_site {
        out.push_str(&format!("  {:<20} {}\n", s.site_source, s.cnt));
    }

    out.push_str("\nPor severidade:\n");
    for s in &summary.by_severity {
        out.push_str(&format!("  {} {:<10} {}\n", severity_marker(&s.severity), s.severity, s.cnt));
    }

    out.push_str("\nEmpresas mais reclamadas:\n");
    for c in &summary.top_companies {
        out.push_str(&format!("  {:<30} {}\n", c.company_name, c.cnt));
    }
    out
}

/// Write the timestamped report file under `out_dir`, creating it if needed.
pub async fn write_final_report(store: &Store, out_dir: &Path) -> Result<PathBuf> {
    let summary = store.summary(TOP_COMPANIES).await?;
    let text = render_report(&summary);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create report dir {}", out_dir.display()))?;
    let path = out_dir.join(format!("final_report_{}.txt", Local::now().format("%Y%m%d_%H%M%S")));
    std::fs::write(&path, text).with_context(|| format!("write report {}", path.display()))?;
    Ok(path)
}

pub async fn run(pool: &SqlitePool, args: ReportCmd) -> Result<()> {
    let log = telemetry::report();
    let _g = log.root_span_kv([("out_dir", args.out_dir.display().to_string())]).entered();

    let _s = log.span(&ReportPhase::Build).entered();
    let store = Store::new(pool.clone());
    let path = write_final_report(&store, &args.out_dir).await?;
    log.info(format!("📄 Report written to {}", path.display()));

    if telemetry::config::json_mode() {
        #[derive(serde::Serialize)]
        struct ReportResult {
            path: String,
        }
        log.result(&ReportResult { path: path.display().to_string() })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CompanyCount, SeverityCount, SiteCount};

    fn summary() -> StoreSummary {
        StoreSummary {
            total: 3,
            by_site: vec![
                SiteCount { site_source: "reclame_aqui".into(), cnt: 2 },
                SiteCount { site_source: "trustpilot".into(), cnt: 1 },
            ],
            by_severity: vec![
                SeverityCount { severity: "critical".into(), cnt: 1 },
                SeverityCount { severity: "medium".into(), cnt: 2 },
            ],
            top_companies: vec![CompanyCount { company_name: "Acme Telecom".into(), cnt: 2 }],
            avg_relevance: 31.7,
        }
    }

    #[test]
    fn report_lists_sections() {
        let text = render_report(&summary());
        assert!(text.contains("Total de reclamações: 3"));
        assert!(text.contains("reclame_aqui"));
        assert!(text.contains("🔴 critical"));
        assert!(text.contains("🟡 medium"));
        assert!(text.contains("Acme Telecom"));
        assert!(text.contains("Relevância média: 31.7"));
    }

    #[test]
    fn markers_cover_all_tiers() {
        assert_eq!(severity_marker("critical"), "🔴");
        assert_eq!(severity_marker("high"), "🟠");
        assert_eq!(severity_marker("medium"), "🟡");
        assert_eq!(severity_marker("low"), "🟢");
    }
}
