use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sqlx::SqlitePool;

use crate::store::{ComplaintRow, Store};
use crate::telemetry::{self};
use crate::telemetry::ops::export::Phase as ExportPhase;

#[derive(Args)]
pub struct ExportCmd {
    /// Output CSV path
    #[arg(long, default_value = "ti_complaints_export.csv")]
    out: PathBuf,
}

const HEADER: &str = "id,site_source,company_name,complaint_date,title,description,category,\
rating,status,company_response,url,scraped_at,keywords_found,relevance_score,severity";

/// Quote one CSV field: wrap in double quotes when it contains a comma,
/// quote or newline, doubling embedded quotes.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_line(row: &ComplaintRow) -> String {
    let fields = [
        row.id.to_string(),
        csv_field(&row.site_source),
        csv_field(&row.company_name),
        row.complaint_date.map(|d| d.to_string()).unwrap_or_default(),
        csv_field(&row.title),
        csv_field(&row.description),
        csv_field(&row.category),
        row.rating.map(|r| r.to_string()).unwrap_or_default(),
        csv_field(&row.status),
        csv_field(&row.company_response),
        csv_field(&row.url),
        row.scraped_at.to_rfc3339(),
        csv_field(&row.keywords_found),
        row.relevance_score.to_string(),
        csv_field(&row.severity),
    ];
    fields.join(",")
}

pub async fn run(pool: &SqlitePool, args: ExportCmd) -> Result<()> {
    let log = telemetry::export();
    let _g = log.root_span_kv([("out", args.out.display().to_string())]).entered();

    let _s = log.span(&ExportPhase::Dump).entered();
    let store = Store::new(pool.clone());
    let rows = store.all_newest_first().await?;

    let mut out = String::with_capacity(rows.len() * 160 + HEADER.len() + 1);
    out.push_str(HEADER);
    out.push('\n');
    for row in &rows {
        out.push_str(&csv_line(row));
        out.push('\n');
    }
    std::fs::write(&args.out, out).with_context(|| format!("write {}", args.out.display()))?;
    log.info(format!("📦 Exported {} complaint(s) to {}", rows.len(), args.out.display()));

    if telemetry::config::json_mode() {
        #[derive(serde::Serialize)]
        struct ExportResult {
            rows: usize,
            path: String,
        }
        log.result(&ExportResult { rows: rows.len(), path: args.out.display().to_string() })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_field("sistema fora do ar"), "sistema fora do ar");
    }

    #[test]
    fn commas_and_quotes_are_quoted() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("disse \"erro\""), "\"disse \"\"erro\"\"\"");
        assert_eq!(csv_field("linha\nquebrada"), "\"linha\nquebrada\"");
    }

    #[test]
    fn line_has_all_columns() {
        let row = ComplaintRow {
            id: 7,
            site_source: "reclame_aqui".into(),
            company_name: "Acme, Telecom".into(),
            complaint_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            title: "Sistema fora do ar".into(),
            description: "descrição".into(),
            category: "Tecnologia".into(),
            rating: Some(2.0),
            status: "Não resolvido".into(),
            company_response: String::new(),
            url: "https://example.com/r/1".into(),
            scraped_at: Utc.with_ymd_and_hms(2024, 3, 16, 12, 0, 0).unwrap(),
            keywords_found: "sistema,fora do ar".into(),
            relevance_score: 35,
            severity: "critical".into(),
        };
        let line = csv_line(&row);
        assert!(line.starts_with("7,reclame_aqui,\"Acme, Telecom\",2024-03-15,"));
        assert!(line.contains("\"sistema,fora do ar\""));
        assert!(line.ends_with(",35,critical"));
        assert_eq!(HEADER.split(',').count(), 15);
    }
}
