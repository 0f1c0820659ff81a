use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::classify;
use crate::config::{load_sites, ScrapeConfig, SiteProfile};
use crate::scrape::{self, types::RawRecord};
use crate::store::{ClassifiedComplaint, SaveOutcome, SiteRunStats, Store};
use crate::taxonomy::Taxonomy;
use crate::telemetry::{self};
use crate::telemetry::ops::run::Phase as RunPhase;
use crate::util::parse::{extract_company_name, extract_date, extract_rating};
use crate::util::text::truncate_title;

const TITLE_MAX: usize = 200;

#[derive(Args)]
pub struct RunCmd {
    /// Scrape only the named site
    #[arg(long)]
    site: Option<String>,
    /// Pipe-delimited site configuration file
    #[arg(long, default_value = "sites_config.txt")]
    config: PathBuf,
    /// Page budget per site (each page visits per_page_fanout URLs)
    #[arg(long, default_value_t = 5)]
    max_pages: usize,
    #[arg(long, default_value_t = false)]
    apply: bool,
    #[arg(long, default_value_t = 10)]
    plan_limit: usize,
}

#[derive(Serialize, Default)]
struct SiteResult {
    site: String,
    found: usize,
    saved: usize,
    duplicates: usize,
    errors: usize,
    secs: f64,
}

pub async fn run(pool: &SqlitePool, args: RunCmd) -> Result<()> {
    let log = telemetry::run();
    let _g = log
        .root_span_kv([
            ("site", format!("{:?}", args.site)),
            ("config", args.config.display().to_string()),
            ("max_pages", args.max_pages.to_string()),
            ("apply", args.apply.to_string()),
        ])
        .entered();

    let cfg = ScrapeConfig::from_env();
    let taxonomy = Taxonomy::default();

    let mut sites: Vec<SiteProfile> =
        load_sites(&args.config)?.into_iter().filter(|s| s.enabled).collect();
    if let Some(only) = &args.site {
        sites.retain(|s| &s.name == only);
        if sites.is_empty() {
            log.warn(format!("site '{}' not found or not enabled in {}", only, args.config.display()));
            return Ok(());
        }
    }
    if sites.is_empty() {
        log.info("ℹ️  No enabled sites to scrape");
        return Ok(());
    }

    let terms: Vec<String> = taxonomy.search_terms(cfg.search_term_count).to_vec();

    if !args.apply {
        log.info(format!(
            "📝 Scrape plan — sites={} max_pages={} search_terms={} min_relevance={}",
            sites.len(),
            args.max_pages,
            terms.len(),
            cfg.min_relevance
        ));
        for s in sites.iter().take(args.plan_limit) {
            log.info(format!("  {} ({:?}) {}", s.name, s.fetch_mode, s.search_url));
        }
        if sites.len() > args.plan_limit {
            log.info(format!("  ... ({} more)", sites.len() - args.plan_limit));
        }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            #[derive(Serialize)]
            struct RunPlan<'a> {
                sites: Vec<&'a SiteProfile>,
                max_pages: usize,
                search_terms: &'a [String],
                min_relevance: u32,
            }
            log.plan(&RunPlan {
                sites: sites.iter().collect(),
                max_pages: args.max_pages,
                search_terms: &terms,
                min_relevance: cfg.min_relevance,
            })?;
        }
        return Ok(());
    }

    let store = Store::new(pool.clone());
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut results: Vec<SiteResult> = Vec::new();
    let site_count = sites.len();

    for (idx, profile) in sites.into_iter().enumerate() {
        if cancel.is_cancelled() {
            log.warn("run interrupted; stopping before next site");
            break;
        }

        let _site = log.span_kv(&RunPhase::Site, [("site", profile.name.clone())]).entered();
        let started = Instant::now();
        let mut res = SiteResult { site: profile.name.clone(), ..Default::default() };

        let mut adapter = match scrape::adapter_for(&profile, &cfg) {
            Ok(a) => a,
            Err(e) => {
                log.warn(format!("{}: setup failed: {e:#}", profile.name));
                res.errors = 1;
                res.secs = started.elapsed().as_secs_f64();
                record_site(&store, &log, &res, terms.len()).await;
                results.push(res);
                continue;
            }
        };

        let records = tokio::select! {
            _ = cancel.cancelled() => {
                log.warn(format!("{}: interrupted mid-scrape", profile.name));
                res.secs = started.elapsed().as_secs_f64();
                record_site(&store, &log, &res, terms.len()).await;
                results.push(res);
                break;
            }
            scraped = adapter.scrape(&terms, args.max_pages) => match scraped {
                Ok(r) => r,
                Err(e) => {
                    log.warn(format!("{}: scrape failed: {e:#}", profile.name));
                    res.errors = 1;
                    res.secs = started.elapsed().as_secs_f64();
                    record_site(&store, &log, &res, terms.len()).await;
                    results.push(res);
                    continue;
                }
            }
        };

        res.found = records.len();
        for rec in records {
            let _c = log.span(&RunPhase::Classify).entered();
            let Some(complaint) = classify_record(&rec, &profile.name, &taxonomy, cfg.min_relevance)
            else {
                continue;
            };
            drop(_c);

            let _s = log.span(&RunPhase::Save).entered();
            match store.save(&complaint).await {
                Ok(SaveOutcome::Inserted) => res.saved += 1,
                Ok(SaveOutcome::Duplicate) => res.duplicates += 1,
                Err(e) => {
                    log.warn(format!("{}: save failed for {}: {e:#}", profile.name, complaint.url));
                    res.errors += 1;
                }
            }
        }

        res.secs = started.elapsed().as_secs_f64();
        log.site_summary(&res.site, res.found, res.saved, res.duplicates, res.errors, res.secs);
        record_site(&store, &log, &res, terms.len()).await;
        results.push(res);

        // pacing between sites, cut short on cancellation
        if idx + 1 < site_count {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(cfg.delay_between_sites) => {}
            }
        }
    }

    let totals = results.iter().fold(SiteResult::default(), |mut acc, r| {
        acc.found += r.found;
        acc.saved += r.saved;
        acc.duplicates += r.duplicates;
        acc.errors += r.errors;
        acc
    });
    log.totals(results.len(), totals.found, totals.saved, totals.duplicates, totals.errors);

    // end-of-run report, also written when the run was interrupted
    let _r = log.span(&RunPhase::Report).entered();
    match crate::report::write_final_report(&store, std::path::Path::new("reports")).await {
        Ok(path) => log.info(format!("📄 Report written to {}", path.display())),
        Err(e) => log.warn(format!("report write failed: {e:#}")),
    }
    drop(_r);

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct RunResult {
            interrupted: bool,
            sites: Vec<SiteResult>,
            found: usize,
            saved: usize,
            duplicates: usize,
            errors: usize,
        }
        log.result(&RunResult {
            interrupted: cancel.is_cancelled(),
            sites: results,
            found: totals.found,
            saved: totals.saved,
            duplicates: totals.duplicates,
            errors: totals.errors,
        })?;
    }

    Ok(())
}

async fn record_site(
    store: &Store,
    log: &telemetry::ctx::LogCtx<telemetry::ops::run::Run>,
    res: &SiteResult,
    terms_tried: usize,
) {
    let stats = SiteRunStats {
        site_name: res.site.clone(),
        complaints_found: res.found as i64,
        execution_time_seconds: res.secs,
        success_rate: if terms_tried > 0 { res.saved as f64 / terms_tried as f64 } else { 0.0 },
    };
    if let Err(e) = store.record_run_stats(&stats).await {
        log.warn(format!("{}: stats row failed: {e:#}", res.site));
    }
}

/// Score, filter and normalize one raw record. Returns `None` when the
/// record scores below the relevance threshold.
pub(crate) fn classify_record(
    rec: &RawRecord,
    site: &str,
    taxonomy: &Taxonomy,
    min_relevance: u32,
) -> Option<ClassifiedComplaint> {
    let combined = rec.combined_text();
    let (relevance_score, keywords_found) = classify::score(taxonomy, &combined);
    if relevance_score < min_relevance {
        return None;
    }
    let severity = classify::classify_severity(taxonomy, &combined);

    let title = if rec.title.is_empty() {
        truncate_title(&rec.description, 80)
    } else {
        truncate_title(&rec.title, TITLE_MAX)
    };
    let company_name = if rec.company_name.is_empty() {
        extract_company_name(&combined)
    } else {
        rec.company_name.clone()
    };
    let category =
        if rec.category_text.is_empty() { "Tecnologia".to_string() } else { rec.category_text.clone() };

    Some(ClassifiedComplaint {
        site_source: site.to_string(),
        company_name,
        complaint_date: extract_date(&rec.date_text),
        title,
        description: rec.description.clone(),
        category,
        rating: extract_rating(&rec.rating_text),
        status: rec.status_text.clone(),
        company_response: rec.company_response.clone(),
        url: rec.source_url.clone(),
        keywords_found,
        relevance_score,
        severity,
    })
}
