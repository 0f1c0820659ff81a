use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::load_sites;
use crate::telemetry::{self};
use crate::telemetry::ops::sites::Phase as SitesPhase;

/// `techwatch sites ...`
#[derive(Args)]
pub struct SitesCmd {
    #[command(subcommand)]
    pub cmd: SitesSub,
}

#[derive(Subcommand)]
pub enum SitesSub {
    /// List configured sites
    Ls {
        #[arg(long, default_value = "sites_config.txt")]
        config: PathBuf,
        #[arg(long)]
        enabled_only: bool,
    },
}

pub async fn run(args: SitesCmd) -> Result<()> {
    let log = telemetry::sites();
    match args.cmd {
        SitesSub::Ls { config, enabled_only } => {
            let _g = log
                .root_span_kv([
                    ("config", config.display().to_string()),
                    ("enabled_only", enabled_only.to_string()),
                ])
                .entered();

            let _l = log.span(&SitesPhase::Load).entered();
            let mut sites = load_sites(&config)?;
            if enabled_only {
                sites.retain(|s| s.enabled);
            }
            drop(_l);

            let _s = log.span(&SitesPhase::List).entered();
            log.info(format!("🌐 Sites ({}):", sites.len()));
            for s in &sites {
                log.info(format!(
                    "  {:<18} enabled={:<5} mode={:?} {}",
                    s.name, s.enabled, s.fetch_mode, s.search_url
                ));
            }

            if telemetry::config::json_mode() {
                log.result(&sites)?;
            }
        }
    }
    Ok(())
}
