use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::env;

mod classify;
mod config;
mod export;
mod fetch;
mod init;
mod report;
mod run;
mod scrape;
mod sites;
mod stats;
mod store;
mod taxonomy;
mod telemetry;
mod util;

const DEFAULT_DSN: &str = "sqlite://ti_complaints.db";

#[derive(Parser)]
#[command(name = "techwatch", about = "Multi-site technology complaint scraper")]
struct Cli {
    /// Database URL; falls back to DATABASE_URL, then a local sqlite file
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Init(init::InitCmd),
    Sites(sites::SitesCmd),
    Run(run::RunCmd),
    Stats(stats::StatsCmd),
    Export(export::ExportCmd),
    Report(report::ReportCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);
    telemetry::config::init_tracing();

    let dsn = cli
        .dsn
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DSN.to_string());

    match cli.command {
        // sites ls never touches the database
        Commands::Sites(args) => sites::run(args).await?,
        command => {
            let pool = init::connect(&dsn).await?;
            init::ensure_schema(&pool).await?;
            match command {
                Commands::Init(args) => init::run(&pool, args).await?,
                Commands::Run(args) => run::run(&pool, args).await?,
                Commands::Stats(args) => stats::run(&pool, args).await?,
                Commands::Export(args) => export::run(&pool, args).await?,
                Commands::Report(args) => report::run(&pool, args).await?,
                Commands::Sites(_) => unreachable!(),
            }
        }
    }

    Ok(())
}
