//! rankwatch — binary entrypoint.
//! One-shot run: scrape every configured category, merge into the CSV
//! history, export trend tables, email the produced files if SMTP is set up.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rankwatch::config;
use rankwatch::notify::EmailSender;
use rankwatch::runner;
use rankwatch::scrape::oliveyoung::OliveYoungSource;
use rankwatch::store::CsvBackend;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rankwatch=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the vars come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;
    info!(categories = cfg.categories.len(), "starting run");

    let source = OliveYoungSource::new();
    let backend = CsvBackend::new(&cfg.data_dir);
    let report = runner::run_once(&cfg, &source, &backend).await;

    for line in report.summary_lines() {
        info!("{line}");
    }

    match EmailSender::from_env()? {
        Some(sender) => {
            let files = report.produced_files();
            if let Err(e) = sender.send_files(&report.summary_lines(), &files).await {
                warn!("delivery failed: {e:#}");
            } else {
                info!(files = files.len(), "report delivered");
            }
        }
        None => info!("email delivery not configured, skipping"),
    }

    Ok(())
}
