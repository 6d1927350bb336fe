use anyhow::Context;
use chrono::{Datelike, Utc};
use serde_json::json;
use tracing::info;
use tracing_appender::rolling;

use opsdash::config::Config;
use opsdash::report::FinanceSummary;
use opsdash::storage::{StorageHandle, init_storage};

async fn log_entity_counts(storage: &StorageHandle) -> anyhow::Result<()> {
    let users = storage.get_all_users().await?.len();
    let projects = storage.get_all_projects().await?.len();
    let tasks = storage.get_all_tasks().await?.len();
    let employees = storage.get_all_employees().await?.len();
    let attendance = storage.get_all_attendance().await?.len();

    info!(users, projects, tasks, employees, attendance, "Entity counts");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .pretty()
        .init();

    info!("Starting...");

    let storage = init_storage(&config)
        .await
        .context("failed to initialize storage")?;

    log_entity_counts(&storage).await?;

    let finances = storage.get_all_finances().await?;
    let year = config.report_year.unwrap_or_else(|| Utc::now().year());

    let summary = FinanceSummary::from_transactions(&finances)?;
    let monthly = FinanceSummary::monthly(&finances, year)?;
    info!(transactions = finances.len(), year, "Finance report built");

    let report = json!({
        "backend": storage.backend_name(),
        "summary": summary,
        "breakdown": summary.breakdown(),
        "year": year,
        "monthly": monthly,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
