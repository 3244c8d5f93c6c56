use std::process::ExitCode;
use std::sync::Arc;

use brief_builder::{BriefAggregator, BuildOutcome, ProgramRegistry};
use brief_jobs::JobsConfig;
use database::activity;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    brief_jobs::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Brief build failed");
            println!("Brief build failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = JobsConfig::from_env();
    let db = Arc::new(brief_jobs::open_database(&config).await?);

    let registry = ProgramRegistry::standard();
    println!("Building brief for {} programs", registry.len());

    let aggregator = BriefAggregator::new(
        registry,
        config.classifier(),
        db.clone(),
        db.clone(),
        brief_jobs::select_analyzer(),
    );

    match aggregator.build().await? {
        BuildOutcome::Built {
            id,
            sections,
            item_count,
        } => {
            println!("Built brief {}: {} sections, {} items", id, sections, item_count);
            let detail = format!("brief {}: {} sections, {} items", id, sections, item_count);
            brief_jobs::log_activity(&db, activity::BRIEF_BUILT, &detail).await;
        }
        BuildOutcome::AlreadyBuilt => println!("Brief already built today, nothing to do"),
        BuildOutcome::NothingToReport => println!("No new items today, no brief built"),
    }

    db.close().await;
    Ok(())
}
