use std::process::ExitCode;
use std::sync::Arc;

use broadcaster::SendOrchestrator;
use brief_core::Mailer;
use brief_jobs::JobsConfig;
use database::activity;
use mailer::MailTransport;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    brief_jobs::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Brief send failed");
            println!("Brief send failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = JobsConfig::from_env();
    let db = Arc::new(brief_jobs::open_database(&config).await?);

    let transport = MailTransport::from_env()?;
    println!("Sending via {}", transport.name());

    let orchestrator = SendOrchestrator::new(db.clone(), db.clone(), Arc::new(transport))
        .with_delay(config.send_delay);

    let report = orchestrator.send_pending().await?;

    match report.brief_id {
        None => println!("No unsent brief for today, nothing to do"),
        Some(id) if report.total == 0 => println!("Brief {}: no recipients, nothing sent", id),
        Some(id) => {
            println!(
                "Brief {}: sent {}, failed {}, total {}",
                id, report.sent, report.failed, report.total
            );
            for err in &report.errors {
                println!("  failed: {}", err);
            }
            let detail = format!(
                "brief {}: sent {}, failed {}, total {}",
                id, report.sent, report.failed, report.total
            );
            brief_jobs::log_activity(&db, activity::BRIEF_SENT, &detail).await;
        }
    }

    db.close().await;
    Ok(())
}
