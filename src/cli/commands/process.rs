//! Process command implementation.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::job::JobStatus;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::PathBuf;

/// Run the process command.
pub async fn run_process(
    file: &str,
    locales: &[String],
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let path = PathBuf::from(shellexpand::tilde(file).as_ref());

    // Pre-flight checks
    if let Err(e) = preflight::check_file(&path, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lectio doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!("Processing: {}", path.display()));

    let progress = Output::progress_bar(0, "segments");
    let orchestrator = Orchestrator::new(settings)?.with_progress(progress.clone());

    let outcome = orchestrator.process_file(&path, locales).await;
    progress.finish_and_clear();

    Output::job(&outcome.job);

    if outcome.job.status() != JobStatus::Done {
        let reason = outcome.job.error().unwrap_or("unknown error").to_string();
        return Err(anyhow::anyhow!("Job failed: {}", reason));
    }

    if let Some(result) = &outcome.result {
        Output::result_digest(result);

        if let Some(output_path) = output {
            let json = serde_json::to_string_pretty(result)?;
            std::fs::write(&output_path, json)?;
            Output::success(&format!("Result written to {}", output_path));
        }

        if result.is_degraded() {
            Output::warning("Some generation calls failed; their entries carry the error.");
        }
    }

    Ok(())
}
