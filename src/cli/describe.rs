// src/cli/describe.rs — One-shot command: select a file, analyze it, print the result

use std::path::Path;
use std::time::Duration;

use super::progress::terminal_progress;
use super::render::{markdown_to_terminal, SessionView};
use crate::core::{AnalysisController, SubmitOutcome};

const PROGRESS_DRAIN: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default)]
pub struct DescribeOptions {
    pub raw: bool,
    pub json: bool,
    pub quiet: bool,
}

/// Run select + submit against `path` and print the analysis on stdout.
pub async fn run_describe(
    controller: &AnalysisController,
    path: &Path,
    opts: DescribeOptions,
) -> anyhow::Result<()> {
    controller.select_image_file(path).await;
    if let Some(err) = controller.snapshot().error {
        anyhow::bail!("{}: {}", path.display(), err);
    }

    let progress = if opts.quiet {
        None
    } else {
        Some(terminal_progress(
            controller.subscribe(),
            controller.settings().model.clone(),
        ))
    };

    let outcome = controller.submit_for_analysis().await;
    if let Some(mut handle) = progress {
        // Settled outcomes leave a resolution in the channel; let it print first.
        let settled = matches!(
            outcome,
            SubmitOutcome::Completed | SubmitOutcome::Failed | SubmitOutcome::Superseded
        );
        if !settled
            || tokio::time::timeout(PROGRESS_DRAIN, &mut handle)
                .await
                .is_err()
        {
            handle.abort();
        }
    }

    let session = controller.snapshot();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&SessionView::from(&session))?);
    }

    match outcome {
        SubmitOutcome::Completed => {
            if !opts.json {
                if opts.raw {
                    println!("{}", session.analysis.trim());
                } else {
                    println!("{}", markdown_to_terminal(&session.analysis));
                }
            }
            Ok(())
        }
        SubmitOutcome::Failed => {
            let msg = session.error.unwrap_or_else(|| "analysis failed".into());
            anyhow::bail!(msg)
        }
        other => anyhow::bail!("analysis did not run ({:?})", other),
    }
}
