// src/cli/session.rs — Interactive session: the controller behind a menu

use std::path::PathBuf;

use super::render::render_session;
use crate::core::{AnalysisController, Session, SessionPhase, SubmitOutcome};

/// Menu entries that make sense for the current phase.
pub fn available_actions(s: &Session) -> Vec<&'static str> {
    let mut actions = vec!["Select image"];
    if s.has_image() && !s.loading {
        actions.push(if s.phase() == SessionPhase::Failed {
            "Retry analysis"
        } else {
            "Analyze"
        });
    }
    if s.phase() != SessionPhase::Empty {
        actions.push("Reset");
    }
    actions.push("Show");
    actions.push("Quit");
    actions
}

pub async fn run_session(controller: &AnalysisController) -> anyhow::Result<()> {
    eprintln!(
        "pixelscribe session ({} / {}). Ctrl-C during analysis resets the session.",
        controller.gateway_id(),
        controller.settings().model
    );

    loop {
        let snapshot = controller.snapshot();
        eprintln!("{}", render_session(&snapshot, false));

        let choice = inquire::Select::new("Action:", available_actions(&snapshot))
            .prompt()
            .unwrap_or("Quit");

        match choice {
            "Select image" => {
                let path = inquire::Text::new("Image path:")
                    .with_help_message("Press Esc to cancel")
                    .prompt();
                let Ok(path) = path else { continue };
                let path = PathBuf::from(path.trim());
                controller.select_image_file(&path).await;
            }
            "Analyze" | "Retry analysis" => {
                eprintln!("Analyzing with {}...", controller.settings().model);
                tokio::select! {
                    outcome = controller.submit_for_analysis() => {
                        tracing::debug!(?outcome, "interactive submit finished");
                        if outcome == SubmitOutcome::Completed {
                            println!("{}", render_session(&controller.snapshot(), false));
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        controller.reset();
                        eprintln!("Session reset.");
                    }
                }
            }
            "Reset" => controller.reset(),
            "Show" => println!("{}", render_session(&controller.snapshot(), false)),
            _ => break,
        }
    }
    Ok(())
}
