// src/cli/progress.rs — Terminal progress renderer driven by Session changes

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::{Session, SessionPhase};

/// Message to print when the session moves from `prev` to `next`, if any.
///
/// Updates can coalesce, so a resolution seen straight from `ImageSelected`
/// still counts as the end of a request.
pub fn transition_message(prev: SessionPhase, next: SessionPhase, model: &str) -> Option<String> {
    if prev == next {
        return None;
    }
    let was_submitted = matches!(prev, SessionPhase::Pending | SessionPhase::ImageSelected);
    match next {
        SessionPhase::Pending => Some(format!("[analyze] waiting for {}...", model)),
        SessionPhase::Done if was_submitted => Some("[analyze] done".into()),
        SessionPhase::Failed if was_submitted => Some("[analyze] failed".into()),
        SessionPhase::Empty if prev == SessionPhase::Pending => {
            Some("[analyze] discarded (session reset)".into())
        }
        _ => None,
    }
}

/// Whether a request that was in flight has been resolved.
fn is_resolution(prev: SessionPhase, next: SessionPhase) -> bool {
    match next {
        SessionPhase::Done | SessionPhase::Failed => true,
        SessionPhase::Empty => prev == SessionPhase::Pending,
        _ => false,
    }
}

/// Watch a session and write transitions to stderr until one request resolves.
///
/// The starting phase is read before the task is spawned, so a change made
/// right after this call is still reported. The task returns the final phase;
/// it also stops if the sender goes away.
/// All progress output goes to stderr so stdout stays clean for the analysis.
pub fn terminal_progress(
    mut rx: watch::Receiver<Session>,
    model: String,
) -> JoinHandle<SessionPhase> {
    let mut prev = rx.borrow_and_update().phase();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().phase();
            if let Some(msg) = transition_message(prev, next, &model) {
                eprintln!("{}", msg);
            }
            if is_resolution(prev, next) {
                return next;
            }
            prev = next;
        }
        prev
    })
}
