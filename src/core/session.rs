// src/core/session.rs — The single unit of mutable state behind the controller

use serde::Serialize;

use crate::image::EncodedImage;

/// Everything a rendering surface needs to draw the current screen.
///
/// Only the controller mutates a `Session`; surfaces receive clones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub image: Option<EncodedImage>,
    pub analysis: String,
    pub loading: bool,
    pub error: Option<String>,
}

/// Derived, coarse view of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    ImageSelected,
    Pending,
    Done,
    Failed,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Pending
        } else if self.error.is_some() {
            SessionPhase::Failed
        } else if !self.analysis.is_empty() {
            SessionPhase::Done
        } else if self.image.is_some() {
            SessionPhase::ImageSelected
        } else {
            SessionPhase::Empty
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub(crate) fn clear_result(&mut self) {
        self.analysis.clear();
        self.error = None;
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionPhase::Empty => "empty",
            SessionPhase::ImageSelected => "image selected",
            SessionPhase::Pending => "analyzing",
            SessionPhase::Done => "done",
            SessionPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}
