// src/core/controller.rs — Image analysis controller
//
// Owns the Session and runs at most one gateway request per submission.
// Every mutation happens inside the watch channel's write closure, so the
// request generation is read and bumped under the same lock as the state.
// A response whose generation is no longer current (the user reset or picked
// another image meanwhile) is dropped on the floor.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use super::instruction::InstructionTemplate;
use super::session::Session;
use crate::gateway::{AnalysisRequest, AnalysisResponse, InferenceGateway, InlineImage};
use crate::image::EncodedImage;
use crate::infra::config::Config;
use crate::infra::errors::PixelScribeError;

/// Fixed inputs of every submission, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub model: String,
    pub instruction: String,
    pub fallback_text: String,
    pub failure_message: String,
    pub decode_failure_message: String,
    pub mime_override: Option<String>,
}

impl AnalysisSettings {
    /// Render the instruction template and collect the user-facing messages.
    pub fn from_config(config: &Config) -> Result<Self, PixelScribeError> {
        let template = InstructionTemplate::from_config(&config.analysis);
        let instruction = template.render(&config.analysis.language, &config.analysis.tone)?;

        Ok(Self {
            model: config.gateway.model.clone(),
            instruction,
            fallback_text: config.analysis.fallback_text.clone(),
            failure_message: config.analysis.failure_message.clone(),
            decode_failure_message: config.analysis.decode_failure_message.clone(),
            mime_override: config
                .gateway
                .mime_override
                .clone()
                .filter(|m| !m.trim().is_empty()),
        })
    }
}

/// What a call to [`AnalysisController::submit_for_analysis`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No image selected; nothing happened.
    NoImage,
    /// A request is already in flight; nothing happened.
    AlreadyPending,
    /// The gateway answered and `analysis` was set.
    Completed,
    /// The gateway failed and `error` was set.
    Failed,
    /// The response arrived after a reset or a new selection and was discarded.
    Superseded,
}

pub struct AnalysisController {
    gateway: Arc<dyn InferenceGateway>,
    settings: AnalysisSettings,
    state: watch::Sender<Session>,
    generation: AtomicU64,
}

impl AnalysisController {
    pub fn new(gateway: Arc<dyn InferenceGateway>, settings: AnalysisSettings) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            gateway,
            settings,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn gateway_id(&self) -> &str {
        self.gateway.id()
    }

    /// Current state.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Select an image from raw bytes.
    pub fn select_image(&self, bytes: &[u8]) {
        self.apply_selection(EncodedImage::from_bytes(bytes));
    }

    /// Select an image from a `data:` URI.
    pub fn select_data_uri(&self, uri: &str) {
        self.apply_selection(EncodedImage::from_data_uri(uri));
    }

    /// Read and select an image file.
    ///
    /// If a reset or another selection lands while the file is being read,
    /// the read result is dropped.
    pub async fn select_image_file(&self, path: &Path) {
        let ticket = self.generation.load(Ordering::SeqCst);
        let result = EncodedImage::from_file(path).await;

        let applied = self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            self.replace_image(s, &result);
            true
        });

        if !applied {
            tracing::debug!(
                path = %path.display(),
                "discarding file read overtaken by a newer action"
            );
        } else {
            self.log_selection(&result);
        }
    }

    /// Send the selected image to the gateway and record the outcome.
    ///
    /// `loading` is cleared when this returns, and also if the returned
    /// future is dropped before the gateway answers.
    pub async fn submit_for_analysis(&self) -> SubmitOutcome {
        let mut claim: Result<(u64, EncodedImage), SubmitOutcome> =
            Err(SubmitOutcome::NoImage);
        self.state.send_if_modified(|s| {
            if s.loading {
                claim = Err(SubmitOutcome::AlreadyPending);
                return false;
            }
            let Some(image) = s.image.clone() else {
                return false;
            };
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            s.loading = true;
            s.clear_result();
            claim = Ok((generation, image));
            true
        });

        let (generation, image) = match claim {
            Ok(claimed) => claimed,
            Err(outcome) => {
                tracing::debug!(?outcome, "submit ignored");
                return outcome;
            }
        };

        let mut in_flight = InFlight {
            controller: self,
            generation,
            settled: false,
        };

        let request = self.build_request(&image);
        tracing::info!(
            gateway = self.gateway.id(),
            model = %request.model,
            mime_type = %request.image.mime_type,
            generation,
            "submitting image for analysis"
        );

        let result = self.gateway.analyze(request).await;
        let outcome = self.settle(generation, result);
        in_flight.settled = true;
        outcome
    }

    /// Back to an empty Session. Any in-flight response will be discarded.
    pub fn reset(&self) {
        self.state.send_if_modified(|s| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let changed = *s != Session::default();
            *s = Session::default();
            changed
        });
        tracing::debug!("session reset");
    }

    fn build_request(&self, image: &EncodedImage) -> AnalysisRequest {
        let mime_type = self
            .settings
            .mime_override
            .clone()
            .unwrap_or_else(|| image.mime_type.clone());

        AnalysisRequest {
            model: self.settings.model.clone(),
            image: InlineImage {
                mime_type,
                data: image.payload().to_string(),
            },
            instruction: self.settings.instruction.clone(),
        }
    }

    fn apply_selection(&self, result: Result<EncodedImage, PixelScribeError>) {
        self.state.send_modify(|s| self.replace_image(s, &result));
        self.log_selection(&result);
    }

    /// Caller holds the state lock.
    fn replace_image(&self, s: &mut Session, result: &Result<EncodedImage, PixelScribeError>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        s.loading = false;
        s.clear_result();
        match result {
            Ok(image) => s.image = Some(image.clone()),
            Err(_) => {
                s.image = None;
                s.error = Some(self.settings.decode_failure_message.clone());
            }
        }
    }

    fn log_selection(&self, result: &Result<EncodedImage, PixelScribeError>) {
        match result {
            Ok(image) if !image.is_recognized_image() => tracing::warn!(
                bytes = image.byte_len,
                "selected file does not look like a known image format"
            ),
            Ok(image) => tracing::debug!(
                mime_type = %image.mime_type,
                bytes = image.byte_len,
                "image selected"
            ),
            Err(e) => tracing::warn!(error = %e, "image could not be decoded"),
        }
    }

    fn settle(
        &self,
        generation: u64,
        result: Result<AnalysisResponse, PixelScribeError>,
    ) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::Superseded;
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match &result {
                Ok(resp) if resp.text.trim().is_empty() => {
                    s.analysis = self.settings.fallback_text.clone();
                    outcome = SubmitOutcome::Completed;
                }
                Ok(resp) => {
                    s.analysis = resp.text.clone();
                    outcome = SubmitOutcome::Completed;
                }
                Err(_) => {
                    s.analysis.clear();
                    s.error = Some(self.settings.failure_message.clone());
                    outcome = SubmitOutcome::Failed;
                }
            }
            s.loading = false;
            true
        });

        match (&outcome, &result) {
            (SubmitOutcome::Superseded, _) => {
                tracing::debug!(generation, "discarding stale gateway response");
            }
            (_, Ok(resp)) => tracing::info!(
                chars = resp.text.len(),
                tokens = resp.usage.total(),
                finish_reason = ?resp.finish_reason,
                "analysis complete"
            ),
            (_, Err(e)) => tracing::warn!(
                gateway = self.gateway.id(),
                error = %e,
                "image analysis failed"
            ),
        }
        outcome
    }

    /// Clear `loading` for a request whose future was dropped.
    fn abandon(&self, generation: u64) {
        let cleared = self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation || !s.loading {
                return false;
            }
            s.loading = false;
            true
        });
        if cleared {
            tracing::debug!(generation, "in-flight analysis dropped");
        }
    }
}

/// Clears `loading` if the submitting future goes away before settling.
struct InFlight<'a> {
    controller: &'a AnalysisController,
    generation: u64,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon(self.generation);
        }
    }
}
