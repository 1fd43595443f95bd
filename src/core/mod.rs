// src/core/mod.rs — Session state and the controller that owns it

pub mod controller;
pub mod instruction;
pub mod session;

pub use controller::{AnalysisController, AnalysisSettings, SubmitOutcome};
pub use session::{Session, SessionPhase};
