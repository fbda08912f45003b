//! The controller: one owned [`Session`] holding the gate, the dropped
//! files, the button states and the processing log.

pub mod gate;
pub mod log;
pub mod pipeline;

pub use gate::{ActionButton, SessionButton, WorkflowGate};
pub use log::ProcessingLog;
pub use pipeline::{BatchOutcome, FileReport, FileStatus, Pipeline};

use crate::arcgis::Credential;
use crate::error::Result;
use crate::intake::{IntakeError, IntakeOutcome, UploadedFile};

/// Result of clicking the action button.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The gate was closed; nothing happened.
    NotReady(Vec<&'static str>),
    /// The button read "Complete": log and files were cleared.
    Cleared,
    /// No token was available; the run did not start.
    NoToken,
    Ran(BatchOutcome),
}

#[derive(Debug, Default)]
pub struct Session {
    pub gate: WorkflowGate,
    pub session_button: SessionButton,
    pub action: ActionButton,
    pub log: ProcessingLog,
    files: Vec<UploadedFile>,
    intake_message: Option<String>,
    last_sign_in_failed: bool,
}

impl Session {
    pub fn new(gate: WorkflowGate, log: ProcessingLog) -> Self {
        Self {
            gate,
            log,
            ..Self::default()
        }
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn intake_message(&self) -> Option<&str> {
        self.intake_message.as_deref()
    }

    /// The action button is shown only while the gate is open.
    pub fn action_visible(&self) -> bool {
        self.gate.can_start()
    }

    pub fn set_location_details(&mut self, details: Option<String>) {
        self.gate.location_details = details;
    }

    pub fn record_ai_check(&mut self, result: &Result<String>) {
        self.gate.ai_key_valid = result.is_ok();
    }

    pub fn begin_sign_in(&mut self) {
        self.session_button = SessionButton::SigningIn;
    }

    pub fn record_sign_in(&mut self, result: &Result<Credential>) {
        match result {
            Ok(credential) => {
                self.last_sign_in_failed = false;
                self.gate.signed_in = true;
                self.session_button = SessionButton::SignedIn {
                    full_name: credential.full_name.clone(),
                };
            }
            Err(_) => {
                self.last_sign_in_failed = true;
                self.gate.signed_in = false;
                self.session_button = SessionButton::Failed;
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.gate.signed_in = false;
        self.session_button = if self.last_sign_in_failed {
            SessionButton::Failed
        } else {
            SessionButton::Idle
        };
    }

    /// Take the result of a drop. Any failure empties the file list and
    /// closes the gate. Returns the message to show.
    pub fn record_drop(
        &mut self,
        result: std::result::Result<IntakeOutcome, IntakeError>,
    ) -> String {
        let message = match result {
            Ok(outcome) => {
                self.files = outcome.files;
                outcome.message
            }
            Err(e) => {
                self.files.clear();
                e.to_string()
            }
        };
        self.gate.file_uploaded = !self.files.is_empty();
        self.intake_message = Some(message.clone());
        message
    }

    /// Click the action button.
    pub async fn click_action(
        &mut self,
        pipeline: &Pipeline,
        token: Option<&str>,
    ) -> ActionOutcome {
        if self.action == ActionButton::Complete {
            self.log.clear();
            self.files.clear();
            self.intake_message = None;
            self.gate.file_uploaded = false;
            self.action = ActionButton::Idle;
            return ActionOutcome::Cleared;
        }
        if !self.gate.can_start() {
            return ActionOutcome::NotReady(self.gate.missing());
        }

        self.action = ActionButton::Working;
        self.log.clear();
        let Some(token) = token else {
            self.log.push("  Error: Could not get AGOL token.");
            self.action = ActionButton::Failed;
            return ActionOutcome::NoToken;
        };

        let context = self.gate.location_context().map(str::to_string);
        let outcome = pipeline
            .run(&self.files, token, context.as_deref(), &mut self.log)
            .await;
        self.action = ActionButton::Complete;
        ActionOutcome::Ran(outcome)
    }
}
