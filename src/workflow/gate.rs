//! Gating state for the single action button, and the labels of the two
//! stateful buttons.

use serde::Serialize;

/// Everything that must hold before a batch may start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowGate {
    pub ai_key_valid: bool,
    pub signed_in: bool,
    pub file_uploaded: bool,
    pub location_required: bool,
    pub location_details: Option<String>,
}

impl WorkflowGate {
    pub fn new(location_required: bool, location_details: Option<String>) -> Self {
        Self {
            location_required,
            location_details,
            ..Self::default()
        }
    }

    fn location_ok(&self) -> bool {
        !self.location_required
            || self
                .location_details
                .as_deref()
                .is_some_and(|details| !details.trim().is_empty())
    }

    pub fn can_start(&self) -> bool {
        self.ai_key_valid && self.signed_in && self.file_uploaded && self.location_ok()
    }

    /// Names of the conditions still unmet, for user feedback.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.ai_key_valid {
            missing.push("a validated AI key");
        }
        if !self.signed_in {
            missing.push("sign-in");
        }
        if !self.file_uploaded {
            missing.push("an uploaded file");
        }
        if !self.location_ok() {
            missing.push("location details");
        }
        missing
    }

    /// Trimmed location context, if any.
    pub fn location_context(&self) -> Option<&str> {
        self.location_details
            .as_deref()
            .map(str::trim)
            .filter(|details| !details.is_empty())
    }
}

/// Sign-in button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum SessionButton {
    #[default]
    Idle,
    SigningIn,
    SignedIn { full_name: Option<String> },
    Failed,
}

impl SessionButton {
    pub fn label(&self) -> String {
        match self {
            SessionButton::Idle => "Check Credentials".to_string(),
            SessionButton::SigningIn => "Signing in...".to_string(),
            SessionButton::SignedIn {
                full_name: Some(name),
            } => format!("Signed into AGOL as {name}"),
            SessionButton::SignedIn { full_name: None } => "Signed into AGOL".to_string(),
            SessionButton::Failed => "Try Sign In Again".to_string(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionButton::SignedIn { .. })
    }
}

/// The Geocode action button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ActionButton {
    #[default]
    Idle,
    Working,
    Complete,
    Failed,
}

impl ActionButton {
    pub fn label(&self) -> &'static str {
        match self {
            ActionButton::Idle => "Geocode",
            ActionButton::Working => "Working",
            ActionButton::Complete => "Complete",
            ActionButton::Failed => "Try Again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_gate() -> WorkflowGate {
        WorkflowGate {
            ai_key_valid: true,
            signed_in: true,
            file_uploaded: true,
            ..WorkflowGate::default()
        }
    }

    #[test]
    fn all_three_flags_open_the_gate() {
        assert!(open_gate().can_start());
        for flip in 0..3 {
            let mut gate = open_gate();
            match flip {
                0 => gate.ai_key_valid = false,
                1 => gate.signed_in = false,
                _ => gate.file_uploaded = false,
            }
            assert!(!gate.can_start());
            assert_eq!(gate.missing().len(), 1);
        }
    }

    #[test]
    fn required_location_must_be_non_blank() {
        let mut gate = open_gate();
        gate.location_required = true;
        assert!(!gate.can_start());
        gate.location_details = Some("   ".to_string());
        assert!(!gate.can_start());
        assert_eq!(gate.missing(), vec!["location details"]);
        gate.location_details = Some(" Marion, IN ".to_string());
        assert!(gate.can_start());
        assert_eq!(gate.location_context(), Some("Marion, IN"));
    }

    #[test]
    fn session_labels() {
        assert_eq!(SessionButton::Idle.label(), "Check Credentials");
        assert_eq!(
            SessionButton::SignedIn {
                full_name: Some("Jo Doe".into())
            }
            .label(),
            "Signed into AGOL as Jo Doe"
        );
        assert_eq!(SessionButton::Failed.label(), "Try Sign In Again");
    }
}
