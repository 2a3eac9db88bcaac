//! Error types for the form session

use crate::state::FormType;
use thiserror::Error;

/// Failures surfaced by form session operations.
///
/// None of these are fatal: the shell turns each one into a toast and keeps
/// the session running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("failed to load {form_type} configuration: {message}")]
    ConfigFetch { form_type: FormType, message: String },

    #[error("loading {form_type} configuration timed out after {timeout_ms}ms")]
    FetchTimeout { form_type: FormType, timeout_ms: u64 },

    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("no form configuration is loaded")]
    NoActiveForm,

    #[error("entry {0} not found")]
    EntryNotFound(String),
}

impl FormError {
    /// Message shown to the user for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConfigFetch { .. } => "Failed to load form configuration",
            Self::FetchTimeout { .. } => "Timed out loading form configuration",
            Self::Validation { .. } => "Please fill in all required fields",
            Self::NoActiveForm => "No form is loaded yet",
            Self::EntryNotFound(_) => "Entry no longer exists",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_lists_missing_fields() {
        let err = FormError::Validation {
            missing: vec!["email".to_string(), "name".to_string()],
        };
        assert_eq!(err.to_string(), "missing required fields: email, name");
    }

    #[test]
    fn test_fetch_errors_name_the_form_type() {
        let err = FormError::FetchTimeout {
            form_type: FormType::Payment,
            timeout_ms: 250,
        };
        assert_eq!(
            err.to_string(),
            "loading payment configuration timed out after 250ms"
        );
        assert_eq!(err.user_message(), "Timed out loading form configuration");
    }

    #[test]
    fn test_config_fetch_user_message() {
        let err = FormError::ConfigFetch {
            form_type: FormType::Address,
            message: "boom".to_string(),
        };
        assert_eq!(err.user_message(), "Failed to load form configuration");
    }
}
