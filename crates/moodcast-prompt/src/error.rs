//! Error types for the prompt engine.
//!
//! Collaborator errors never escape a prompt cycle: signal errors degrade to
//! unknown context, sourcing errors become a `generation_error` suppression,
//! and notifier errors mean "not sent". Only the management operations
//! (dismiss, settings) surface `PromptError`.

use moodcast_core::error::MoodcastError;
use uuid::Uuid;

/// Transport failure of a context signal source.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Signal source unreachable: {0}")]
    Transport(String),
    #[error("Signal source timed out after {0} seconds")]
    Timeout(u64),
}

/// Failure of the external candidate sourcer.
#[derive(Debug, thiserror::Error)]
pub enum SourcingError {
    #[error("Candidate sourcer unavailable: {0}")]
    Unavailable(String),
    #[error("Candidate sourcing timed out after {0} seconds")]
    Timeout(u64),
    #[error("Candidate sourcer returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Failure to deliver a prompt notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Errors from prompt state management.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Storage error: {0}")]
    Storage(#[from] MoodcastError),
    #[error("Trigger log entry not found: {0}")]
    EntryNotFound(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_error_display() {
        let err = SignalError::Transport("dns failure".to_string());
        assert_eq!(err.to_string(), "Signal source unreachable: dns failure");
        let err = SignalError::Timeout(5);
        assert_eq!(err.to_string(), "Signal source timed out after 5 seconds");
    }

    #[test]
    fn test_sourcing_error_display() {
        let err = SourcingError::Unavailable("503".to_string());
        assert_eq!(err.to_string(), "Candidate sourcer unavailable: 503");
        let err = SourcingError::Timeout(30);
        assert_eq!(
            err.to_string(),
            "Candidate sourcing timed out after 30 seconds"
        );
        let err = SourcingError::InvalidResponse("missing tracks".to_string());
        assert!(err.to_string().ends_with("missing tracks"));
    }

    #[test]
    fn test_prompt_error_from_moodcast_error() {
        let storage_err = MoodcastError::Storage("disk full".to_string());
        let prompt_err: PromptError = storage_err.into();
        assert!(matches!(prompt_err, PromptError::Storage(_)));
        assert!(prompt_err.to_string().contains("disk full"));
    }

    #[test]
    fn test_entry_not_found_preserves_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let err = PromptError::EntryNotFound(id);
        assert_eq!(
            err.to_string(),
            "Trigger log entry not found: 550e8400-e29b-41d4-a716-446655440000"
        );
    }
}
