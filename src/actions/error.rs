use thiserror::Error;

use super::envelope::Envelope;

/// Every way an action can fail. All of them are reported in-band as
/// `{"success": false, "message": ...}`; the display text is the message.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Missing or empty required field.
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    /// Ownership or privacy check failed.
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    /// Same text for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid action")]
    InvalidAction,

    #[error("Error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ActionError {
    fn from(e: serde_json::Error) -> Self {
        ActionError::Unexpected(e.into())
    }
}

impl From<ActionError> for Envelope {
    fn from(e: ActionError) -> Self {
        Envelope::failure(e.to_string())
    }
}

pub type ActionResult<T = Envelope> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_faults_carry_error_prefix_and_chain() {
        let err = anyhow::anyhow!("disk full").context("append row");
        let env: Envelope = ActionError::from(err).into();
        assert!(!env.success);
        assert_eq!(env.message.as_deref(), Some("Error: append row: disk full"));
    }

    #[test]
    fn domain_failures_use_their_message_verbatim() {
        let env: Envelope = ActionError::NotFound("Project not found").into();
        assert_eq!(env.message.as_deref(), Some("Project not found"));

        let env: Envelope = ActionError::InvalidAction.into();
        assert_eq!(env.message.as_deref(), Some("Invalid action"));
    }
}
