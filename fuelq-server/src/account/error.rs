//! Account error types.
//!
//! The display text of every variant is the message shown next to the form
//! that failed.

use crate::auth::AuthError;
use crate::realtime::RealtimeError;
use crate::session::SessionError;

use super::validate::SignupIssue;

/// Errors from account actions.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Login submitted with an empty field
    #[error("Both fields are required")]
    MissingCredentials,

    /// Wrong email or password
    #[error("Invalid Email or Password!")]
    InvalidCredentials,

    /// Credentials are right but the email was never verified
    #[error("Please verify your email before logging in.")]
    Unverified,

    /// Signup or profile form failed validation
    #[error("{0}")]
    Invalid(#[from] SignupIssue),

    /// Signup with an email that already has an account
    #[error("This email is already registered. Please use a different email.")]
    EmailExists,

    /// Account created but the display name could not be set
    #[error("Failed to update user profile.")]
    ProfileUpdate(#[source] AuthError),

    /// Account created but the verification email was not sent
    #[error("Failed to send verification email. Please try again.")]
    Verification(#[source] AuthError),

    /// Writing user details to the database failed
    #[error("Failed to save user details. Please try again.")]
    SaveDetails(#[source] RealtimeError),

    /// Report with a missing field
    #[error("Please fill in all fields.")]
    IncompleteReport,

    /// Report category outside the known set
    #[error("Unknown report category: {0}")]
    UnknownReportCategory(String),

    /// Writing the report to the database failed
    #[error("Failed to submit report. Please try again.")]
    SubmitReport(#[source] RealtimeError),

    /// Action needs a logged-in user
    #[error("Please log in first.")]
    NotLoggedIn,

    /// Any other identity provider failure
    #[error("{0}")]
    Auth(#[source] AuthError),

    /// Persisting the login flag failed
    #[error("{0}")]
    Session(#[from] SessionError),
}

impl AccountError {
    /// Whether the user can fix this by changing what they typed.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            AccountError::MissingCredentials
                | AccountError::Invalid(_)
                | AccountError::EmailExists
                | AccountError::IncompleteReport
                | AccountError::UnknownReportCategory(_)
        )
    }

    /// Whether the failure is about who the user is.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            AccountError::InvalidCredentials | AccountError::Unverified | AccountError::NotLoggedIn
        )
    }
}
