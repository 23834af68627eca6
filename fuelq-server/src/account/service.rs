//! Account actions: login, signup, logout, profile and reports.

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, Authenticator};
use crate::realtime::{KeyValueStore, RealtimeError, sanitize_key};
use crate::session::{Session, SessionStore};

use super::error::AccountError;
use super::report::Report;
use super::validate::{SignupForm, SignupIssue, validate_signup};

/// Root of per-user profile records.
const USER_DETAILS: &str = "UserDetails";

/// Root of submitted reports.
const REPORTS: &str = "Reports";

/// Shown after a successful signup.
pub const VERIFICATION_SENT: &str =
    "Verification link sent to your email. Please verify before logging in.";

/// A successful login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedIn {
    pub email: String,
    pub display_name: Option<String>,
}

/// Account actions over an identity provider, a realtime database and the
/// local session file.
pub struct AccountService<A, K> {
    auth: A,
    database: K,
    session: SessionStore,
}

impl<A: Authenticator, K: KeyValueStore> AccountService<A, K> {
    pub fn new(auth: A, database: K, session: SessionStore) -> Self {
        Self {
            auth,
            database,
            session,
        }
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn database(&self) -> &K {
        &self.database
    }

    /// The session as currently persisted.
    pub fn session(&self) -> Session {
        self.session.load()
    }

    /// Sign in and remember the user.
    ///
    /// Accounts whose email is not verified are refused; nothing is
    /// remembered for them.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoggedIn, AccountError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }

        let signed_in = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(|e| match e {
                AuthError::InvalidCredentials | AuthError::UserDisabled => {
                    AccountError::InvalidCredentials
                }
                other => AccountError::Auth(other),
            })?;

        let account = self
            .auth
            .lookup(&signed_in.id_token)
            .await
            .map_err(AccountError::Auth)?;

        if !account.email_verified {
            // The ID token is dropped here, which is all signing out takes.
            debug!(email, "refusing login for unverified email");
            return Err(AccountError::Unverified);
        }

        self.session.log_in(email).await?;
        info!(email, "logged in");

        Ok(LoggedIn {
            email: email.to_string(),
            display_name: account.display_name.or(signed_in.display_name),
        })
    }

    /// Create an account, name it, send the verification email and record
    /// the user's details.
    pub async fn signup(&self, form: &SignupForm) -> Result<(), AccountError> {
        validate_signup(form)?;

        let email = form.email.trim();
        let name = form.name.trim();

        let signed_in = self
            .auth
            .sign_up(email, &form.password)
            .await
            .map_err(|e| match e {
                AuthError::EmailExists => AccountError::EmailExists,
                other => AccountError::Auth(other),
            })?;

        self.auth
            .update_display_name(&signed_in.id_token, name)
            .await
            .map_err(AccountError::ProfileUpdate)?;

        self.auth
            .send_verification(&signed_in.id_token)
            .await
            .map_err(AccountError::Verification)?;

        self.write_details(email, name).await?;
        info!(email, "account created, verification sent");
        Ok(())
    }

    /// Forget the logged-in user.
    pub async fn logout(&self) -> Result<(), AccountError> {
        self.session.log_out().await?;
        info!("logged out");
        Ok(())
    }

    /// Save the logged-in user's display name.
    pub async fn save_profile(&self, name: &str) -> Result<(), AccountError> {
        let email = self.current_user()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SignupIssue::NameRequired.into());
        }

        self.write_details(&email, name).await?;
        info!(email = %email, "profile saved");
        Ok(())
    }

    /// File a report from the logged-in user. Returns the report's key.
    pub async fn submit_report(&self, category: &str, description: &str) -> Result<String, AccountError> {
        let email = self.current_user()?;
        let report = Report::new(category, description, &email)?;

        let value = serde_json::to_value(&report).map_err(|e| {
            AccountError::SubmitReport(RealtimeError::Json {
                message: e.to_string(),
            })
        })?;

        let key = self
            .database
            .push(REPORTS, &value)
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to store report");
                AccountError::SubmitReport(e)
            })?;

        info!(email = %email, category = %report.category, key = %key, "report submitted");
        Ok(key)
    }

    fn current_user(&self) -> Result<String, AccountError> {
        self.session
            .load()
            .user()
            .map(str::to_string)
            .ok_or(AccountError::NotLoggedIn)
    }

    async fn write_details(&self, email: &str, name: &str) -> Result<(), AccountError> {
        let path = format!("{USER_DETAILS}/{}", sanitize_key(email));
        self.database
            .set(&path, &json!({ "Name": name }))
            .await
            .map_err(|e| {
                warn!(email, error = %e, "failed to save user details");
                AccountError::SaveDetails(e)
            })
    }
}
