//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Authenticator;
use super::error::AuthError;
use super::types::{AccountInfo, SignedIn};

/// Prefix of the ID tokens handed out; the rest of the token is the email.
const TOKEN_PREFIX: &str = "memory-token:";

#[derive(Debug, Clone)]
struct Account {
    password: String,
    verified: bool,
    display_name: Option<String>,
}

/// Password accounts held in a map keyed by email.
#[derive(Debug, Default)]
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    verifications_sent: Mutex<Vec<String>>,
    fail_verification: AtomicBool,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account directly.
    pub fn add_account(&self, email: &str, password: &str, verified: bool) {
        let mut accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                verified,
                display_name: None,
            },
        );
    }

    /// Make every verification email fail to send.
    pub fn fail_verification(&self) {
        self.fail_verification.store(true, Ordering::SeqCst);
    }

    /// Emails a verification link was sent to, oldest first.
    pub fn verifications_sent(&self) -> Vec<String> {
        self.verifications_sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn display_name(&self, email: &str) -> Option<String> {
        let accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        accounts.get(email).and_then(|a| a.display_name.clone())
    }

    fn email_of(token: &str) -> Result<&str, AuthError> {
        token.strip_prefix(TOKEN_PREFIX).ok_or(AuthError::InvalidToken)
    }

    fn signed_in(email: &str, account: &Account) -> SignedIn {
        SignedIn {
            id_token: format!("{TOKEN_PREFIX}{email}"),
            local_id: format!("uid-{email}"),
            email: email.to_string(),
            display_name: account.display_name.clone(),
        }
    }
}

impl Authenticator for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(Self::signed_in(email, account)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        if accounts.contains_key(email) {
            return Err(AuthError::EmailExists);
        }
        let account = Account {
            password: password.to_string(),
            verified: false,
            display_name: None,
        };
        let signed_in = Self::signed_in(email, &account);
        accounts.insert(email.to_string(), account);
        Ok(signed_in)
    }

    async fn lookup(&self, id_token: &str) -> Result<AccountInfo, AuthError> {
        let email = Self::email_of(id_token)?;
        let accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        let account = accounts.get(email).ok_or(AuthError::InvalidToken)?;
        Ok(AccountInfo {
            local_id: format!("uid-{email}"),
            email: email.to_string(),
            email_verified: account.verified,
            display_name: account.display_name.clone(),
        })
    }

    async fn update_display_name(&self, id_token: &str, name: &str) -> Result<(), AuthError> {
        let email = Self::email_of(id_token)?;
        let mut accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        let account = accounts.get_mut(email).ok_or(AuthError::InvalidToken)?;
        account.display_name = Some(name.to_string());
        Ok(())
    }

    async fn send_verification(&self, id_token: &str) -> Result<(), AuthError> {
        if self.fail_verification.load(Ordering::SeqCst) {
            return Err(AuthError::RateLimited);
        }
        let email = Self::email_of(id_token)?;
        self.verifications_sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(email.to_string());
        Ok(())
    }
}
