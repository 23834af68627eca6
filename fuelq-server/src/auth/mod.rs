//! Identity provider access.
//!
//! Accounts live in Firebase Authentication and are reached through the
//! Identity Toolkit REST API. The [`Authenticator`] trait is the seam the
//! account service depends on; [`MemoryAuth`] stands in for it in tests.

mod client;
mod error;
mod memory;
mod types;

use std::future::Future;

pub use client::{AuthConfig, FirebaseAuth};
pub use error::AuthError;
pub use memory::MemoryAuth;
pub use types::{AccountInfo, SignedIn};

/// Password accounts held by an identity provider.
pub trait Authenticator: Send + Sync {
    /// Sign in with email and password.
    fn sign_in(&self, email: &str, password: &str) -> impl Future<Output = Result<SignedIn, AuthError>> + Send;

    /// Create an account; the new user is signed in.
    fn sign_up(&self, email: &str, password: &str) -> impl Future<Output = Result<SignedIn, AuthError>> + Send;

    /// Account details for a signed-in user.
    fn lookup(&self, id_token: &str) -> impl Future<Output = Result<AccountInfo, AuthError>> + Send;

    /// Set the user's display name.
    fn update_display_name(&self, id_token: &str, name: &str) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Email the user a verification link.
    fn send_verification(&self, id_token: &str) -> impl Future<Output = Result<(), AuthError>> + Send;
}
