//! User accounts and reports.

mod error;
mod report;
mod service;
mod validate;

pub use error::AccountError;
pub use report::{Report, ReportCategory};
pub use service::{AccountService, LoggedIn, VERIFICATION_SENT};
pub use validate::{SignupForm, SignupIssue, check_password, looks_like_email, validate_signup};
