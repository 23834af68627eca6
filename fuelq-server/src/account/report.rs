//! Issue reports.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::AccountError;

/// What a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    WrongInfo,
    FraudInfo,
    Bug,
    Others,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 4] = [
        ReportCategory::WrongInfo,
        ReportCategory::FraudInfo,
        ReportCategory::Bug,
        ReportCategory::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::WrongInfo => "wrong_info",
            ReportCategory::FraudInfo => "fraud_info",
            ReportCategory::Bug => "bug",
            ReportCategory::Others => "others",
        }
    }

    /// Label for the report form.
    pub fn label(&self) -> &'static str {
        match self {
            ReportCategory::WrongInfo => "Wrong information",
            ReportCategory::FraudInfo => "Fraud information",
            ReportCategory::Bug => "Bug",
            ReportCategory::Others => "Others",
        }
    }
}

impl FromStr for ReportCategory {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ReportCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AccountError::UnknownReportCategory(s.to_string()))
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A report as stored under `Reports/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub category: ReportCategory,
    pub description: String,
    pub email: String,
    pub submitted_at: DateTime<Utc>,
}

impl Report {
    /// Build a report from form input. Both fields must be non-blank.
    pub fn new(category: &str, description: &str, email: &str) -> Result<Self, AccountError> {
        if category.trim().is_empty() || description.trim().is_empty() {
            return Err(AccountError::IncompleteReport);
        }

        Ok(Self {
            category: category.parse()?,
            description: description.trim().to_string(),
            email: email.to_string(),
            submitted_at: Utc::now(),
        })
    }
}
