//! Askama templates for the web frontend.

use askama::Template;

use crate::account::ReportCategory;
use crate::domain::{Category, Coordinates, Station};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Login page.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate;

/// Signup page.
#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate;

/// Station list page.
#[derive(Template)]
#[template(path = "stations.html")]
pub struct StationsTemplate {
    pub email: String,
    pub category: Category,
    pub categories: Vec<Category>,
    pub center: Coordinates,
}

/// Settings page: profile, report and logout.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub email: String,
    pub report_categories: Vec<ReportCategory>,
}

/// About page.
#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate;

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// Fragment Templates (AJAX responses, no base.html)
// ============================================================================

/// Station list fragment.
#[derive(Template)]
#[template(path = "station_list.html")]
pub struct StationListTemplate {
    pub category: Category,
    pub query: String,
    pub stations: Vec<StationView>,
}

/// Station detail fragment.
#[derive(Template)]
#[template(path = "station_detail.html")]
pub struct StationDetailTemplate {
    pub station: StationView,
    pub image_url: Option<String>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Station view model for templates.
#[derive(Debug, Clone)]
pub struct StationView {
    pub name: String,
    pub category: String,
    pub wait: String,
    pub distance: String,
    pub vehicle_count: Option<u32>,
    pub captured_at: Option<String>,
    pub detail_url: String,
}

impl StationView {
    /// Create from a domain Station.
    pub fn from_station(station: &Station) -> Self {
        Self {
            name: station.name.clone(),
            category: station.category.folder().to_string(),
            wait: station.wait.to_string(),
            distance: station.distance.to_string(),
            vehicle_count: station.latest.as_ref().map(|l| l.vehicle_count),
            captured_at: station
                .latest
                .as_ref()
                .map(|l| l.captured_at.format("%d %b %Y %H:%M").to_string()),
            detail_url: format!(
                "/api/stations/{}/{}",
                station.category.folder(),
                encode_segment(&station.name)
            ),
        }
    }

    /// Whether a wait estimate exists.
    pub fn has_wait(&self) -> bool {
        self.vehicle_count.is_some()
    }
}

/// Percent-encode a URL path segment.
fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
