//! HTTP route handlers.

use std::collections::BTreeMap;
use std::path::Path;

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::account::{AccountError, ReportCategory, SignupForm, VERIFICATION_SENT};
use crate::domain::{Category, Coordinates, Station};
use crate::listing::StationListView;
use crate::refresh::RefreshError;
use crate::storage::ObjectStore;

use super::dto::*;
use super::state::{AppState, Backend};
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router<B: Backend>(state: AppState<B>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index::<B>))
        .route("/health", get(health))
        .route("/about", get(about_page))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/stations", get(stations_page::<B>))
        .route("/settings", get(settings_page::<B>))
        .route("/api/login", post(login::<B>))
        .route("/api/signup", post(signup::<B>))
        .route("/api/logout", post(logout::<B>))
        .route("/api/profile", put(save_profile::<B>))
        .route("/api/reports", post(submit_report::<B>))
        .route("/api/stations", get(list_stations::<B>))
        .route("/api/stations/refresh", post(invalidate_stations::<B>))
        .route("/api/stations/filter", get(filter_stations::<B>))
        .route("/api/stations/:category/:name", get(station_detail::<B>))
        .route("/api/map", get(map_markers::<B>))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Send the user to the station list or the login page.
async fn index<B: Backend>(State(state): State<AppState<B>>) -> Redirect {
    Redirect::to(state.accounts.session().landing_path())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// About page.
async fn about_page() -> impl IntoResponse {
    Html(
        AboutTemplate
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Login page.
async fn login_page() -> impl IntoResponse {
    Html(
        LoginTemplate
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Signup page.
async fn signup_page() -> impl IntoResponse {
    Html(
        SignupTemplate
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Station list page. Needs a logged-in user.
async fn stations_page<B: Backend>(
    State(state): State<AppState<B>>,
    Query(req): Query<CategoryQuery>,
) -> Result<Response, AppError> {
    let session = state.accounts.session();
    let Some(email) = session.user() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let template = StationsTemplate {
        email: email.to_string(),
        category: parse_category(req.category.as_deref())?,
        categories: Category::ALL.to_vec(),
        center: state.map_center,
    };
    render(&template)
}

/// Settings page. Needs a logged-in user.
async fn settings_page<B: Backend>(State(state): State<AppState<B>>) -> Result<Response, AppError> {
    let session = state.accounts.session();
    let Some(email) = session.user() else {
        return Ok(Redirect::to("/login").into_response());
    };

    render(&SettingsTemplate {
        email: email.to_string(),
        report_categories: ReportCategory::ALL.to_vec(),
    })
}

/// Unknown paths.
async fn not_found(headers: HeaderMap) -> Response {
    if accepts_html(&headers) {
        let page = ErrorTemplate {
            title: "Not found".to_string(),
            message: "There is nothing at this address.".to_string(),
        };
        let html = page
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e));
        return (StatusCode::NOT_FOUND, Html(html)).into_response();
    }

    AppError::NotFound {
        message: "Not found".to_string(),
    }
    .into_response()
}

// ============================================================================
// Accounts
// ============================================================================

async fn login<B: Backend>(
    State(state): State<AppState<B>>,
    body: Bytes,
) -> Result<Json<AccountResponse>, AppError> {
    let req: LoginRequest = parse_json(&body)?;

    let logged_in = state
        .accounts
        .login(&req.email, &req.password)
        .await
        .map_err(|e| AppError::form(e, fields([("email", &req.email)])))?;

    Ok(Json(AccountResponse {
        message: "Logged in.".to_string(),
        redirect: Some("/stations"),
        email: Some(logged_in.email),
    }))
}

async fn signup<B: Backend>(
    State(state): State<AppState<B>>,
    body: Bytes,
) -> Result<Json<AccountResponse>, AppError> {
    let form: SignupForm = parse_json(&body)?;

    state
        .accounts
        .signup(&form)
        .await
        .map_err(|e| AppError::form(e, fields([("name", &form.name), ("email", &form.email)])))?;

    Ok(Json(AccountResponse {
        message: VERIFICATION_SENT.to_string(),
        redirect: Some("/login"),
        email: Some(form.email.trim().to_string()),
    }))
}

async fn logout<B: Backend>(State(state): State<AppState<B>>) -> Result<Json<AccountResponse>, AppError> {
    state
        .accounts
        .logout()
        .await
        .map_err(|e| AppError::form(e, FormFields::new()))?;

    Ok(Json(AccountResponse {
        message: "Logged out.".to_string(),
        redirect: Some("/login"),
        email: None,
    }))
}

async fn save_profile<B: Backend>(
    State(state): State<AppState<B>>,
    body: Bytes,
) -> Result<Json<AccountResponse>, AppError> {
    let req: ProfileRequest = parse_json(&body)?;

    state
        .accounts
        .save_profile(&req.name)
        .await
        .map_err(|e| AppError::form(e, fields([("name", &req.name)])))?;

    Ok(Json(AccountResponse {
        message: "Profile updated successfully.".to_string(),
        redirect: None,
        email: None,
    }))
}

async fn submit_report<B: Backend>(
    State(state): State<AppState<B>>,
    body: Bytes,
) -> Result<Json<ReportResponse>, AppError> {
    let req: ReportRequest = parse_json(&body)?;

    let id = state
        .accounts
        .submit_report(&req.category, &req.description)
        .await
        .map_err(|e| {
            AppError::form(
                e,
                fields([("category", &req.category), ("description", &req.description)]),
            )
        })?;

    Ok(Json(ReportResponse {
        message: "Your report has been submitted.",
        id,
    }))
}

// ============================================================================
// Stations
// ============================================================================

/// Refresh a category and return it filtered by name.
async fn list_stations<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    Query(req): Query<StationsQuery>,
) -> Result<Response, AppError> {
    let category = parse_category(req.category.as_deref())?;
    let origin = parse_origin(req.lat, req.lon)?;
    let view = StationListView::new(category).with_query(req.q.unwrap_or_default());

    let published = state.board.refresh(&*state.stations, category, origin).await?;

    respond_list(
        &headers,
        &view,
        view.apply(&published.stations),
        Some(published.refreshed_at),
    )
}

/// Drop the cached scan of a category so the next refresh re-reads storage.
async fn invalidate_stations<B: Backend>(
    State(state): State<AppState<B>>,
    Query(req): Query<CategoryQuery>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let category = parse_category(req.category.as_deref())?;
    state.stations.invalidate(category).await;
    debug!(%category, "scan cache invalidated");

    Ok(Json(InvalidateResponse {
        category,
        invalidated: true,
    }))
}

/// Filter the last published list without touching storage.
async fn filter_stations<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    Query(req): Query<CategoryQuery>,
) -> Result<Response, AppError> {
    let category = parse_category(req.category.as_deref())?;
    let view = StationListView::new(category).with_query(req.q.unwrap_or_default());

    let stations = view.render(&state.board).await.unwrap_or_default();
    let refreshed_at = state.board.current(category).await.map(|p| p.refreshed_at);

    respond_list(&headers, &view, stations, refreshed_at)
}

/// A station's latest image and wait.
async fn station_detail<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    UrlPath((category, name)): UrlPath<(String, String)>,
) -> Result<Response, AppError> {
    let category = parse_category(Some(&category))?;
    let name = parse_station_name(&name)?;
    let refresher = state.stations.refresher();

    let mut station = refresher.scan_station(category, name).await;
    let latest = station.latest.clone().ok_or_else(|| AppError::NotFound {
        message: format!("No images for station {}", station.id),
    })?;

    // Distance depends on the user's position, so take it from the last list.
    if let Some(published) = state.board.current(category).await {
        if let Some(known) = published.stations.iter().find(|s| s.name == station.name) {
            station.distance = known.distance;
        }
    }

    let image_url = match refresher.storage().download_url(&latest.path).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(path = %latest.path, error = %e, "no download URL for latest image");
            None
        }
    };

    if accepts_html(&headers) {
        render(&StationDetailTemplate {
            station: StationView::from_station(&station),
            image_url,
        })
    } else {
        Ok(Json(StationDetailResponse {
            station: StationResult::from_station(&station),
            image_url,
        })
        .into_response())
    }
}

/// Markers for the stations of a category that have a position.
async fn map_markers<B: Backend>(
    State(state): State<AppState<B>>,
    Query(req): Query<CategoryQuery>,
) -> Result<Json<MapResponse>, AppError> {
    let category = parse_category(req.category.as_deref())?;

    let markers = match state.board.current(category).await {
        Some(published) => published
            .stations
            .iter()
            .filter_map(MarkerResult::from_station)
            .collect(),
        None => Vec::new(),
    };

    Ok(Json(MapResponse {
        category,
        center: state.map_center,
        markers,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Render a template into a response.
fn render(template: &impl Template) -> Result<Response, AppError> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html).into_response())
}

/// Parse a JSON body, logging it on failure.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "invalid JSON body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Category from a query parameter; missing means EV.
fn parse_category(raw: Option<&str>) -> Result<Category, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Category::Ev),
        Some(s) => Category::parse(s).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        }),
    }
}

/// A single station folder name. The path extractor has already decoded
/// `%2F`, so slashes here would reach outside the category folder.
fn parse_station_name(raw: &str) -> Result<&str, AppError> {
    let name = raw.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(AppError::BadRequest {
            message: format!("Invalid station name: {raw}"),
        });
    }
    Ok(name)
}

/// The user's position, when both coordinates are given.
fn parse_origin(lat: Option<f64>, lon: Option<f64>) -> Result<Option<Coordinates>, AppError> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest {
                message: format!("Invalid coordinates: {lat},{lon}"),
            }),
        _ => Err(AppError::BadRequest {
            message: "lat and lon must be given together".to_string(),
        }),
    }
}

/// Station list as HTML fragment or JSON.
fn respond_list(
    headers: &HeaderMap,
    view: &StationListView,
    stations: Vec<Station>,
    refreshed_at: Option<DateTime<Utc>>,
) -> Result<Response, AppError> {
    if accepts_html(headers) {
        render(&StationListTemplate {
            category: view.category,
            query: view.query.clone(),
            stations: stations.iter().map(StationView::from_station).collect(),
        })
    } else {
        Ok(Json(StationListResponse {
            category: view.category,
            query: view.query.clone(),
            refreshed_at,
            stations: stations.iter().map(StationResult::from_station).collect(),
        })
        .into_response())
    }
}

/// Form fields to echo back, leaving out blanks.
fn fields<const N: usize>(pairs: [(&'static str, &String); N]) -> FormFields {
    pairs
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k, v.clone()))
        .collect::<BTreeMap<_, _>>()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    /// A form was rejected; the fields are sent back for re-filling
    Form {
        status: StatusCode,
        message: String,
        fields: FormFields,
    },
    BadGateway { message: String },
    Internal { message: String },
}

impl AppError {
    /// Map an account failure to the status its form should show.
    pub fn form(e: AccountError, fields: FormFields) -> Self {
        let status = if e.is_user_input() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else if e.is_auth() {
            StatusCode::UNAUTHORIZED
        } else if matches!(e, AccountError::Session(_)) {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_GATEWAY
        };

        AppError::Form {
            status,
            message: e.to_string(),
            fields,
        }
    }
}

impl From<RefreshError> for AppError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::Superseded { .. } => AppError::Conflict {
                message: e.to_string(),
            },
            RefreshError::Listing { .. } => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, fields) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, FormFields::new()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, FormFields::new()),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message, FormFields::new()),
            AppError::Form {
                status,
                message,
                fields,
            } => (status, message, fields),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message, FormFields::new()),
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, FormFields::new())
            }
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            fields,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
