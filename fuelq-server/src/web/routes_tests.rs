//! Handler tests against in-memory backends.

use std::collections::HashMap;

use axum::body::to_bytes;
use axum::http::HeaderValue;
use chrono::{DateTime, TimeZone};
use serde_json::Value;
use tempfile::{TempDir, tempdir};

use super::*;
use crate::account::AccountService;
use crate::auth::MemoryAuth;
use crate::cache::{CacheConfig, CachedRefresher};
use crate::config::DEFAULT_MAP_CENTER;
use crate::directions::{DirectionsError, DistanceProvider};
use crate::realtime::MemoryDatabase;
use crate::refresh::{RefreshConfig, StationRefresher};
use crate::session::SessionStore;
use crate::storage::MemoryStore;

/// Road distances are always 3.2 km.
struct FixedDirections;

impl DistanceProvider for FixedDirections {
    async fn road_distance_meters(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> Result<f64, DirectionsError> {
        Ok(3200.0)
    }
}

struct TestBackend;

impl Backend for TestBackend {
    type Storage = MemoryStore;
    type Directions = FixedDirections;
    type Auth = MemoryAuth;
    type Database = MemoryDatabase;
}

fn at(h: u32, m: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, 3, 15, h, m, 0).single()
}

fn app() -> (AppState<TestBackend>, TempDir) {
    let store = MemoryStore::new();
    store.insert_with_metadata(
        "EV/DYP/C2_10-30-00_15-03-2025.jpg",
        at(10, 30),
        HashMap::from([
            ("latitude".to_string(), "16.70".to_string()),
            ("longitude".to_string(), "74.24".to_string()),
        ]),
    );
    store.insert("EV/DYP/C9_08-00-00_15-03-2025.jpg", at(8, 0));
    store.insert("EV/KOP/C1_09-00-00_15-03-2025.jpg", at(9, 0));
    store.insert("CNG/Shivaji CNG/C4_09-00-00_15-03-2025.jpg", at(9, 0));

    let refresher = StationRefresher::new(store, FixedDirections, RefreshConfig::default());
    let stations = CachedRefresher::new(refresher, &CacheConfig::default());

    let auth = MemoryAuth::new();
    auth.add_account("jane@mail.com", "Secret1!", true);
    auth.add_account("new@mail.com", "Secret1!", false);

    let dir = tempdir().unwrap();
    let session = SessionStore::new(dir.path().join("session.json"));
    let accounts = AccountService::new(auth, MemoryDatabase::new(), session);

    (AppState::new(stations, accounts, DEFAULT_MAP_CENTER), dir)
}

fn html() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
    headers
}

fn query(category: &str, q: &str) -> StationsQuery {
    StationsQuery {
        category: Some(category.to_string()),
        q: Some(q.to_string()),
        lat: None,
        lon: None,
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_body(value: Value) -> Bytes {
    Bytes::from(value.to_string())
}

async fn log_in(state: &AppState<TestBackend>) {
    state
        .accounts
        .login("jane@mail.com", "Secret1!")
        .await
        .unwrap();
}

#[tokio::test]
async fn index_redirects_by_session() {
    let (state, _dir) = app();

    let response = index(State(state.clone())).await.into_response();
    assert_eq!(response.headers()[header::LOCATION], "/login");

    log_in(&state).await;
    let response = index(State(state)).await.into_response();
    assert_eq!(response.headers()[header::LOCATION], "/stations");
}

#[tokio::test]
async fn stations_page_requires_login() {
    let (state, _dir) = app();

    let response = stations_page(State(state.clone()), Query(CategoryQuery::default()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    log_in(&state).await;
    let response = stations_page(State(state), Query(CategoryQuery::default()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("jane@mail.com"));
}

#[tokio::test]
async fn list_stations_json() {
    let (state, _dir) = app();

    let response = list_stations(State(state), HeaderMap::new(), Query(query("ev", "")))
        .await
        .unwrap();
    let json = body_json(response).await;

    assert_eq!(json["category"], "EV");
    let stations = json["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0]["name"], "DYP");
    assert_eq!(stations[0]["wait"], 20.0);
    assert_eq!(stations[0]["wait_text"], "20 mins");
    assert_eq!(stations[0]["distance"], "N/A");
    assert!(json["refreshed_at"].is_string());
}

#[tokio::test]
async fn list_stations_reports_its_own_refresh_time() {
    let (state, _dir) = app();

    let response = list_stations(State(state.clone()), HeaderMap::new(), Query(query("ev", "")))
        .await
        .unwrap();
    let json = body_json(response).await;

    let published = state.board.current(Category::Ev).await.unwrap();
    assert_eq!(
        json["refreshed_at"],
        serde_json::to_value(published.refreshed_at).unwrap()
    );
}

#[tokio::test]
async fn list_stations_with_position() {
    let (state, _dir) = app();
    let mut req = query("EV", "");
    req.lat = Some(16.73);
    req.lon = Some(74.23);

    let response = list_stations(State(state), HeaderMap::new(), Query(req))
        .await
        .unwrap();
    let json = body_json(response).await;

    // Only DYP has a position.
    assert_eq!(json["stations"][0]["distance"], 3.2);
    assert_eq!(json["stations"][0]["distance_text"], "3.20 km");
    assert_eq!(json["stations"][1]["distance"], "N/A");
}

#[tokio::test]
async fn list_stations_filters_by_name() {
    let (state, _dir) = app();

    let response = list_stations(State(state), HeaderMap::new(), Query(query("CNG", "cng")))
        .await
        .unwrap();
    let json = body_json(response).await;
    let stations = json["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0]["name"], "Shivaji CNG");
    assert_eq!(stations[0]["wait"], 12.0);
}

#[tokio::test]
async fn list_stations_html_fragment() {
    let (state, _dir) = app();

    let response = list_stations(State(state), html(), Query(query("EV", "")))
        .await
        .unwrap();
    let text = body_text(response).await;
    assert!(text.contains("DYP"));
    assert!(text.contains("20 mins"));
    assert!(!text.contains("<html"));
}

#[tokio::test]
async fn bad_category_rejected() {
    let (state, _dir) = app();

    let result = list_stations(State(state), HeaderMap::new(), Query(query("LPG", ""))).await;
    let Err(error) = result else {
        panic!("expected an error");
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn half_a_position_rejected() {
    let (state, _dir) = app();
    let mut req = query("EV", "");
    req.lat = Some(16.73);

    let result = list_stations(State(state), HeaderMap::new(), Query(req)).await;
    assert!(matches!(result, Err(AppError::BadRequest { .. })));
}

#[tokio::test]
async fn filter_uses_published_list() {
    let (state, _dir) = app();

    // Nothing published yet.
    let req = CategoryQuery {
        category: Some("EV".into()),
        q: Some("ko".into()),
    };
    let response = filter_stations(State(state.clone()), HeaderMap::new(), Query(req))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json["stations"].as_array().unwrap().is_empty());
    assert!(json["refreshed_at"].is_null());

    list_stations(State(state.clone()), HeaderMap::new(), Query(query("EV", "")))
        .await
        .unwrap();

    let req = CategoryQuery {
        category: Some("EV".into()),
        q: Some("ko".into()),
    };
    let response = filter_stations(State(state), HeaderMap::new(), Query(req))
        .await
        .unwrap();
    let json = body_json(response).await;
    let stations = json["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0]["name"], "KOP");
}

#[tokio::test]
async fn invalidate_drops_cached_scan() {
    let (state, _dir) = app();

    list_stations(State(state.clone()), HeaderMap::new(), Query(query("EV", "")))
        .await
        .unwrap();
    state.stations.refresher().storage().insert(
        "EV/NEW/C3_11-00-00_15-03-2025.jpg",
        at(11, 0),
    );

    // Still cached.
    let response = list_stations(State(state.clone()), HeaderMap::new(), Query(query("EV", "")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["stations"].as_array().unwrap().len(), 2);

    let req = CategoryQuery {
        category: Some("EV".into()),
        q: None,
    };
    let Json(invalidated) = invalidate_stations(State(state.clone()), Query(req)).await.unwrap();
    assert!(invalidated.invalidated);

    let response = list_stations(State(state), HeaderMap::new(), Query(query("EV", "")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["stations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn station_detail_json() {
    let (state, _dir) = app();

    let response = station_detail(
        State(state),
        HeaderMap::new(),
        UrlPath(("EV".to_string(), "DYP".to_string())),
    )
    .await
    .unwrap();
    let json = body_json(response).await;

    assert_eq!(json["station"]["wait"], 20.0);
    assert_eq!(
        json["station"]["latest"]["filename"],
        "C2_10-30-00_15-03-2025.jpg"
    );
    assert_eq!(json["station"]["latest"]["vehicle_count"], 2);
    assert_eq!(
        json["image_url"],
        "memory://EV/DYP/C2_10-30-00_15-03-2025.jpg"
    );
}

#[tokio::test]
async fn station_detail_html() {
    let (state, _dir) = app();

    let response = station_detail(
        State(state),
        html(),
        UrlPath(("cng".to_string(), "Shivaji CNG".to_string())),
    )
    .await
    .unwrap();
    let text = body_text(response).await;
    assert!(text.contains("Shivaji CNG"));
    assert!(text.contains("12 mins"));
    assert!(text.contains("<img"));
}

#[tokio::test]
async fn station_name_with_slash_rejected() {
    let (state, _dir) = app();
    state
        .stations
        .refresher()
        .storage()
        .insert("EV/X/Y/C3_11-00-00_15-03-2025.jpg", at(11, 0));

    for name in ["X/Y", "..", " "] {
        let result = station_detail(
            State(state.clone()),
            HeaderMap::new(),
            UrlPath(("EV".to_string(), name.to_string())),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })), "{name}");
    }
}

#[tokio::test]
async fn unknown_station_not_found() {
    let (state, _dir) = app();

    let result = station_detail(
        State(state),
        HeaderMap::new(),
        UrlPath(("EV".to_string(), "NOPE".to_string())),
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn map_markers_after_refresh() {
    let (state, _dir) = app();
    let req = || CategoryQuery {
        category: Some("EV".into()),
        q: None,
    };

    let Json(map) = map_markers(State(state.clone()), Query(req())).await.unwrap();
    assert!(map.markers.is_empty());
    assert_eq!(map.center, DEFAULT_MAP_CENTER);

    list_stations(State(state.clone()), HeaderMap::new(), Query(query("EV", "")))
        .await
        .unwrap();

    let Json(map) = map_markers(State(state), Query(req())).await.unwrap();
    assert_eq!(map.markers.len(), 1);
    assert_eq!(map.markers[0].name, "DYP");
    assert_eq!(map.markers[0].latitude, 16.70);
}

#[tokio::test]
async fn login_success() {
    let (state, _dir) = app();
    let body = json_body(serde_json::json!({ "email": "jane@mail.com", "password": "Secret1!" }));

    let Json(response) = login(State(state.clone()), body).await.unwrap();
    assert_eq!(response.redirect, Some("/stations"));
    assert!(state.accounts.session().is_logged_in);
}

#[tokio::test]
async fn login_failure_echoes_email() {
    let (state, _dir) = app();
    let body = json_body(serde_json::json!({ "email": "jane@mail.com", "password": "wrong" }));

    let response = login(State(state), body).await.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid Email or Password!");
    assert_eq!(json["fields"]["email"], "jane@mail.com");
    assert!(json["fields"].get("password").is_none());
}

#[tokio::test]
async fn login_unverified() {
    let (state, _dir) = app();
    let body = json_body(serde_json::json!({ "email": "new@mail.com", "password": "Secret1!" }));

    let response = login(State(state), body).await.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Please verify your email before logging in."
    );
}

#[tokio::test]
async fn login_missing_field() {
    let (state, _dir) = app();
    let body = json_body(serde_json::json!({ "email": "jane@mail.com" }));

    let response = login(State(state), body).await.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_rejected() {
    let (state, _dir) = app();

    let result = login(State(state), Bytes::from_static(b"{not json")).await;
    assert!(matches!(result, Err(AppError::BadRequest { .. })));
}

#[tokio::test]
async fn signup_validation_error() {
    let (state, _dir) = app();
    let body = json_body(serde_json::json!({
        "name": "Jane",
        "email": "jane-at-mail",
        "password": "Secret1!",
        "confirm_password": "Secret1!"
    }));

    let response = signup(State(state), body).await.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Please enter a valid email address.");
    assert_eq!(json["fields"]["name"], "Jane");
    assert_eq!(json["fields"]["email"], "jane-at-mail");
}

#[tokio::test]
async fn signup_success() {
    let (state, _dir) = app();
    let body = json_body(serde_json::json!({
        "name": "Sam",
        "email": "sam@mail.com",
        "password": "Secret1!",
        "confirm_password": "Secret1!"
    }));

    let Json(response) = signup(State(state.clone()), body).await.unwrap();
    assert_eq!(response.message, VERIFICATION_SENT);
    assert_eq!(response.redirect, Some("/login"));
    assert_eq!(state.accounts.auth().verifications_sent(), vec!["sam@mail.com"]);
}

#[tokio::test]
async fn profile_and_report_need_login() {
    let (state, _dir) = app();

    let body = json_body(serde_json::json!({ "name": "Jane" }));
    let response = save_profile(State(state.clone()), body)
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(serde_json::json!({ "category": "bug", "description": "x" }));
    let response = submit_report(State(state), body)
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn report_round_trip() {
    let (state, _dir) = app();
    log_in(&state).await;

    let body = json_body(serde_json::json!({ "category": "others", "description": "" }));
    let response = submit_report(State(state.clone()), body)
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Please fill in all fields.");
    assert_eq!(json["fields"]["category"], "others");

    let body = json_body(serde_json::json!({ "category": "others", "description": "Closed today" }));
    let Json(response) = submit_report(State(state.clone()), body).await.unwrap();
    assert_eq!(response.message, "Your report has been submitted.");
    assert_eq!(state.accounts.database().records_under("Reports/").len(), 1);
}

#[tokio::test]
async fn logout_redirects_to_login() {
    let (state, _dir) = app();
    log_in(&state).await;

    let Json(response) = logout(State(state.clone())).await.unwrap();
    assert_eq!(response.redirect, Some("/login"));
    assert!(!state.accounts.session().is_logged_in);
}

#[tokio::test]
async fn superseded_maps_to_conflict() {
    let error = AppError::from(RefreshError::Superseded {
        category: Category::Ev,
    });
    assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_path_html() {
    let response = not_found(html()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Not found"));
}

#[test]
fn accepts_html_header() {
    assert!(accepts_html(&html()));
    assert!(!accepts_html(&HeaderMap::new()));
}
