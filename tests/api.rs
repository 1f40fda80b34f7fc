//! Router-level tests: drive the HTTP surface the page uses and check that
//! filter state, markers and the details panel move together.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tower::ServiceExt;

use heritage_map::render::IconSet;
use heritage_map::server::{create_app, AppState};
use heritage_map::session::MapSession;
use heritage_map::site::parse_sites;
use heritage_map::{Settings, SiteRepository};

const DATA: &str = r#"[
    {"name":"Taj Mahal","category":"monuments_and_architecture","year":1653,"coords":[27.17,78.04],"info":"Mausoleum","image_url":"/img/taj.jpg"},
    {"name":"Diwali","category":"festivals_and_traditions","year":2025,"coords":[28.6,77.2],"info":"Festival of lights"},
    {"name":"Kurukshetra","category":"tales_and_epics","epic":"Mahabharata","year":100,"coords":[29.97,76.87],"info":"Battlefield"},
    {"name":"Ayodhya","category":"tales_and_epics","epic":"Ramayana","year":100,"coords":[26.79,82.19],"info":"Birthplace"},
    {"name":"Biryani","category":"cuisine","year":1700,"coords":[17.38,78.48],"info":"Rice dish"}
]"#;

fn app_with(repository: SiteRepository) -> Router {
    let settings = Settings {
        search_debounce_ms: 300,
        ..Settings::default()
    };
    let (event_sender, _) = broadcast::channel(100);
    let session = MapSession::new(
        repository.clone(),
        IconSet::embedded(),
        settings.default_year,
        settings.notice_ttl(),
        event_sender.clone(),
    )
    .into_shared();

    create_app(AppState {
        session,
        repository,
        settings: Arc::new(settings),
        event_sender,
    })
}

fn app() -> Router {
    app_with(SiteRepository::with_sites(parse_sites(DATA.as_bytes()).unwrap()))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn marker_names(markers: &Value) -> Vec<String> {
    markers
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["tooltip"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn initial_state_shows_all_sites() {
    let app = app();
    let (status, state) = call(&app, "GET", "/api/state", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["view"]["active_theme"], "all");
    assert_eq!(state["view"]["active_year"], 2025.0);
    assert_eq!(state["markers"].as_array().unwrap().len(), 5);
    assert_eq!(state["details"]["state"], "closed");
    assert_eq!(state["epics"], json!(["Mahabharata", "Ramayana"]));
}

#[tokio::test]
async fn year_filter_is_reflected_in_markers() {
    let app = app();
    let (status, _) = call(&app, "POST", "/api/year", Some(json!({ "year": 1700 }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, markers) = call(&app, "GET", "/api/markers", None).await;
    assert_eq!(
        marker_names(&markers),
        vec!["Taj Mahal", "Kurukshetra", "Ayodhya", "Biryani"]
    );
}

#[tokio::test]
async fn theme_and_epic_flow() {
    let app = app();

    let (_, state) = call(&app, "POST", "/api/theme", Some(json!({ "theme": "tales_and_epics" }))).await;
    assert_eq!(state["epic_menu_open"], true);
    assert_eq!(marker_names(&state["markers"]), vec!["Kurukshetra", "Ayodhya"]);

    let (_, state) = call(&app, "POST", "/api/epic", Some(json!({ "epic": "mahabharata" }))).await;
    assert_eq!(state["view"]["active_epic"], "mahabharata");
    assert_eq!(marker_names(&state["markers"]), vec!["Kurukshetra"]);

    // Reselecting the active theme drops the epic
    let (_, state) = call(&app, "POST", "/api/theme", Some(json!({ "theme": "tales_and_epics" }))).await;
    assert_eq!(state["view"]["active_epic"], Value::Null);
    assert_eq!(state["epic_menu_open"], false);
    assert_eq!(marker_names(&state["markers"]), vec!["Kurukshetra", "Ayodhya"]);
}

#[tokio::test]
async fn epic_overrides_other_theme() {
    let app = app();
    call(&app, "POST", "/api/theme", Some(json!({ "theme": "cuisine" }))).await;

    let (_, state) = call(&app, "POST", "/api/epic", Some(json!({ "epic": "Ramayana" }))).await;
    assert_eq!(state["view"]["active_theme"], "tales_and_epics");
    assert_eq!(marker_names(&state["markers"]), vec!["Ayodhya"]);
}

#[tokio::test(start_paused = true)]
async fn search_is_debounced_and_clear_is_immediate() {
    let app = app();

    let (status, body) = call(&app, "POST", "/api/search", Some(json!({ "query": "cuisine" }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["debounce_ms"], 300);

    // Not applied yet
    let (_, markers) = call(&app, "GET", "/api/markers", None).await;
    assert_eq!(markers.as_array().unwrap().len(), 5);

    tokio::time::sleep(Duration::from_millis(301)).await;
    let (_, state) = call(&app, "GET", "/api/state", None).await;
    assert_eq!(state["view"]["search_query"], "cuisine");
    assert_eq!(marker_names(&state["markers"]), vec!["Biryani"]);

    let (_, state) = call(&app, "POST", "/api/search/clear", None).await;
    assert_eq!(state["view"]["search_query"], "");
    assert_eq!(state["markers"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn details_panel_lifecycle() {
    let app = app();

    let (status, panel) = call(&app, "POST", "/api/details/show/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(panel["state"], "open");
    assert_eq!(panel["view"]["name"], "Taj Mahal");
    assert_eq!(
        panel["view"]["details"],
        "Detailed information for this site is not yet available."
    );

    let (_, panel) = call(&app, "POST", "/api/details/image-failed", None).await;
    assert_eq!(panel["view"]["image_url"], Value::Null);

    let (_, panel) = call(&app, "POST", "/api/details/click", Some(json!({ "target": "content" }))).await;
    assert_eq!(panel["state"], "open");

    let (_, panel) = call(&app, "POST", "/api/details/click", Some(json!({ "target": "background" }))).await;
    assert_eq!(panel["state"], "closed");

    call(&app, "POST", "/api/details/show/1", None).await;
    let (_, panel) = call(&app, "POST", "/api/details/close", None).await;
    assert_eq!(panel["state"], "closed");
}

#[tokio::test]
async fn unknown_site_is_not_found() {
    let app = app();
    let (status, _) = call(&app, "POST", "/api/details/show/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "GET", "/api/sites/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, site) = call(&app, "GET", "/api/sites/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(site["epic"], "Mahabharata");
    assert_eq!(site["year"], "100");
}

#[tokio::test]
async fn markers_carry_icons_and_popups() {
    let app = app();
    let (_, markers) = call(&app, "GET", "/api/markers", None).await;
    let taj = &markers[0];

    assert_eq!(taj["icon"]["kind"], "image");
    assert_eq!(taj["icon"]["url"], "/filters/monuments_and_architecture.svg");
    assert!(taj["popup_html"].as_str().unwrap().contains("popup-image"));
    assert_eq!(markers[2]["icon"]["url"], "/images/heritage_icon.svg");
}

#[tokio::test]
async fn empty_repository_serves_empty_map() {
    let app = app_with(SiteRepository::new());
    let (_, state) = call(&app, "GET", "/api/state", None).await;

    assert_eq!(state["markers"], json!([]));
    assert_eq!(state["load"]["status"], "pending");
}

#[tokio::test]
async fn page_and_assets_are_served() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/filters/cuisine.svg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/svg+xml");

    let response = app
        .oneshot(Request::builder().uri("/nope.txt").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn config_lists_themes() {
    let app = app();
    let (_, config) = call(&app, "GET", "/api/config", None).await;
    let themes = config["themes"].as_array().unwrap();

    assert_eq!(themes[0], "all");
    assert_eq!(themes.len(), 9);
    assert_eq!(config["resize_settle_ms"], 200);
}
