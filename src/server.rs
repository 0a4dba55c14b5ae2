use crate::config::{AppConfig, MapConfig};
use crate::controller::MapController;
use crate::query::UrlDefaults;
use crate::render::Scene;
use crate::types::{Dataset, FilterOption};
use crate::vocabulary::{build_vocabulary, Dropdown, ALL_CATEGORIES, ALL_COUNTIES};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, RawQuery, State},
    response::Json,
    routing::get,
    Router,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info};

pub struct AppState {
    pub dataset: Dataset,
    pub config: AppConfig,
}

// `county`/`category` are read from the raw query as URL defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ViewFlags {
    labels: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    counties: Vec<FilterOption>,
    categories: Vec<FilterOption>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/api/config", get(config_handler))
        .route("/api/filters", get(filters_handler))
        .route("/api/markers", get(markers_handler))
        .route("/api/markers.geojson", get(geojson_handler))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, dataset: Dataset) -> Result<()> {
    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let state = Arc::new(AppState { dataset, config });
    let app = router(state);

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

// A fresh controller per request: load, then the query string acts as the
// page's URL defaults.
fn render_scene(state: &AppState, query: Option<&str>, flags: &ViewFlags) -> Scene {
    let defaults = UrlDefaults::from_query_string(query.unwrap_or(""));
    let mut controller = MapController::new(Scene::default(), state.config.map.fit_padding, defaults);
    controller.load(state.dataset.clone());
    controller.apply_pending_defaults();
    if flags.labels.unwrap_or(false) {
        controller.set_show_labels(true);
    }
    controller.into_surface()
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Json<MapConfig> {
    Json(state.config.map.clone())
}

async fn filters_handler(State(state): State<Arc<AppState>>) -> Json<FiltersResponse> {
    let vocabulary = build_vocabulary(&state.dataset);
    Json(FiltersResponse {
        counties: Dropdown::populate(ALL_COUNTIES, &vocabulary.counties).options,
        categories: Dropdown::populate(ALL_CATEGORIES, &vocabulary.categories).options,
    })
}

async fn markers_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    Query(flags): Query<ViewFlags>,
) -> Json<Scene> {
    debug!("Markers requested with {:?}", query);
    let scene = render_scene(&state, query.as_deref(), &flags);
    info!("Serving {} markers", scene.markers.len());
    Json(scene)
}

async fn geojson_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    Query(flags): Query<ViewFlags>,
) -> Json<FeatureCollection> {
    debug!("GeoJSON requested with {:?}", query);
    let scene = render_scene(&state, query.as_deref(), &flags);
    Json(scene.to_geojson())
}
