//! HTTP routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use iss_tracker_core::{Block, Ephemeris, GeodeticFix, StateVector, StoreStatus, Tracker};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiResult;
use crate::geocoder::{Geocoder, Geoposition};

const HELP_TEXT: &str = "\
Usage: curl [host]:[port]/[path]

ISS tracker routes:
  GET    /                          all trajectory data
  GET    /help                      this help text
  GET    /status                    whether data is loaded, and how much
  GET    /header                    OEM header
  GET    /metadata                  OEM metadata
  GET    /comment                   OEM comments
  GET    /epochs                    all epochs
  GET    /epochs?limit=int&offset=int  a page of epochs
  GET    /epochs/<epoch>            state vector at an epoch
  GET    /epochs/<epoch>/speed      instantaneous speed at an epoch
  GET    /epochs/<epoch>/location   latitude, longitude, altitude and geoposition
  GET    /now                       state closest to the current time
  DELETE /delete-data               delete all trajectory data
  POST   /post-data                 reload trajectory data from the source
";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
    pub geocoder: Arc<Geocoder>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(all_data))
        .route("/help", get(help))
        .route("/status", get(status))
        .route("/header", get(header))
        .route("/metadata", get(metadata))
        .route("/comment", get(comments))
        .route("/epochs", get(epochs))
        .route("/epochs/{epoch}", get(state_vector))
        .route("/epochs/{epoch}/speed", get(speed))
        .route("/epochs/{epoch}/location", get(location))
        .route("/now", get(now))
        .route("/delete-data", delete(delete_data))
        .route("/post-data", post(post_data))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct EpochsQuery {
    offset: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpeedResponse {
    epoch: String,
    speed: f64,
    units: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    latitude: f64,
    longitude: f64,
    altitude: Altitude,
    geoposition: Geoposition,
}

#[derive(Debug, Serialize)]
pub struct Altitude {
    value: f64,
    units: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EpochLocationResponse {
    epoch: String,
    #[serde(flatten)]
    location: LocationResponse,
}

#[derive(Debug, Serialize)]
pub struct NowResponse {
    closest_epoch: String,
    /// Positive when the closest epoch is in the past
    seconds_from_now: f64,
    speed: f64,
    location: LocationResponse,
    state_vector: StateVector,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    cleared: bool,
    message: &'static str,
}

async fn help() -> &'static str {
    HELP_TEXT
}

async fn all_data(State(state): State<AppState>) -> ApiResult<Json<Ephemeris>> {
    let ephemeris = state.tracker.ephemeris().await?;
    Ok(Json(Ephemeris::clone(&ephemeris)))
}

async fn status(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.tracker.status().await)
}

async fn header(State(state): State<AppState>) -> ApiResult<Json<Block>> {
    Ok(Json(state.tracker.header().await?))
}

async fn metadata(State(state): State<AppState>) -> ApiResult<Json<Block>> {
    Ok(Json(state.tracker.metadata().await?))
}

async fn comments(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.tracker.comments().await?))
}

async fn epochs(
    State(state): State<AppState>,
    Query(query): Query<EpochsQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let epochs = state
        .tracker
        .list_epochs(query.offset.as_deref(), query.limit.as_deref())
        .await?;
    Ok(Json(epochs))
}

async fn state_vector(State(state): State<AppState>, Path(epoch): Path<String>) -> ApiResult<Json<StateVector>> {
    Ok(Json(state.tracker.state_vector(&epoch).await?))
}

async fn speed(State(state): State<AppState>, Path(epoch): Path<String>) -> ApiResult<Json<SpeedResponse>> {
    let speed = state.tracker.speed(&epoch).await?;
    Ok(Json(SpeedResponse {
        epoch,
        speed,
        units: "km/s",
    }))
}

async fn location(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> ApiResult<Json<EpochLocationResponse>> {
    let fix = state.tracker.location(&epoch).await?;
    let location = describe(&state.geocoder, fix).await;
    Ok(Json(EpochLocationResponse { epoch, location }))
}

async fn now(State(state): State<AppState>) -> ApiResult<Json<NowResponse>> {
    let current = state.tracker.now().await?;
    let location = describe(&state.geocoder, current.location).await;

    Ok(Json(NowResponse {
        closest_epoch: current.state_vector.epoch().to_string(),
        seconds_from_now: current.delta_seconds,
        speed: current.speed,
        location,
        state_vector: current.state_vector,
    }))
}

async fn delete_data(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.tracker.clear().await;
    Json(ClearResponse {
        cleared,
        message: if cleared { "data cleared" } else { "no data to clear" },
    })
}

async fn post_data(State(state): State<AppState>) -> ApiResult<Json<StoreStatus>> {
    Ok(Json(state.tracker.load().await?))
}

async fn describe(geocoder: &Geocoder, fix: GeodeticFix) -> LocationResponse {
    let geoposition = geocoder.reverse(fix.latitude, fix.longitude).await;
    LocationResponse {
        latitude: fix.latitude,
        longitude: fix.longitude,
        altitude: Altitude {
            value: fix.altitude,
            units: "km",
        },
        geoposition,
    }
}
