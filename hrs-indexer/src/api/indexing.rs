//! Sync trigger handlers
//!
//! POST /index, POST /index/:hotel_name, GET /analyze/:hotel_name

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{HotelSummary, NormTones};
use crate::AppState;

/// POST /index response
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub hotels: Vec<HotelSummary>,
}

/// GET /analyze/:hotel_name response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub name: String,
    pub tones: NormTones,
}

/// GET /
pub async fn root(State(state): State<AppState>) -> String {
    state.app_title.clone()
}

/// POST /index
///
/// Sync every hotel in the dataset and return one summary per hotel.
pub async fn index_all(State(state): State<AppState>) -> ApiResult<Json<IndexResponse>> {
    let hotels = state.sync.index_all().await;
    let hotels = state.record_failure(hotels).await?;
    Ok(Json(IndexResponse { hotels }))
}

/// POST /index/:hotel_name
pub async fn index_hotel(
    State(state): State<AppState>,
    Path(hotel_name): Path<String>,
) -> ApiResult<Json<IndexResponse>> {
    let hotel_name = validate_hotel_name(hotel_name)?;
    let hotels = state.sync.index_hotel(&hotel_name).await;
    let hotels = state.record_failure(hotels).await?;
    Ok(Json(IndexResponse { hotels }))
}

/// GET /analyze/:hotel_name
///
/// Tones from the dataset alone; the document store is neither read nor written.
/// A hotel with no rows yields empty tones.
pub async fn analyze_hotel(
    State(state): State<AppState>,
    Path(hotel_name): Path<String>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let hotel_name = validate_hotel_name(hotel_name)?;
    let summary = state.sync.analyze_hotel(&hotel_name).await;
    let response = match state.record_failure(summary).await? {
        Some(summary) => AnalyzeResponse {
            name: summary.name,
            tones: summary.tones,
        },
        // No rows for the hotel is an empty result, not an error
        None => AnalyzeResponse {
            name: hotel_name,
            tones: NormTones::new(),
        },
    };

    Ok(Json(response))
}

fn validate_hotel_name(name: String) -> ApiResult<String> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("hotel name must not be empty".to_string()));
    }
    Ok(name)
}

/// Build sync routes
pub fn indexing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/index", post(index_all))
        .route("/index/:hotel_name", post(index_hotel))
        .route("/analyze/:hotel_name", get(analyze_hotel))
}
