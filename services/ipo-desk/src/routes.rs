//! HTTP API routes.

use crate::desk::IpoDesk;
use crate::error::DeskError;
use crate::model::{AnalysisRecord, IpoKind, IpoListing};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<IpoDesk>,
}

impl AppState {
    pub fn new(desk: IpoDesk) -> Self {
        Self {
            desk: Arc::new(desk),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        // Health check
        .route("/health", get(health_check))
        // IPO data
        .route("/api/ipos", get(list_ipos))
        .route("/api/ipo/:ipo_type/:index/analyze", get(analyze_ipo))
        .route("/api/refresh", get(refresh))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
}

/// A panicking handler still answers with the 500 error envelope.
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    };
    DeskError::Internal(message).into_response()
}

// ============ UI / Health ============

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ipo-desk",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============ IPO Listings ============

#[derive(Debug, Serialize)]
struct ListIposResponse {
    success: bool,
    current_ipos: Vec<IpoListing>,
    upcoming_ipos: Vec<IpoListing>,
    current_count: usize,
    upcoming_count: usize,
    total_count: usize,
    last_updated: Option<DateTime<Utc>>,
}

async fn list_ipos(State(state): State<AppState>) -> Json<ListIposResponse> {
    let snapshot = state.desk.listings().await;
    let listings = snapshot.listings;

    Json(ListIposResponse {
        success: true,
        current_count: listings.current.len(),
        upcoming_count: listings.upcoming.len(),
        total_count: listings.total(),
        current_ipos: listings.current,
        upcoming_ipos: listings.upcoming,
        last_updated: snapshot.last_updated,
    })
}

// ============ Analysis ============

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    success: bool,
    data: AnalysisRecord,
}

async fn analyze_ipo(
    State(state): State<AppState>,
    Path((ipo_type, index)): Path<(String, String)>,
) -> Result<Json<AnalyzeResponse>, DeskError> {
    let kind: IpoKind = ipo_type.parse()?;
    let index: usize = index
        .parse()
        .map_err(|_| DeskError::InvalidIndex(index.clone()))?;

    let data = state.desk.analyze(kind, index).await?;
    Ok(Json(AnalyzeResponse {
        success: true,
        data,
    }))
}

// ============ Refresh ============

#[derive(Debug, Serialize)]
struct RefreshResponse {
    success: bool,
    message: &'static str,
    current_count: usize,
    upcoming_count: usize,
    total_count: usize,
}

async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let listings = state.desk.refresh().await;
    Json(RefreshResponse {
        success: true,
        message: "IPO data refreshed successfully",
        current_count: listings.current.len(),
        upcoming_count: listings.upcoming.len(),
        total_count: listings.total(),
    })
}
