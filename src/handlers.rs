use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use log::{error, info, warn};
use serde_json::json;
use tokio::sync::{broadcast, watch};
use tower_http::cors::CorsLayer;

use crate::demo;
use crate::error::GaError;
use crate::ga::Optimizer;
use crate::models::{
    OptimizationRequest, OptimizationResponse, OptimizationStatus, RegistryRequest,
};

#[derive(Clone)]
pub struct AppState {
    pub status_tx: broadcast::Sender<OptimizationStatus>,
    pub stop_tx: watch::Sender<bool>,
}

impl AppState {
    pub fn new() -> Self {
        let (status_tx, _) = broadcast::channel(1024);
        let (stop_tx, _) = watch::channel(false);
        AppState { status_tx, stop_tx }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:3000"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/optimize", post(optimize_handler))
        .route("/status", get(status_handler))
        .route("/stop", post(stop_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn stop_handler(State(state): State<AppState>) -> Response {
    // stays raised until the next optimization resets it
    state.stop_tx.send_replace(true);
    info!("Stop requested");
    Json(json!({ "success": true })).into_response()
}

pub async fn status_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>> + 'static> {
    let mut rx = state.status_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(status) => match serde_json::to_string(&status) {
                    Ok(data) => yield Ok(Event::default().data(data).event("status")),
                    Err(e) => error!("Serialization error: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Status stream lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream)
}

pub async fn optimize_handler(
    State(state): State<AppState>,
    Json(req): Json<OptimizationRequest>,
) -> Response {
    let registry = req
        .registry
        .map(RegistryRequest::into_registry)
        .unwrap_or_else(demo::registry);
    let parameters = req.parameters;
    let status_tx = state.status_tx.clone();
    state.stop_tx.send_replace(false);
    let stop_rx = state.stop_tx.subscribe();

    let result = tokio::task::spawn(async move {
        let optimizer = Optimizer::new(&registry, parameters)?;
        let mut rng = optimizer.rng();
        let outcome = optimizer
            .optimize(&mut rng, Some(status_tx), Some(stop_rx))
            .await?;
        Ok::<_, GaError>(OptimizationResponse::new(&outcome, &registry))
    })
    .await;

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) => {
            warn!("Rejected optimization request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Optimization task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
