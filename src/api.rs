// src/api.rs

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use eeg_lib::GainStore;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct GainRequest {
    // Missing reads as 0 and is rejected below
    #[serde(default)]
    gain: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GainResponse {
    pub gain: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GainUpdated {
    pub status: String,
    pub gain: f64,
}

/// `GET /api/gain` and `POST /api/gain` over the shared gain store.
pub fn router(gain: GainStore) -> Router {
    Router::new()
        .route("/api/gain", get(get_gain).post(set_gain))
        .with_state(gain)
}

/// Serve the control API until `cancel` fires.
pub async fn serve(listener: TcpListener, gain: GainStore, cancel: CancellationToken) -> std::io::Result<()> {
    info!("API server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(gain))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn get_gain(State(gain): State<GainStore>) -> Json<GainResponse> {
    Json(GainResponse { gain: gain.get() })
}

// The body is parsed by hand so malformed JSON gets the same plain-text 400
// as a rejected value.
async fn set_gain(State(gain): State<GainStore>, body: Bytes) -> Response {
    let request: GainRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected gain request: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid JSON body").into_response();
        }
    };

    if request.gain == 0.0 {
        return (StatusCode::BAD_REQUEST, "Gain cannot be 0").into_response();
    }

    match gain.set(request.gain) {
        Ok(updated) => Json(GainUpdated {
            status: "success".to_string(),
            gain: updated,
        })
        .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}
