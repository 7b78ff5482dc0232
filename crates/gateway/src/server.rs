//! HTTP surface: router construction and the webhook handlers.

use std::collections::HashMap;

use {
    axum::{
        Router,
        body::Bytes,
        extract::{Query, State},
        http::StatusCode,
        response::{IntoResponse, Json},
        routing::get,
    },
    tracing::{error, info},
};

use gembot_whatsapp::{WebhookPayload, verify_subscription};

use crate::{relay, relay::IngestStatus, state::AppState};

/// Build the relay router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler).post(index_handler))
        .route("/webhook", get(verify_handler).post(ingest_handler))
        .with_state(state)
}

/// Start the webhook server.
pub async fn start(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.settings.bind, state.settings.port);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "webhook server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Constant acknowledgement for platform liveness probes.
async fn index_handler() -> &'static str {
    "Bot"
}

/// `GET /webhook` — subscription verification. Echoes the challenge on a
/// token match, 403 "Failed" otherwise. No side effects.
async fn verify_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let verified = verify_subscription(
        params.get("hub.mode").map(String::as_str),
        params.get("hub.verify_token").map(String::as_str),
        params.get("hub.challenge").map(String::as_str),
        &state.settings.verify_token,
    );

    match verified {
        Some(challenge) => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge)
        },
        None => (StatusCode::FORBIDDEN, "Failed".to_string()),
    }
}

/// `POST /webhook` — message ingestion.
///
/// Always 200: the platform retries non-2xx deliveries, so internal errors
/// are logged and acknowledged. The body is parsed manually for the same
/// reason — an extractor rejection would leak a 4xx to the platform.
async fn ingest_handler(State(state): State<AppState>, body: Bytes) -> Json<serde_json::Value> {
    let status = match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => match relay::handle_payload(&state, payload).await {
            Ok(status) => status,
            Err(e) => {
                error!(stage = e.stage(), error = %e, "ingestion failed");
                IngestStatus::Ok
            },
        },
        Err(e) => {
            error!(error = %e, "webhook body is not valid json");
            IngestStatus::Ok
        },
    };

    Json(serde_json::json!({ "status": status.as_str() }))
}
