//! REST surface: the messaging endpoint, search submission/polling, and the
//! tracking sink endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::alerts::{BookingClickRequest, NotificationSink, PriceAlertRequest};
use crate::error::Error;
use crate::gateway::ConversationalGateway;
use crate::search::model::SearchRequest;
use crate::search::store::TaskStore;
use crate::search::SearchOrchestrator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ConversationalGateway>,
    pub orchestrator: Arc<SearchOrchestrator>,
    pub tasks: Arc<TaskStore>,
    pub sink: Arc<NotificationSink>,
}

/// Build the Axum router with all REST routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/message", post(inbound_message))
        .route("/search", post(submit_search))
        .route("/search/status/{task_id}", get(search_status))
        .route("/price-alert", post(price_alert))
        .route("/booking-click", post(booking_click))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_body(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message.into() }))
}

/// Map internal errors onto the REST taxonomy: validation problems are 4xx,
/// everything else is a 500.
fn error_response(error: Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &error {
        Error::Gateway(_) | Error::Alert(_) => StatusCode::BAD_REQUEST,
        Error::Search(crate::error::SearchError::InvalidRequest { .. }) => StatusCode::BAD_REQUEST,
        Error::Search(crate::error::SearchError::TaskNotFound { .. }) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error_body(error.to_string()))
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "flight-assist"
    }))
}

// ── Messaging ───────────────────────────────────────────────────────────

/// Inbound message from the channel transport.
#[derive(Debug, Deserialize)]
struct InboundMessage {
    user_id: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct OutboundReply {
    reply: String,
}

/// POST /api/message
///
/// The single entry point to onboarding and, for active contacts, search.
async fn inbound_message(
    State(state): State<AppState>,
    Json(inbound): Json<InboundMessage>,
) -> impl IntoResponse {
    match state
        .gateway
        .handle_message(&inbound.user_id, &inbound.message)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(OutboundReply { reply })).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

// ── Search ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SubmitResponse {
    task_id: Uuid,
}

/// POST /search — returns the task id immediately; work continues async.
async fn submit_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    match state.orchestrator.submit(request).await {
        Ok(task_id) => (StatusCode::ACCEPTED, Json(SubmitResponse { task_id })).into_response(),
        Err(e) => error_response(e.into()).into_response(),
    }
}

/// GET /search/status/{task_id} — poll a task. Unknown or expired ids are 404.
async fn search_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.tasks.snapshot(task_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e.into()).into_response(),
    }
}

// ── Tracking sink ───────────────────────────────────────────────────────

/// POST /price-alert — validated write; duplicates allowed.
async fn price_alert(
    State(state): State<AppState>,
    Json(request): Json<PriceAlertRequest>,
) -> impl IntoResponse {
    match state.sink.record_price_alert(request).await {
        Ok(alert) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "alert_id": alert.id })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// POST /booking-click — fire-and-forget; always accepted.
async fn booking_click(
    State(state): State<AppState>,
    Json(request): Json<BookingClickRequest>,
) -> impl IntoResponse {
    state.sink.record_booking_click(request).await;
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "accepted" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::contacts::ContactStore;
    use crate::error::ProviderError;
    use crate::search::model::RawItinerary;
    use crate::search::provider::{FlightProvider, LegQuery};
    use crate::search::strategy::RouteBook;
    use crate::store::{Database, LibSqlBackend};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    struct CannedProvider;

    #[async_trait]
    impl FlightProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn search(&self, query: &LegQuery) -> Result<Vec<RawItinerary>, ProviderError> {
            if query.origin == "DAR" && query.destination == "DXB" {
                Ok(vec![RawItinerary {
                    provider: "canned".into(),
                    airline: "Emirates".into(),
                    airline_code: "EK".into(),
                    routing: vec!["DAR".into(), "DXB".into()],
                    stops: 0,
                    through_fare: true,
                    price_total: dec!(400),
                    currency: "USD".into(),
                    duration_minutes: 330,
                    departure: Utc.with_ymd_and_hms(2026, 10, 1, 10, 0, 0).unwrap(),
                    arrival: Utc.with_ymd_and_hms(2026, 10, 1, 15, 30, 0).unwrap(),
                    booking_url: None,
                }])
            } else {
                Ok(vec![])
            }
        }
    }

    async fn app() -> Router {
        let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let contacts = ContactStore::new(Arc::clone(&db));
        let tasks = TaskStore::new();
        let orchestrator = SearchOrchestrator::new(
            SearchConfig::default(),
            Arc::new(RouteBook::builtin()),
            vec![Arc::new(CannedProvider)],
            Arc::clone(&tasks),
        );
        let sink = NotificationSink::new(Arc::clone(&db));
        let gateway = ConversationalGateway::new(contacts, Arc::clone(&orchestrator), Arc::clone(&sink));
        api_routes(AppState {
            gateway,
            orchestrator,
            tasks,
            sink,
        })
    }

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app().await;
        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn message_endpoint_runs_onboarding() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/api/message",
            serde_json::json!({"user_id": "+255712345678", "message": "hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["reply"].as_str().unwrap().contains("jina"));
    }

    #[tokio::test]
    async fn search_submits_and_is_pollable() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/search",
            serde_json::json!({
                "origin": "DAR",
                "destination": "DXB",
                "departure_date": "2026-10-01",
                "passengers": {"adults": 1, "children": 0, "infants": 0},
                "travel_class": "economy"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let task_id = body["task_id"].as_str().unwrap().to_string();

        // Poll until the worker finishes.
        for _ in 0..200 {
            let (status, body) = get_json(&app, &format!("/search/status/{task_id}")).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] != "processing" {
                assert_eq!(body["status"], "completed");
                assert_eq!(body["progress"]["percentage"], 100);
                assert!(body["results"]["direct"].as_array().unwrap().len() > 0);
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("search never completed");
    }

    #[tokio::test]
    async fn invalid_search_is_rejected() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/search",
            serde_json::json!({
                "origin": "DAR",
                "destination": "DAR",
                "departure_date": "2026-10-01"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("same"));
    }

    #[tokio::test]
    async fn unknown_task_is_404() {
        let app = app().await;
        let (status, _) = get_json(&app, &format!("/search/status/{}", Uuid::new_v4())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn price_alert_validates_email() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/price-alert",
            serde_json::json!({
                "email": "not-an-email",
                "origin": "DAR",
                "destination": "DXB",
                "departure_date": "2026-10-01"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("email"));

        let (status, body) = post_json(
            &app,
            "/price-alert",
            serde_json::json!({
                "email": "asha@example.com",
                "origin": "DAR",
                "destination": "DXB",
                "departure_date": "2026-10-01"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["alert_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn booking_click_is_always_accepted() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/booking-click",
            serde_json::json!({
                "origin": "DAR",
                "destination": "DXB",
                "booking_site": "emirates.com",
                "price": "400.00"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "accepted");
    }
}
