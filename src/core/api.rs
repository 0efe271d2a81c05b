//! HTTP + WebSocket API for Tiltlock
//!
//! Endpoints:
//! - POST /session/new - Create new challenge session
//! - GET /session/{id} - Get session status
//! - POST /session/{id}/sample - Submit an orientation event, run one tick
//! - POST /session/{id}/permission - Resolve the permission request
//! - POST /session/{id}/reset - Restart the challenge from tilt-left
//! - GET /session/{id}/score - Get final score breakdown
//! - POST /risk/evaluate - Stateless traffic risk classifier
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::core::challenge::ChallengeEngine;
use crate::core::risk::evaluate_risk;
use crate::types::{
    Capability, ChallengeEvent, ChallengePhase, EngineStatus, OrientationEvent, PermissionOutcome,
    RiskAssessment, RiskRequest, ScoreBreakdown, TickOutput,
};

/// Session state
pub struct Session {
    pub id: String,
    pub engine: ChallengeEngine,
    pub update_tx: broadcast::Sender<SessionUpdate>,
}

/// Live update message
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    pub status: EngineStatus,
    pub phase: ChallengePhase,
    pub hold_progress_pct: f64,
    pub stability_pct: Option<f64>,
    pub task_completed: bool,
    pub challenge_completed: bool,
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
}

/// Create new session request
#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    /// Negotiated platform capability; defaults to granted
    pub capability: Option<Capability>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub status: EngineStatus,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub status: EngineStatus,
    pub phase: ChallengePhase,
    pub sample_count: usize,
    pub tick_count: u64,
    /// Current smoothed angles, if any reading has arrived
    pub smoothed_pitch_deg: Option<f64>,
    pub smoothed_roll_deg: Option<f64>,
    pub score_available: bool,
}

/// Submit sample response
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    /// False when the tick was skipped (rate cap or inactive engine)
    pub processed: bool,
    pub status: EngineStatus,
    pub phase: ChallengePhase,
    pub output: Option<TickOutput>,
    pub breakdown: Option<ScoreBreakdown>,
}

/// Resolve permission request
#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub outcome: PermissionOutcome,
    /// Driver clock at resolution time; anchors the first task's timing
    pub timestamp_ms: Option<f64>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router() -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/sample", post(submit_sample))
        .route("/session/:id/permission", post(resolve_permission))
        .route("/session/:id/reset", post(reset_session))
        .route("/session/:id/score", get(get_score))
        .route("/risk/evaluate", post(risk_evaluate))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let mut engine = ChallengeEngine::new();
    let status = engine.start(req.capability.unwrap_or(Capability::Granted), 0.0);

    let session = Session {
        id: session_id.clone(),
        engine,
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Ok(Json(NewSessionResponse {
        session_id: session_id.clone(),
        status,
        websocket_url: format!("/ws/{}", session_id),
    }))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let smoothed = session.engine.smoothed();
    Ok(Json(SessionStatusResponse {
        session_id: id,
        status: session.engine.status(),
        phase: session.engine.phase(),
        sample_count: session.engine.sample_count(),
        tick_count: session.engine.tick_count(),
        smoothed_pitch_deg: smoothed.map(|(pitch, _)| pitch),
        smoothed_roll_deg: smoothed.map(|(_, roll)| roll),
        score_available: session.engine.breakdown().is_some(),
    }))
}

/// Submit an orientation event and run one tick at the event's timestamp
async fn submit_sample(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(event): Json<OrientationEvent>,
) -> Result<Json<SampleResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.engine.submit(event);
    let output = session.engine.tick(event.timestamp_ms);

    if let Some(ref output) = output {
        let update = SessionUpdate {
            status: session.engine.status(),
            phase: output.phase,
            hold_progress_pct: output.hold_progress_pct,
            stability_pct: output.stability_pct,
            task_completed: output
                .events
                .iter()
                .any(|e| matches!(e, ChallengeEvent::TaskCompleted { .. })),
            challenge_completed: output
                .events
                .iter()
                .any(|e| matches!(e, ChallengeEvent::ChallengeCompleted { .. })),
        };
        let _ = session.update_tx.send(update);
    }

    Ok(Json(SampleResponse {
        processed: output.is_some(),
        status: session.engine.status(),
        phase: session.engine.phase(),
        breakdown: session.engine.breakdown().cloned(),
        output,
    }))
}

/// Resolve the pending permission request
async fn resolve_permission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PermissionRequest>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session
        .engine
        .resolve_permission(req.outcome, req.timestamp_ms.unwrap_or(0.0));

    let smoothed = session.engine.smoothed();
    Ok(Json(SessionStatusResponse {
        session_id: id,
        status: session.engine.status(),
        phase: session.engine.phase(),
        sample_count: session.engine.sample_count(),
        tick_count: session.engine.tick_count(),
        smoothed_pitch_deg: smoothed.map(|(pitch, _)| pitch),
        smoothed_roll_deg: smoothed.map(|(_, roll)| roll),
        score_available: session.engine.breakdown().is_some(),
    }))
}

/// Restart the challenge from tilt-left
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.engine.reset();

    Ok(Json(SessionStatusResponse {
        session_id: id,
        status: session.engine.status(),
        phase: session.engine.phase(),
        sample_count: session.engine.sample_count(),
        tick_count: session.engine.tick_count(),
        smoothed_pitch_deg: None,
        smoothed_roll_deg: None,
        score_available: false,
    }))
}

/// Get the final score breakdown (404 until the challenge completes)
async fn get_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ScoreBreakdown>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let breakdown = session.engine.breakdown().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(breakdown.clone()))
}

/// Stateless traffic risk classifier
async fn risk_evaluate(
    Json(req): Json<RiskRequest>,
) -> Result<Json<RiskAssessment>, (StatusCode, Json<serde_json::Value>)> {
    match evaluate_risk(&req) {
        Ok(assessment) => Ok(Json(assessment)),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": err.reason })),
        )),
    }
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward session updates; drop the connection when the client goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SessionUpdate>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Ok(update) = update else { break };
                let json = serde_json::to_string(&update).unwrap_or_default();
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("session_{:x}", nanos as u64)
}

/// Run the API server
pub async fn run_server(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Tiltlock API running on {}", addr);
    println!("  POST /session/new            - Create session");
    println!("  GET  /session/:id            - Get status");
    println!("  POST /session/:id/sample     - Submit orientation event");
    println!("  POST /session/:id/permission - Resolve permission request");
    println!("  POST /session/:id/reset      - Restart challenge");
    println!("  GET  /session/:id/score      - Get score breakdown");
    println!("  POST /risk/evaluate          - Traffic risk classifier");
    println!("  WS   /ws/:id                 - Live updates");
    println!("  GET  /health                 - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
