/// HTTP surface for the kiosk front end.
///
/// The front end drives the whole flow through four endpoints:
///
/// ```text
///   POST /session          → mint a session token, start at welcome
///   GET  /page/:page       → load a page (controller side effects)
///   POST /purpose          → submit the purpose message
///   GET  /next             → 200 + target page once a transition fired,
///                            204 while polling continues
/// ```
///
/// Page rendering stays in the front end; these endpoints only carry the
/// controller-relevant facts.
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use kiosk_proto::flow::Page;
use kiosk_proto::protocol::{NextReply, PurposeForm};

use crate::session::{SessionError, SessionRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session: String,
}

pub fn router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/session", post(create_session))
        .route("/page/:page", get(load_page))
        .route("/purpose", post(submit_purpose))
        .route("/next", get(next_page))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { registry })
}

// ── route handlers ────────────────────────────────────────────────────────────

async fn create_session(State(state): State<AppState>) -> Response {
    Json(state.registry.create().await).into_response()
}

async fn load_page(
    Path(slug): Path<String>,
    Query(query): Query<SessionQuery>,
    State(state): State<AppState>,
) -> Response {
    let Some(page) = Page::from_slug(&slug) else {
        warn!("page load for unknown slug {:?}", slug);
        return error_response(SessionError::UnknownPage(slug));
    };

    match state.registry.load_page(&query.session, page).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

async fn submit_purpose(
    State(state): State<AppState>,
    Form(form): Form<PurposeForm>,
) -> Response {
    match state.registry.submit_purpose(&form.session, &form.message).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

async fn next_page(
    Query(query): Query<SessionQuery>,
    State(state): State<AppState>,
) -> Response {
    match state.registry.next(&query.session).await {
        Ok(Some(page)) => Json(NextReply { page }).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::UnknownSession(_) | SessionError::UnknownPage(_) => StatusCode::NOT_FOUND,
        // The card-reader daemon was not reachable through the pipe.
        SessionError::Purpose(_) => StatusCode::BAD_GATEWAY,
    };
    warn!("request failed: {}", err);
    (status, err.to_string()).into_response()
}

// ── server startup ────────────────────────────────────────────────────────────

pub fn start_server(
    bind_address: String,
    port: u16,
    registry: Arc<SessionRegistry>,
) -> tokio::task::JoinHandle<()> {
    let app = router(registry);

    tokio::spawn(async move {
        let addr = format!("{}:{}", bind_address, port);
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                warn!("Failed to bind HTTP server on {}: {}", addr, e);
                return;
            }
        };
        info!("Kiosk HTTP server listening on http://{}", addr);
        if let Err(e) = axum::serve(listener, app).await {
            warn!("HTTP server error: {}", e);
        }
    })
}
