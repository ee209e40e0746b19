use atlas_context::{assemble_context, ContextError};
use atlas_protocol::{
    validate_context_request, validate_find_request, validate_query_request, Citation,
    ErrorEnvelope, FindResponse, HealthResponse, QueryResponse,
};
use atlas_search::{answer_question, search, write_search_notes};
use atlas_vault::VaultConfig;
use axum::{
    body::Bytes,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

pub(crate) struct AppState {
    pub config: VaultConfig,
}

type ApiReply = (StatusCode, Json<Value>);

pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/context/current",
            post({
                let state = state.clone();
                move |body| context_current(body, state.clone())
            }),
        )
        .route(
            "/find",
            post({
                let state = state.clone();
                move |body| find(body, state.clone())
            }),
        )
        .route(
            "/query",
            post({
                let state = state.clone();
                move |body| query(body, state.clone())
            }),
        )
        .fallback(unknown_route)
}

pub(crate) async fn serve(config: VaultConfig) -> anyhow::Result<()> {
    let port = config.port();
    let app = router(Arc::new(AppState { config }));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("Serving vault API on http://0.0.0.0:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> ApiReply {
    let body = HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    reply(StatusCode::OK, &body)
}

async fn context_current(body: Bytes, state: Arc<AppState>) -> ApiReply {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(reply) => return reply,
    };
    let params = match validate_context_request(&value) {
        Ok(params) => params,
        Err(violations) => return bad_request(&violations),
    };

    let max_sources = params
        .max_sources
        .unwrap_or_else(|| state.config.max_results());
    match assemble_context(&state.config, &params.include, max_sources) {
        Ok(sources) => {
            let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            (
                StatusCode::OK,
                Json(json!({ "generated_at": generated_at, "sources": sources })),
            )
        }
        Err(ContextError::RequiredDocumentMissing(path)) => error_reply(
            StatusCode::NOT_FOUND,
            ErrorEnvelope::not_found(format!("Required document missing: {path}")),
        ),
        Err(err) => internal(&err),
    }
}

async fn find(body: Bytes, state: Arc<AppState>) -> ApiReply {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(reply) => return reply,
    };
    let params = match validate_find_request(&value) {
        Ok(params) => params,
        Err(violations) => return bad_request(&violations),
    };

    let max_results = params
        .max_results
        .unwrap_or_else(|| state.config.max_results());
    let hits = match search(&state.config, &params.term, max_results) {
        Ok(hits) => hits,
        Err(err) => return internal(&err),
    };
    if let Err(err) = write_search_notes(&state.config, &params.term, &hits) {
        return internal(&err);
    }

    let results = hits
        .into_iter()
        .map(|hit| Citation {
            path: hit.path,
            anchor: hit.anchor,
            quote: hit.quote,
        })
        .collect();
    reply(
        StatusCode::OK,
        &FindResponse {
            term: params.term,
            results,
        },
    )
}

async fn query(body: Bytes, state: Arc<AppState>) -> ApiReply {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(reply) => return reply,
    };
    let params = match validate_query_request(&value) {
        Ok(params) => params,
        Err(violations) => return bad_request(&violations),
    };

    match answer_question(&state.config, &params.question) {
        Ok(answer) => reply(
            StatusCode::OK,
            &QueryResponse {
                answer: answer.answer,
                citations: answer.citations,
            },
        ),
        Err(err) => internal(&err),
    }
}

async fn unknown_route() -> ApiReply {
    error_reply(
        StatusCode::NOT_FOUND,
        ErrorEnvelope::not_found("Unknown route"),
    )
}

fn parse_body(body: &Bytes) -> Result<Value, ApiReply> {
    if body.is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_slice(body)
        .map_err(|_| bad_request(&["body must be valid JSON".to_string()]))
}

fn reply<T: serde::Serialize>(status: StatusCode, body: &T) -> ApiReply {
    match serde_json::to_value(body) {
        Ok(value) => (status, Json(value)),
        Err(err) => internal(&err),
    }
}

fn bad_request(violations: &[String]) -> ApiReply {
    error_reply(
        StatusCode::BAD_REQUEST,
        ErrorEnvelope::bad_request(violations),
    )
}

fn error_reply(status: StatusCode, envelope: ErrorEnvelope) -> ApiReply {
    match serde_json::to_value(&envelope) {
        Ok(value) => (status, Json(value)),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"code": "INTERNAL", "message": "serialization failed", "details": {}}})),
        ),
    }
}

// Details stay generic so internal paths never reach the response body.
fn internal(err: &dyn std::fmt::Display) -> ApiReply {
    log::error!("request failed: {err}");
    error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorEnvelope::internal("Internal error"),
    )
}
