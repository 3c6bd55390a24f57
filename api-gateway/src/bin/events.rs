//! Events API Lambda - CRUD over event records in DynamoDB.
//!
//! Endpoints:
//! - GET / - Welcome message
//! - GET /health - Liveness probe
//! - POST /events - Create an event
//! - GET /events?status= - List events, optionally filtered by status
//! - GET /events/{id} - Fetch a single event
//! - PUT /events/{id} - Partially update an event
//! - DELETE /events/{id} - Delete an event

use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, RequestExt, Response};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use validator::Validate;

use shared::cors::CorsPolicy;
use shared::error::Error;
use shared::http::{empty_response, error_response, json_response, parse_body};
use shared::models::{CreateEventRequest, UpdateEventRequest};
use shared::store::{DynamoDbEventStore, EventStore};
use shared::Config;

const WELCOME_MESSAGE: &str = "Welcome to the Events Management API";

/// Application state shared across invocations.
struct AppState<S> {
    store: S,
    cors: CorsPolicy,
    debug_errors: bool,
}

async fn handler<S: EventStore>(
    state: Arc<AppState<S>>,
    event: Request,
) -> Result<Response<Body>, LambdaError> {
    let method = event.method().as_str().to_string();
    let path = event.uri().path().to_string();
    let origin = event
        .headers()
        .get("origin")
        .and_then(|value| value.to_str().ok())
        .map(String::from);

    info!("Events request: {} {}", method, path);

    match route(&state, &event, origin.as_deref()).await {
        Ok(response) => Ok(response),
        Err(err) => {
            // Full detail stays server-side regardless of what the
            // client is shown.
            error!("{} {} failed: {:?}", method, path, err);
            let cors = state.cors.response_headers(origin.as_deref());
            error_response(
                &err,
                operation_label(&method, &path),
                state.debug_errors,
                &cors,
            )
        }
    }
}

/// Human label for the operation implied by the route, used in generic
/// failure messages ("Failed to create event").
fn operation_label(method: &str, path: &str) -> &'static str {
    let path = path.trim_end_matches('/');
    match (method, path) {
        ("POST", "/events") => "create event",
        ("GET", "/events") => "list events",
        _ if path.starts_with("/events/") => match method {
            "GET" => "get event",
            "PUT" => "update event",
            "DELETE" => "delete event",
            _ => "handle request",
        },
        _ => "handle request",
    }
}

async fn route<S: EventStore>(
    state: &AppState<S>,
    event: &Request,
    origin: Option<&str>,
) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path().trim_end_matches('/');
    let cors = state.cors.response_headers(origin);

    if method == "OPTIONS" {
        return empty_response(204, &state.cors.preflight_headers(origin));
    }

    match (method, path) {
        ("GET", "") => json_response(200, &json!({"message": WELCOME_MESSAGE}), &cors),
        ("GET", "/health") => json_response(200, &json!({"status": "healthy"}), &cors),
        ("POST", "/events") => create_event(state, event, &cors).await,
        ("GET", "/events") => list_events(state, event, &cors).await,
        (_, "/events") => method_not_allowed(&cors),
        _ if path.starts_with("/events/") => {
            let event_id = decode_event_id(&path["/events/".len()..])?;
            match method {
                "GET" => get_event(state, &event_id, &cors).await,
                "PUT" => update_event(state, event, &event_id, &cors).await,
                "DELETE" => delete_event(state, &event_id, &cors).await,
                _ => method_not_allowed(&cors),
            }
        }
        _ => Err(Error::NotFound("Resource not found".to_string())),
    }
}

/// Percent-decode the id path segment and reject blank ids.
fn decode_event_id(raw: &str) -> Result<String, Error> {
    let event_id = urlencoding::decode(raw)
        .map_err(|_| Error::BadRequest("Event id must be valid UTF-8".to_string()))?
        .into_owned();
    if event_id.trim().is_empty() {
        return Err(Error::BadRequest("Event id must not be empty".to_string()));
    }
    Ok(event_id)
}

fn method_not_allowed(cors: &[(&'static str, String)]) -> Result<Response<Body>, Error> {
    json_response(405, &json!({"detail": "Method Not Allowed"}), cors)
}

/// POST /events
async fn create_event<S: EventStore>(
    state: &AppState<S>,
    event: &Request,
    cors: &[(&'static str, String)],
) -> Result<Response<Body>, Error> {
    let payload: CreateEventRequest = parse_body(event.body())?;
    payload.validate()?;
    let new_event = payload
        .into_new_event()
        .ok_or_else(|| Error::Internal("required field missing after validation".to_string()))?;

    let created = state.store.create(new_event).await?;
    info!("created event {}", created.event_id);
    json_response(201, &created, cors)
}

/// GET /events?status=
async fn list_events<S: EventStore>(
    state: &AppState<S>,
    event: &Request,
    cors: &[(&'static str, String)],
) -> Result<Response<Body>, Error> {
    let params = event.query_string_parameters();
    let status_filter = params.first("status").filter(|status| !status.is_empty());

    let events = state.store.list(status_filter).await?;
    json_response(200, &events, cors)
}

/// GET /events/{id}
async fn get_event<S: EventStore>(
    state: &AppState<S>,
    event_id: &str,
    cors: &[(&'static str, String)],
) -> Result<Response<Body>, Error> {
    match state.store.get(event_id).await? {
        Some(event) => json_response(200, &event, cors),
        None => Err(Error::NotFound(format!(
            "Event with id '{event_id}' not found"
        ))),
    }
}

/// PUT /events/{id}
async fn update_event<S: EventStore>(
    state: &AppState<S>,
    event: &Request,
    event_id: &str,
    cors: &[(&'static str, String)],
) -> Result<Response<Body>, Error> {
    let payload: UpdateEventRequest = parse_body(event.body())?;
    payload.validate()?;

    // Existence is a separate read; see the adapter notes on this race.
    if state.store.get(event_id).await?.is_none() {
        return Err(Error::NotFound(format!(
            "Event with id '{event_id}' not found"
        )));
    }
    if payload.is_empty() {
        return Err(Error::BadRequest(
            "No fields provided for update".to_string(),
        ));
    }

    let updated = state.store.update(event_id, payload.into_patch()).await?;
    info!("updated event {}", updated.event_id);
    json_response(200, &updated, cors)
}

/// DELETE /events/{id}
async fn delete_event<S: EventStore>(
    state: &AppState<S>,
    event_id: &str,
    cors: &[(&'static str, String)],
) -> Result<Response<Body>, Error> {
    if state.store.get(event_id).await?.is_none() {
        return Err(Error::NotFound(format!(
            "Event with id '{event_id}' not found"
        )));
    }

    state.store.delete(event_id).await?;
    info!("deleted event {}", event_id);
    empty_response(204, cors)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env();
    let state = Arc::new(AppState {
        store: DynamoDbEventStore::from_config(&config).await,
        cors: CorsPolicy::new(&config.cors_origins),
        debug_errors: config.debug_errors,
    });

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
