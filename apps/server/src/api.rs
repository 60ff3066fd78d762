use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::{
    config::Config,
    error::ApiResult,
    main_lib::AppState,
    models::{Bookmark, DeleteBookmarkRequest, DeleteBookmarkResponse, NewBookmark},
};
use axum::{
    extract::{Path, Query, State},
    http::HeaderValue,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{delete, get},
    Json, Router,
};
use futures_core::stream::Stream;
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBookmarksQuery {
    #[serde(default)]
    owner_identity: String,
}

#[utoipa::path(get, path = "/api/v1/bookmarks", responses((status = 200, body = [Bookmark]), (status = 400)))]
async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBookmarksQuery>,
) -> ApiResult<Json<Vec<Bookmark>>> {
    let bookmarks = state.bookmark_service.list_bookmarks(&query.owner_identity)?;
    Ok(Json(bookmarks.into_iter().map(Bookmark::from).collect()))
}

#[utoipa::path(post, path = "/api/v1/bookmarks", request_body = NewBookmark, responses((status = 200, body = Bookmark), (status = 400)))]
async fn create_bookmark(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewBookmark>,
) -> ApiResult<Json<Bookmark>> {
    let created = state
        .bookmark_service
        .create_bookmark(payload.into())
        .await?;
    Ok(Json(Bookmark::from(created)))
}

#[utoipa::path(delete, path = "/api/v1/bookmarks/{id}", request_body = DeleteBookmarkRequest, responses((status = 200, body = DeleteBookmarkResponse), (status = 404)))]
async fn delete_bookmark(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DeleteBookmarkRequest>,
) -> ApiResult<Json<DeleteBookmarkResponse>> {
    state
        .bookmark_service
        .delete_bookmark(&id, &payload.owner_identity)
        .await?;
    Ok(Json(DeleteBookmarkResponse { success: true }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamEventsQuery {
    owner_identity: Option<String>,
}

/// Push channel: one SSE stream per client, joined to the broadcast group
/// named by `ownerIdentity`. Dropping the stream (client disconnect) leaves
/// the group implicitly.
async fn stream_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamEventsQuery>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let mut subscription = state.event_hub.subscribe(query.owner_identity.as_deref());
    let events = futures::stream::poll_fn(move |cx| subscription.poll_recv(cx));
    let stream = tokio_stream::StreamExt::filter_map(events, |event| {
        match SseEvent::default().event(event.name).json_data(&event.payload) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(err) => {
                tracing::error!("Failed to serialize SSE payload for {}: {}", event.name, err);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(healthz, readyz, list_bookmarks, create_bookmark, delete_bookmark),
    components(schemas(Bookmark, NewBookmark, DeleteBookmarkRequest, DeleteBookmarkResponse)),
    tags((name = "linkstash"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allow
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/bookmarks", get(list_bookmarks).post(create_bookmark))
        .route("/bookmarks/{id}", delete(delete_bookmark))
        .route("/events/stream", get(stream_events));

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
