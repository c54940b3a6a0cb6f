//! HTTP routes.
//!
//! Each route maps to exactly one service call. Payloads are enveloped as
//! `{"status": "ok", "data": ...}` / `{"status": "error", "error": ...}`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use pokebox_domain::{DexNumber, EntryDraft, EntryId, UserId};

use crate::app::App;
use crate::use_cases::ServiceError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/v1/pokedex", get(list_pokedex))
        .route("/api/v1/pokedex/{dex}", get(get_pokedex_entry))
        .route("/api/v1/box/{user_id}", get(list_box).post(add_to_box))
        .route(
            "/api/v1/box/{user_id}/{entry_id}",
            get(get_box_entry).put(update_box_entry).delete(remove_from_box),
        )
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Pokedex
// =============================================================================

async fn list_pokedex(State(app): State<Arc<App>>) -> Result<impl axum::response::IntoResponse, ApiError> {
    if app.catalog.is_empty() {
        return Err(ApiError::NotFound("No pokedex loaded".to_string()));
    }
    Ok(ok_response(app.catalog.all()))
}

async fn get_pokedex_entry(
    State(app): State<Arc<App>>,
    Path(dex): Path<u32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let species = app
        .catalog
        .lookup(DexNumber::new(dex))
        .ok_or_else(|| ApiError::NotFound(format!("No species for dex {dex}")))?;
    Ok(ok_response(species))
}

// =============================================================================
// Box CRUD
// =============================================================================

async fn list_box(
    State(app): State<Arc<App>>,
    Path(user_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let user_id = parse_user(&user_id)?;
    let entries = app.boxes.list_entries(&user_id).await?;
    Ok(ok_response(entries))
}

async fn add_to_box(
    State(app): State<Arc<App>>,
    Path(user_id): Path<String>,
    body: Result<Json<EntryDraft>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let user_id = parse_user(&user_id)?;
    let Json(draft) = body.map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))?;
    let entry = app.boxes.add_entry(&user_id, &draft).await?;
    Ok(ok_response(entry))
}

async fn get_box_entry(
    State(app): State<Arc<App>>,
    Path((user_id, entry_id)): Path<(String, Uuid)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let user_id = parse_user(&user_id)?;
    let entry = app
        .boxes
        .get_entry(&user_id, EntryId::from_uuid(entry_id))
        .await?;
    Ok(ok_response(entry))
}

async fn update_box_entry(
    State(app): State<Arc<App>>,
    Path((user_id, entry_id)): Path<(String, Uuid)>,
    body: Result<Json<EntryDraft>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let user_id = parse_user(&user_id)?;
    let Json(draft) = body.map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))?;
    let entry = app
        .boxes
        .update_entry(&user_id, EntryId::from_uuid(entry_id), &draft)
        .await?;
    Ok(ok_response(entry))
}

async fn remove_from_box(
    State(app): State<Arc<App>>,
    Path((user_id, entry_id)): Path<(String, Uuid)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let user_id = parse_user(&user_id)?;
    let removed = app
        .boxes
        .remove_entry(&user_id, EntryId::from_uuid(entry_id))
        .await?;
    Ok(ok_response(removed))
}

fn parse_user(raw: &str) -> Result<UserId, ApiError> {
    UserId::from_str(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// =============================================================================
// Response envelope
// =============================================================================

#[derive(Serialize)]
struct OkEnvelope<T> {
    status: &'static str,
    data: T,
}

fn ok_response<T: Serialize>(data: T) -> Json<OkEnvelope<T>> {
    Json(OkEnvelope { status: "ok", data })
}

#[derive(Serialize)]
struct ErrorEnvelope {
    status: &'static str,
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                // Log the detail, never leak it to the client.
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        (
            status,
            Json(ErrorEnvelope {
                status: "error",
                error,
            }),
        )
            .into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ServiceError::Duplicate(_) => ApiError::Conflict(e.to_string()),
            ServiceError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::infrastructure::json_store::JsonBoxRepo;
    use crate::infrastructure::pokedex::Pokedex;

    fn test_router(dir: &tempfile::TempDir) -> Router {
        let repo = Arc::new(JsonBoxRepo::new(dir.path().join("boxes.json")).expect("repo"));
        let app = App::with_ports(repo, Arc::new(Pokedex::empty()));
        routes().with_state(app)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    const PIKACHU: &str =
        r#"{"name": "Sparky", "sprite": "pokemon_icon_025_00.png", "cp": 1500}"#;

    #[tokio::test]
    async fn add_then_list_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = test_router(&dir);

        let response = router
            .clone()
            .oneshot(post_json("/api/v1/box/ash", PIKACHU))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["data"]["cp"], 1500);
        let id = body["data"]["id"].as_str().expect("id").to_string();

        let response = router
            .clone()
            .oneshot(get("/api/v1/box/ash"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let listed = body["data"].as_array().expect("array");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], id.as_str());
        assert_eq!(listed[0]["name"], "Sparky");
        assert_eq!(listed[0]["dex"], 25);
    }

    #[tokio::test]
    async fn negative_cp_is_rejected_with_400() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = test_router(&dir);

        let bad = r#"{"sprite": "pokemon_icon_025_00.png", "cp": -1}"#;
        let response = router
            .clone()
            .oneshot(post_json("/api/v1/box/ash", bad))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");

        // Store unchanged.
        let response = router
            .oneshot(get("/api/v1/box/ash"))
            .await
            .expect("response");
        let body = body_json(response).await;
        assert_eq!(body["data"].as_array().expect("array").len(), 0);
    }

    #[tokio::test]
    async fn malformed_json_body_is_rejected_with_400() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = test_router(&dir);

        let response = router
            .oneshot(post_json("/api/v1/box/ash", "{not json"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn missing_entry_maps_to_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = test_router(&dir);
        let missing = uuid::Uuid::new_v4();

        let response = router
            .clone()
            .oneshot(get(&format!("/api/v1/box/ash/{missing}")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/box/ash/{missing}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_pokedex_returns_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = test_router(&dir);

        let response = router
            .oneshot(get("/api/v1/pokedex"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_endpoint_answers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = test_router(&dir);

        let response = router.oneshot(get("/api/health")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
