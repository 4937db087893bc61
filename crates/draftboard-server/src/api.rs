//! HTTP API over the KV store.
//!
//! Records travel as raw JSON documents: handlers assign ids, merge
//! updates shallowly onto the stored object, and stamp the few
//! server-authoritative fields (deletion markers, comment ids and
//! dates).  Everything else is stored exactly as the client sent it.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use draftboard_store::Database;

use crate::auth::require_bearer;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::uploads::{content_type_for, UploadStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub uploads: UploadStore,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let api = Router::new()
        .route("/logs", get(list_logs).post(create_log))
        .route("/logs/:id", put(update_log).delete(soft_delete_log))
        .route("/logs/:id/restore", post(restore_log))
        .route("/logs/:id/permanent", delete(permanently_delete_log))
        .route("/logs/:id/comments", post(add_log_comment))
        .route("/upload-image", post(upload_image))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/pin", put(update_user_pin))
        .route("/users/:id/access", put(update_user_access))
        .route("/wiki", get(list_wiki_pages).post(create_wiki_page))
        .route("/wiki/:id", put(update_wiki_page).delete(delete_wiki_page))
        .route("/resources", get(list_resources).post(create_resource))
        .route(
            "/resources/:id",
            put(update_resource).delete(delete_resource),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    // Health and stored images stay outside the bearer check: images are
    // fetched by <img> tags that cannot attach headers.
    Router::new()
        .route("/health", get(health_check))
        .route("/uploads/:name", get(serve_upload))
        .merge(api)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

// ─── Record plumbing ───

/// Overwrite (or install) the record's `id`.  Rejects non-object bodies.
fn with_id(mut body: Value, id: &str) -> Result<Value, ServerError> {
    let Some(obj) = body.as_object_mut() else {
        return Err(ServerError::BadRequest("Expected a JSON object".to_string()));
    };
    obj.insert("id".to_string(), Value::String(id.to_string()));
    Ok(body)
}

/// Shallow-merge `updates` onto `record`, field by field, then pin the
/// id back to the path parameter so an update can never move a record.
fn merge_onto(record: &mut Value, updates: Value, id: &str) -> Result<(), ServerError> {
    let Some(target) = record.as_object_mut() else {
        return Err(ServerError::Internal(
            "Stored record is not an object".to_string(),
        ));
    };
    let Value::Object(updates) = updates else {
        return Err(ServerError::BadRequest("Expected a JSON object".to_string()));
    };

    for (key, value) in updates {
        target.insert(key, value);
    }
    target.insert("id".to_string(), Value::String(id.to_string()));
    Ok(())
}

async fn create_record(
    state: &AppState,
    prefix: &str,
    body: Value,
) -> Result<Value, ServerError> {
    let id = Uuid::new_v4().to_string();
    let record = with_id(body, &id)?;
    state
        .db
        .lock()
        .await
        .kv_set(&format!("{prefix}{id}"), &record)?;
    Ok(record)
}

async fn update_record(
    state: &AppState,
    prefix: &str,
    label: &str,
    id: &str,
    updates: Value,
) -> Result<Value, ServerError> {
    let db = state.db.lock().await;
    let key = format!("{prefix}{id}");
    let mut record = db
        .kv_get(&key)?
        .ok_or_else(|| ServerError::NotFound(format!("{label} not found")))?;
    merge_onto(&mut record, updates, id)?;
    db.kv_set(&key, &record)?;
    Ok(record)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ─── Design logs ───

async fn list_logs(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
    let logs = state.db.lock().await.kv_get_by_prefix("log:")?;
    Ok(Json(json!({ "logs": logs })))
}

async fn create_log(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ServerError> {
    let log = create_record(&state, "log:", body).await?;
    info!(id = %log["id"], "log created");
    Ok((StatusCode::CREATED, Json(json!({ "log": log }))))
}

async fn update_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    let log = update_record(&state, "log:", "Log", &id, updates).await?;
    Ok(Json(json!({ "log": log })))
}

async fn soft_delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let db = state.db.lock().await;
    let key = format!("log:{id}");
    let mut log = db
        .kv_get(&key)?
        .ok_or_else(|| ServerError::NotFound("Log not found".to_string()))?;

    merge_onto(
        &mut log,
        json!({ "deleted": true, "deletedAt": now_rfc3339() }),
        &id,
    )?;
    db.kv_set(&key, &log)?;

    info!(id = %id, "log soft-deleted");
    Ok(Json(json!({ "success": true })))
}

async fn restore_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let db = state.db.lock().await;
    let key = format!("log:{id}");
    let mut log = db
        .kv_get(&key)?
        .ok_or_else(|| ServerError::NotFound("Log not found".to_string()))?;

    if let Some(obj) = log.as_object_mut() {
        obj.insert("deleted".to_string(), Value::Bool(false));
        obj.remove("deletedAt");
    }
    db.kv_set(&key, &log)?;

    info!(id = %id, "log restored");
    Ok(Json(json!({ "log": log })))
}

async fn permanently_delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    state.db.lock().await.kv_delete(&format!("log:{id}"))?;
    info!(id = %id, "log permanently deleted");
    Ok(Json(json!({ "success": true })))
}

async fn add_log_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    let Value::Object(fields) = body else {
        return Err(ServerError::BadRequest("Expected a JSON object".to_string()));
    };

    // Server-stamped id and date; the date wins over anything sent.
    let mut comment = serde_json::Map::new();
    comment.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
    for (key, value) in fields {
        comment.insert(key, value);
    }
    comment.insert(
        "date".to_string(),
        json!(Utc::now().date_naive().to_string()),
    );

    let db = state.db.lock().await;
    let key = format!("log:{id}");
    let mut log = db
        .kv_get(&key)?
        .ok_or_else(|| ServerError::NotFound("Log not found".to_string()))?;

    let Some(obj) = log.as_object_mut() else {
        return Err(ServerError::Internal(
            "Stored record is not an object".to_string(),
        ));
    };
    let comments = obj
        .entry("comments".to_string())
        .or_insert_with(|| json!([]));
    match comments.as_array_mut() {
        Some(list) => list.push(Value::Object(comment)),
        None => *comments = json!([Value::Object(comment)]),
    }
    db.kv_set(&key, &log)?;

    info!(id = %id, "comment added");
    Ok(Json(json!({ "log": log })))
}

// ─── Image uploads ───

async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload.bin").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Failed to read field: {}", e)))?;

            let stored = state.uploads.save(&file_name, &data).await?;
            let url = format!(
                "{}/uploads/{}",
                state.config.public_url.trim_end_matches('/'),
                stored
            );

            info!(name = %stored, size = data.len(), "Image uploaded via API");

            return Ok(Json(json!({ "imageUrl": url })));
        }
    }

    Err(ServerError::BadRequest(
        "Missing 'file' field in multipart form".to_string(),
    ))
}

async fn serve_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.uploads.load(&name).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&name))], data))
}

// ─── Users ───

async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
    let users = state.db.lock().await.kv_get_by_prefix("user:")?;
    Ok(Json(json!({ "users": users })))
}

async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ServerError> {
    let name = body["name"].as_str().unwrap_or("").trim().to_string();
    if name.is_empty() {
        return Err(ServerError::BadRequest("User name is required".to_string()));
    }
    let role = body["role"].as_str().unwrap_or("").to_string();

    // Readable id: name slug plus a short random suffix.  The empty pin
    // means the account sets its PIN on first sign-in.
    let id = user_id_for(&name);
    let user = json!({ "id": id, "name": name, "role": role, "pin": "" });

    state
        .db
        .lock()
        .await
        .kv_set(&format!("user:{id}"), &user)?;

    info!(id = %id, "user created");
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

fn user_id_for(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{slug}-{}", &suffix[..8])
}

async fn update_user_pin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    let Some(pin) = body["pin"].as_str() else {
        return Err(ServerError::BadRequest("PIN is required".to_string()));
    };
    let user = update_record(&state, "user:", "User", &id, json!({ "pin": pin })).await?;
    info!(id = %id, "user PIN updated");
    Ok(Json(json!({ "user": user })))
}

async fn update_user_access(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    let Some(tabs) = body.get("accessibleTabs") else {
        return Err(ServerError::BadRequest(
            "accessibleTabs is required".to_string(),
        ));
    };
    if !tabs.is_array() {
        return Err(ServerError::BadRequest(
            "accessibleTabs must be an array".to_string(),
        ));
    }

    let user = update_record(
        &state,
        "user:",
        "User",
        &id,
        json!({ "accessibleTabs": tabs }),
    )
    .await?;
    info!(id = %id, "user tab access updated");
    Ok(Json(json!({ "user": user })))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    state.db.lock().await.kv_delete(&format!("user:{id}"))?;
    info!(id = %id, "user deleted");
    Ok(Json(json!({ "success": true })))
}

// ─── Wiki pages ───

async fn list_wiki_pages(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
    let pages = state.db.lock().await.kv_get_by_prefix("wiki:")?;
    Ok(Json(json!({ "pages": pages })))
}

async fn create_wiki_page(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ServerError> {
    let page = create_record(&state, "wiki:", body).await?;
    info!(id = %page["id"], "wiki page created");
    Ok((StatusCode::CREATED, Json(json!({ "page": page }))))
}

async fn update_wiki_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    let page = update_record(&state, "wiki:", "Wiki page", &id, updates).await?;
    Ok(Json(json!({ "page": page })))
}

async fn delete_wiki_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    state.db.lock().await.kv_delete(&format!("wiki:{id}"))?;
    info!(id = %id, "wiki page deleted");
    Ok(Json(json!({ "success": true })))
}

// ─── Resources ───

async fn list_resources(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
    let resources = state.db.lock().await.kv_get_by_prefix("resource:")?;
    Ok(Json(json!({ "resources": resources })))
}

async fn create_resource(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ServerError> {
    let resource = create_record(&state, "resource:", body).await?;
    info!(id = %resource["id"], "resource created");
    Ok((StatusCode::CREATED, Json(json!({ "resource": resource }))))
}

async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    let resource = update_record(&state, "resource:", "Resource", &id, updates).await?;
    Ok(Json(json!({ "resource": resource })))
}

async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    state.db.lock().await.kv_delete(&format!("resource:{id}"))?;
    info!(id = %id, "resource deleted");
    Ok(Json(json!({ "success": true })))
}
