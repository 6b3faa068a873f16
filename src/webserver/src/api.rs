use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::ApiError;
use crate::response::{Envelope, respond};
use crate::storage::Storage;

// Body of a batch PUT: {"keys": {"<key>": <any json>, ...}}
#[derive(Debug, Deserialize)]
struct BatchRequest {
    #[serde(default)]
    keys: Option<HashMap<String, Value>>,
}

// Register the /keys collection and /keys/{key} item resources.
// The key pattern spans the rest of the path so "/keys/" yields an empty key
// and "/keys/a/b" addresses the key "a/b".
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/keys")
            .route(web::put().to(put_keys))
            .route(web::get().to(list_keys))
            .default_service(web::to(wrong_method)),
    )
    .service(
        web::resource("/keys/{key:.*}")
            .route(web::get().to(get_key))
            .route(web::delete().to(delete_key))
            .default_service(web::to(wrong_method)),
    );
}

// PUT /keys
// A body that fails to load (e.g. over the size limit) counts as malformed input.
async fn put_keys(
    body: Result<web::Bytes, actix_web::Error>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let result = body
        .map_err(|e| {
            warn!(error = %e, "failed to read request body");
            ApiError::WrongData
        })
        .and_then(|body| store_batch(&body, &state.storage));
    respond(result, state.status_mode)
}

// Parse the whole body before touching the store, so a bad payload changes nothing.
// Keys are then applied one at a time, each under its own write lock.
fn store_batch(body: &[u8], storage: &Storage) -> Result<Envelope, ApiError> {
    let request: BatchRequest = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "rejected batch payload");
        ApiError::WrongData
    })?;

    let batch = request.keys.unwrap_or_default();
    let count = batch.len();
    for (key, value) in batch {
        storage.set(key, value);
    }
    debug!(keys = count, stored = storage.len(), "batch stored");
    Ok(Envelope::ok())
}

// GET /keys
async fn list_keys(state: web::Data<AppState>) -> HttpResponse {
    respond(encode_all(&state.storage), state.status_mode)
}

fn encode_all(storage: &Storage) -> Result<Envelope, ApiError> {
    let snapshot = storage.snapshot();
    let data = serde_json::to_string(&snapshot)?;
    debug!(entries = snapshot.len(), "listed store");
    Ok(Envelope::with_data(data))
}

// GET /keys/{key}
async fn get_key(key: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    respond(lookup(&key, &state.storage), state.status_mode)
}

fn lookup(key: &str, storage: &Storage) -> Result<Envelope, ApiError> {
    let key = non_empty(key)?;
    let Some(value) = storage.get(key) else {
        debug!(key, "key not found");
        return Err(ApiError::NotFound);
    };
    let data = serde_json::to_string(&value)?;
    debug!(key, "key read");
    Ok(Envelope::with_data(data))
}

// DELETE /keys/{key}
async fn delete_key(key: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    respond(remove(&key, &state.storage), state.status_mode)
}

fn remove(key: &str, storage: &Storage) -> Result<Envelope, ApiError> {
    let key = non_empty(key)?;
    storage.delete(key);
    debug!(key, stored = storage.len(), "key deleted");
    Ok(Envelope::ok())
}

// Any method not routed above on either resource
async fn wrong_method(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    warn!(method = %req.method(), path = req.path(), "unsupported method");
    respond(Err(ApiError::WrongMethod), state.status_mode)
}

fn non_empty(key: &str) -> Result<&str, ApiError> {
    if key.is_empty() {
        warn!("request with empty key");
        return Err(ApiError::EmptyKey);
    }
    Ok(key)
}
