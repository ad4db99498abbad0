use crate::{error::AppError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use core_types::validate;
use database::DbError;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Runs a store call on its own task and waits for it.
///
/// If the client goes away the handler future is dropped, but the spawned
/// statement still runs to the end and its pooled connection is returned as
/// usual.
async fn run_to_completion<T, F>(operation: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, DbError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(operation)
        .await
        .map_err(|join_err| AppError::Internal(format!("store task failed: {join_err}")))?
        .map_err(AppError::from)
}

/// Unwraps the parsed JSON body, or turns the extractor rejection into an error.
fn payload(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    let Json(value) = body?;
    Ok(value)
}

/// # GET /<resource>
pub async fn list_records(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let store = state.store.clone();
    let records = run_to_completion(async move { store.list().await }).await?;
    Ok(Json(state.fields.render_all(&records)))
}

/// # GET /<resource>/:id
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let Some(id) = state.parse_id(&raw_id)? else {
        return Err(state.not_found());
    };

    let store = state.store.clone();
    match run_to_completion(async move { store.get_by_id(id).await }).await? {
        Some(record) => Ok(Json(state.fields.render(&record))),
        None => Err(state.not_found()),
    }
}

/// # POST /<resource>
/// Answers 200 with the stored record, including its new id.
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let new_record = validate(&payload(body)?, &state.fields)?;

    let store = state.store.clone();
    let record = run_to_completion(async move { store.create(new_record).await }).await?;
    tracing::info!(resource = %state.singular, id = record.id, "Created record.");
    Ok(Json(state.fields.render(&record)))
}

/// # PUT /<resource>/:id
/// The body is validated before the id is looked at, so a bad body wins over a bad id.
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let new_record = validate(&payload(body)?, &state.fields)?;
    let Some(id) = state.parse_id(&raw_id)? else {
        return Err(state.not_found());
    };

    let store = state.store.clone();
    match run_to_completion(async move { store.update_by_id(id, new_record).await }).await? {
        Some(record) => Ok(Json(state.fields.render(&record))),
        None => Err(state.not_found()),
    }
}

/// # DELETE /<resource>/:id
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let Some(id) = state.parse_id(&raw_id)? else {
        return Err(state.not_found());
    };

    let store = state.store.clone();
    if run_to_completion(async move { store.delete_by_id(id).await }).await? {
        tracing::info!(resource = %state.singular, id, "Deleted record.");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(state.not_found())
    }
}
