//! Object routes backing the filesystem storage backend
//!
//! URLs minted by the local backend point here. Every request must carry a
//! valid, unexpired signature for its method and key; the route is not
//! behind bearer authentication.

use crate::error::HttpAppError;
use crate::state::StorageState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use licenca_core::{guess_content_type, AppError};
use licenca_storage::{LocalStorage, SignedRequest, Storage};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SignatureQuery {
    pub method: Option<String>,
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

fn local_backend(storage: &StorageState) -> Result<&Arc<LocalStorage>, AppError> {
    storage
        .local
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

fn verify(
    local: &LocalStorage,
    method: &str,
    key: &str,
    query: &SignatureQuery,
) -> Result<(), AppError> {
    let (Some(signed_method), Some(expires), Some(signature)) =
        (query.method.as_deref(), query.expires, query.signature.as_deref())
    else {
        return Err(AppError::Forbidden("Missing signature".to_string()));
    };

    local
        .verify_request(
            method,
            key,
            &SignedRequest {
                method: signed_method,
                expires,
                signature,
            },
        )
        .map_err(|e| {
            tracing::warn!(storage_key = %key, method, error = %e, "Rejected signed storage request");
            AppError::Forbidden(e.to_string())
        })
}

/// Store the request body at `key`; overwrites an existing object.
#[tracing::instrument(skip(storage, query, headers, body), fields(storage_key = %key, size_bytes = body.len()))]
pub async fn put_object(
    State(storage): State<StorageState>,
    Path(key): Path<String>,
    Query(query): Query<SignatureQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let local = local_backend(&storage)?;
    verify(local, "PUT", &key, &query)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    local
        .upload_with_key(&key, body.to_vec(), content_type)
        .await?;
    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(storage, query), fields(storage_key = %key))]
pub async fn get_object(
    State(storage): State<StorageState>,
    Path(key): Path<String>,
    Query(query): Query<SignatureQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let local = local_backend(&storage)?;
    verify(local, "GET", &key, &query)?;

    let data = local.download(&key).await?;
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(guess_content_type(&key)),
        )],
        data,
    ))
}
