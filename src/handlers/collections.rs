use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::database::{Card, Collection};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Raw POST /collections body. Both fields are optional at the wire
/// level; validation decides what is acceptable.
#[derive(Debug, Deserialize)]
pub struct CollectionPayload {
    pub name: Option<String>,
    pub class_name: Option<String>,
}

/// A payload that passed validation. Handlers only hand these to the
/// store, so unvalidated input cannot reach SQL.
#[derive(Debug)]
pub struct ValidCollection {
    pub name: String,
    pub class_name: Option<String>,
}

impl CollectionPayload {
    pub fn validate(self) -> Result<ValidCollection, ApiError> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ApiError::validation("Collection name is required"));
        }

        Ok(ValidCollection {
            name: name.to_string(),
            class_name: normalize_class_name(self.class_name),
        })
    }
}

/// Class labels are optional. An absent or empty label becomes NULL; a
/// present label is trimmed but otherwise kept as sent, so a label of
/// only spaces survives as an empty string.
fn normalize_class_name(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.is_empty())
        .map(|value| value.trim().to_string())
}

pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Collection>>, ApiError> {
    let collections = state.store.list_collections(&user.user_id).await?;
    Ok(Json(collections))
}

pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CollectionPayload>,
) -> Result<Json<Value>, ApiError> {
    let valid = payload.validate()?;

    let collection = state
        .store
        .create_collection(&user.user_id, &valid.name, valid.class_name.as_deref())
        .await?;

    info!(
        "Created collection {} for user {}",
        collection.id, user.user_id
    );

    Ok(Json(json!({
        "message": "Collection added",
        "id": collection.id,
        "name": collection.name,
        "class_name": collection.class_name,
    })))
}

pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_collection(id, &user.user_id).await?;
    info!("Deleted collection {} for user {}", id, user.user_id);

    Ok(Json(json!({ "message": "Collection deleted" })))
}

/// GET /collections/{id}/cards. Same data as GET /cards?collection_id=
/// but with the collection addressed in the path.
pub async fn list_collection_cards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = state.store.list_cards(&user.user_id, Some(id)).await?;
    Ok(Json(cards))
}
