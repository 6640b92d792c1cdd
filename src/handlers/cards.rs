use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::database::Card;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Raw card body, shared by POST /cards and PUT /cards/{id}. Updates
/// replace the whole card, so both carry the same fields.
#[derive(Debug, Deserialize)]
pub struct CardPayload {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub collection_id: Option<i32>,
}

#[derive(Debug)]
pub struct ValidCard {
    pub question: String,
    pub answer: String,
    pub collection_id: Option<i32>,
}

impl CardPayload {
    /// Both sides of the card must be non-blank after trimming. Runs
    /// before any database work, so a bad payload never hits the store
    /// even when the target card does not exist.
    pub fn validate(self) -> Result<ValidCard, ApiError> {
        let question = self.question.as_deref().map(str::trim).unwrap_or_default();
        let answer = self.answer.as_deref().map(str::trim).unwrap_or_default();

        if question.is_empty() || answer.is_empty() {
            return Err(ApiError::validation("Question and answer are required"));
        }

        Ok(ValidCard {
            question: question.to_string(),
            answer: answer.to_string(),
            collection_id: self.collection_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CardListQuery {
    pub collection_id: Option<i32>,
}

pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CardListQuery>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = state
        .store
        .list_cards(&user.user_id, query.collection_id)
        .await?;
    Ok(Json(cards))
}

pub async fn create_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CardPayload>,
) -> Result<Json<Value>, ApiError> {
    let valid = payload.validate()?;

    let card = state
        .store
        .create_card(
            &user.user_id,
            &valid.question,
            &valid.answer,
            valid.collection_id,
        )
        .await?;

    info!("Created card {} for user {}", card.id, user.user_id);

    Ok(Json(json!({ "message": "Card added", "id": card.id })))
}

pub async fn update_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<CardPayload>,
) -> Result<Json<Value>, ApiError> {
    let valid = payload.validate()?;

    state
        .store
        .update_card(
            id,
            &user.user_id,
            &valid.question,
            &valid.answer,
            valid.collection_id,
        )
        .await?;

    Ok(Json(json!({ "message": "Updated" })))
}

pub async fn delete_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_card(id, &user.user_id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(question: Option<&str>, answer: Option<&str>) -> CardPayload {
        CardPayload {
            question: question.map(String::from),
            answer: answer.map(String::from),
            collection_id: None,
        }
    }

    #[test]
    fn question_and_answer_are_trimmed() {
        let valid = payload(Some("  Q  "), Some("  A  ")).validate().unwrap();
        assert_eq!(valid.question, "Q");
        assert_eq!(valid.answer, "A");
    }

    #[test]
    fn blank_question_or_answer_is_rejected() {
        let cases = [
            (None, Some("a")),
            (Some("q"), None),
            (Some("   "), Some("a")),
            (Some("q"), Some("")),
            (None, None),
        ];

        for (question, answer) in cases {
            let err = payload(question, answer).validate().unwrap_err();
            assert_eq!(err.message(), "Question and answer are required");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn collection_id_passes_through_unchanged() {
        let mut raw = payload(Some("q"), Some("a"));
        raw.collection_id = Some(7);
        assert_eq!(raw.validate().unwrap().collection_id, Some(7));

        assert_eq!(
            payload(Some("q"), Some("a")).validate().unwrap().collection_id,
            None
        );
    }
}
