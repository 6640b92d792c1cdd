use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A question/answer pair owned by one user. `collection_id` is NULL for
/// unfiled cards and is cleared (not cascaded) when its collection goes
/// away.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: i32,
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub collection_id: Option<i32>,
}
