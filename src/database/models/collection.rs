use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named, optionally categorized grouping of cards owned by one user.
/// `class_name` stays nullable; rows written before the label existed
/// simply carry NULL.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i32,
    pub user_id: String,
    pub name: String,
    pub class_name: Option<String>,
}
