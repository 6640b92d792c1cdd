use sqlx::{PgExecutor, PgPool};
use thiserror::Error;

use crate::database::models::{Card, Collection};

/// Errors from Store operations. Absent rows and rows owned by another
/// user surface as the same NotFound variant on purpose: the API must not
/// reveal whether a foreign resource exists.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Collection not found or access denied")]
    CollectionNotFound,

    #[error("Card not found or access denied")]
    CardNotFound,

    #[error("A matching collection already exists")]
    DuplicateCollection,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// All reads and writes for collections and cards, every one of them
/// scoped by the owning user. Mutations that need a lookup first run the
/// lookup and the write in a single transaction.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Connectivity probe for the health endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Look up a collection by id, re-filtered by owner. This is the one
    /// place that decides whether a collection id is usable by a user;
    /// every operation that accepts a collection id goes through it.
    async fn resolve_owned_collection<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        id: i32,
        user_id: &str,
    ) -> Result<Collection, StoreError> {
        sqlx::query_as::<_, Collection>(
            "SELECT id, user_id, name, class_name FROM collections
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StoreError::CollectionNotFound)
    }

    pub async fn list_collections(&self, user_id: &str) -> Result<Vec<Collection>, StoreError> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, user_id, name, class_name FROM collections
             WHERE user_id = $1
             ORDER BY name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(collections)
    }

    /// Insert a collection unless an identical (owner, name, class label)
    /// tuple already exists. NULL labels compare equal to NULL here, which
    /// plain `=` would not do.
    pub async fn create_collection(
        &self,
        user_id: &str,
        name: &str,
        class_name: Option<&str>,
    ) -> Result<Collection, StoreError> {
        let mut tx = self.pool.begin().await?;

        let duplicate: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM collections
             WHERE user_id = $1 AND name = $2 AND class_name IS NOT DISTINCT FROM $3",
        )
        .bind(user_id)
        .bind(name)
        .bind(class_name)
        .fetch_optional(&mut *tx)
        .await?;

        if duplicate.is_some() {
            return Err(StoreError::DuplicateCollection);
        }

        let collection = sqlx::query_as::<_, Collection>(
            "INSERT INTO collections (user_id, name, class_name)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, name, class_name",
        )
        .bind(user_id)
        .bind(name)
        .bind(class_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(collection)
    }

    /// Delete a collection after resolving ownership. The user's cards
    /// filed under it are detached, never deleted, and both steps commit
    /// together so no card is left pointing at a missing collection.
    pub async fn delete_collection(&self, id: i32, user_id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let collection = self
            .resolve_owned_collection(&mut *tx, id, user_id)
            .await?;

        sqlx::query("UPDATE flashcards SET collection_id = NULL WHERE user_id = $1 AND collection_id = $2")
            .bind(user_id)
            .bind(collection.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
            .bind(collection.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// All of a user's cards, optionally narrowed to one collection. A
    /// collection filter is resolved for ownership first so a foreign id
    /// is indistinguishable from a missing one.
    pub async fn list_cards(
        &self,
        user_id: &str,
        collection_id: Option<i32>,
    ) -> Result<Vec<Card>, StoreError> {
        let cards = match collection_id {
            Some(collection_id) => {
                self.resolve_owned_collection(&self.pool, collection_id, user_id)
                    .await?;

                sqlx::query_as::<_, Card>(
                    "SELECT id, user_id, question, answer, collection_id FROM flashcards
                     WHERE user_id = $1 AND collection_id = $2",
                )
                .bind(user_id)
                .bind(collection_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Card>(
                    "SELECT id, user_id, question, answer, collection_id FROM flashcards
                     WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(cards)
    }

    pub async fn create_card(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
        collection_id: Option<i32>,
    ) -> Result<Card, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(collection_id) = collection_id {
            self.resolve_owned_collection(&mut *tx, collection_id, user_id)
                .await?;
        }

        let card = sqlx::query_as::<_, Card>(
            "INSERT INTO flashcards (user_id, question, answer, collection_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, question, answer, collection_id",
        )
        .bind(user_id)
        .bind(question)
        .bind(answer)
        .bind(collection_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(card)
    }

    /// Replace question, answer, and collection reference together.
    /// Partial updates are not supported; passing None for the collection
    /// unfiles the card.
    pub async fn update_card(
        &self,
        id: i32,
        user_id: &str,
        question: &str,
        answer: &str,
        collection_id: Option<i32>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<i32> =
            sqlx::query_scalar("SELECT id FROM flashcards WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Err(StoreError::CardNotFound);
        }

        if let Some(collection_id) = collection_id {
            self.resolve_owned_collection(&mut *tx, collection_id, user_id)
                .await?;
        }

        sqlx::query(
            "UPDATE flashcards SET question = $1, answer = $2, collection_id = $3
             WHERE id = $4 AND user_id = $5",
        )
        .bind(question)
        .bind(answer)
        .bind(collection_id)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_card(&self, id: i32, user_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CardNotFound);
        }
        Ok(())
    }
}
