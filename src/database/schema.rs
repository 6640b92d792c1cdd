use sqlx::PgPool;
use tracing::info;

/// Bring the schema up to date: create anything missing on a fresh store,
/// then backfill columns/indexes that newer model revisions added to the
/// card table. Runs once at startup, before the server accepts requests,
/// and is safe to run repeatedly.
pub async fn init(pool: &PgPool) -> Result<(), sqlx::Error> {
    create_tables(pool).await?;
    backfill_cards_table(pool).await
}

async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS collections (
            id SERIAL PRIMARY KEY,
            user_id VARCHAR,
            name VARCHAR,
            class_name VARCHAR
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS flashcards (
            id SERIAL PRIMARY KEY,
            user_id VARCHAR,
            question VARCHAR,
            answer VARCHAR,
            collection_id INTEGER
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS ix_collections_user_id ON collections (user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// `CREATE TABLE IF NOT EXISTS` never alters an existing table, so a store
/// created before the ownership and collection columns existed would keep
/// serving without them. Add whichever are missing, nullable, and make sure
/// the lookup indexes are present.
pub async fn backfill_cards_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    // An empty column list means the table itself does not exist yet; the
    // creation step above owns that case.
    let columns: Vec<String> = sqlx::query_scalar(
        "SELECT column_name FROM information_schema.columns
         WHERE table_schema = current_schema() AND table_name = 'flashcards'",
    )
    .fetch_all(pool)
    .await?;

    if columns.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    if !columns.iter().any(|c| c == "user_id") {
        info!("Backfilling flashcards.user_id column");
        sqlx::query("ALTER TABLE flashcards ADD COLUMN user_id VARCHAR")
            .execute(&mut *tx)
            .await?;
    }
    if !columns.iter().any(|c| c == "collection_id") {
        info!("Backfilling flashcards.collection_id column");
        sqlx::query("ALTER TABLE flashcards ADD COLUMN collection_id INTEGER")
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS ix_flashcards_user_id ON flashcards (user_id)")
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_flashcards_collection_id ON flashcards (collection_id)",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}
