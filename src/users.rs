use sqlx::PgPool;
use uuid::Uuid;

/// Every nutrition route is scoped to an existing user; accounts themselves
/// are managed elsewhere.
pub async fn user_exists(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(row.0)
}
