use crate::domain::models::cat::Cat;
use sqlx::Any;

pub async fn insert<'e, E>(executor: E, cat: &Cat) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    sqlx::query(
        "INSERT INTO cats (id, user_id, name, gender, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&cat.id)
    .bind(&cat.user_id)
    .bind(&cat.name)
    .bind(&cat.gender)
    .bind(&cat.created_at)
    .bind(&cat.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Cat>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    sqlx::query_as::<_, Cat>(
        "SELECT id, user_id, name, gender, created_at, updated_at FROM cats WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Update scoped to the owner; returns the number of rows touched so the
/// caller can distinguish "not found or not yours" from success.
pub async fn update<'e, E>(
    executor: E,
    id: &str,
    user_id: &str,
    name: &str,
    gender: &str,
    updated_at: &str,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    let result = sqlx::query(
        "UPDATE cats SET name = ?, gender = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(name)
    .bind(gender)
    .bind(updated_at)
    .bind(id)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(executor: E, id: &str, user_id: &str) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    let result = sqlx::query("DELETE FROM cats WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
