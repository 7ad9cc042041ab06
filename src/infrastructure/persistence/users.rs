use crate::domain::models::user::User;
use sqlx::Any;

pub async fn insert<'e, E>(executor: E, user: &User) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    sqlx::query(
        "INSERT INTO users (id, email, password_digest, first_name, last_name, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_digest)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_digest, first_name, last_name, created_at, updated_at
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<User>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_digest, first_name, last_name, created_at, updated_at
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
