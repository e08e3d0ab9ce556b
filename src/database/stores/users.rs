use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::User;
use crate::database::StoreError;

/// Create a user. A unique-index violation surfaces as
/// `UniqueViolation("username")` or `UniqueViolation("email")` so the
/// handler can address the offending field.
pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_digest: &str,
) -> Result<User, StoreError> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, username, email, password_digest)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_digest)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23505") => {
            let field = match db_err.constraint() {
                Some(c) if c.contains("email") => "email",
                _ => "username",
            };
            StoreError::UniqueViolation(field.to_string())
        }
        other => StoreError::from(other),
    })
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<User, StoreError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("User not found"))
}
