use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumeRow};
use crate::models::user::User;

/// Creates the user on first sign-in; later sign-ins refresh name and avatar.
pub async fn upsert_user(
    pool: &PgPool,
    email: &str,
    name: Option<&str>,
    image: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, image)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, users.name),
                image = COALESCE(EXCLUDED.image, users.image)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(name)
    .bind(image)
    .fetch_one(pool)
    .await
}

pub async fn find_user(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_resume(pool: &PgPool, resume: NewResume) -> Result<ResumeRow, sqlx::Error> {
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (user_id, filename, original_url, parsed_data)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(resume.user_id)
    .bind(&resume.filename)
    .bind(&resume.original_url)
    .bind(&resume.parsed_data)
    .fetch_one(pool)
    .await?;

    info!("Stored resume {} for user {}", row.id, row.user_id);
    Ok(row)
}

/// The user's most recent upload, which is the one the portfolio renders.
pub async fn latest_resume(pool: &PgPool, user_id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
