//! Seeds the default administrator account.

use loam_db::DbResult;
use sqlx::PgPool;

pub async fn run(pool: PgPool) -> DbResult<()> {
    tracing::info!("seeding default admin user");
    sqlx::query("INSERT INTO users (username, email, password) VALUES ($1, $2, $3)")
        .bind("admin")
        .bind("admin@example.com")
        .bind("admin@example.com")
        .execute(&pool)
        .await?;
    Ok(())
}

pub async fn rollback(pool: PgPool) -> DbResult<()> {
    tracing::info!("removing default admin user");
    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind("admin")
        .execute(&pool)
        .await?;
    Ok(())
}
