use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;
use chrono::Utc;

/// Create a default organizer account on an empty database so events can be
/// published immediately after first boot. Safe to call on every startup.
pub async fn seed_default_organizer(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already has users, skipping seed");
        return Ok(());
    }

    tracing::info!("Creating default organizer 'organizer@skillsphere.local'...");

    let user_id = Uuid::new_v4();
    let password_hash = hash("changeme123", DEFAULT_COST)?;

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, created_at)
        VALUES ($1, $2, $3, $4, 'organizer', $5)
        "#,
    )
    .bind(user_id)
    .bind("Default Organizer")
    .bind("organizer@skillsphere.local")
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    tracing::info!("Default organizer created; change the password after first login");

    Ok(())
}
