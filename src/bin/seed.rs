//! Idempotent reference-data seeding: the sports catalog and two sample
//! accounts. Keyed on unique columns, so re-running is a no-op.

use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use matchday_backend::config::settings::get_config;
use matchday_backend::telemetry::{get_subscriber, init_subscriber};
use matchday_backend::utils::password::hash_password;

#[derive(Debug, Error)]
enum SeedError {
    #[error("failed to read configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

const SPORTS: &[(&str, &str, &str)] = &[
    ("Football", "Association football (soccer)", "⚽"),
    ("Basketball", "Indoor court sport", "🏀"),
    ("Cricket", "Bat-and-ball game", "🏏"),
    ("Tennis", "Racket sport", "🎾"),
    ("Volleyball", "Team sport with net", "🏐"),
    ("Badminton", "Racquet sport", "🏸"),
    ("Table Tennis", "Ping pong", "🏓"),
    ("Hockey", "Field hockey", "🏑"),
];

#[tokio::main]
async fn main() -> Result<(), SeedError> {
    let subscriber = get_subscriber("matchday-seed".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_config()?;
    let pool = PgPool::connect(config.database.connection_string().expose_secret()).await?;

    tracing::info!("Seeding database");

    let now = Utc::now();
    for (name, description, icon) in SPORTS {
        sqlx::query(
            r#"
            INSERT INTO sports (id, name, description, icon, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, $5, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(icon)
        .bind(now)
        .execute(&pool)
        .await?;
    }
    tracing::info!("Sports catalog seeded");

    seed_user(
        &pool,
        "admin@matchday.dev",
        "admin",
        "admin123",
        "Admin",
        "User",
        "ADMIN",
    )
    .await?;
    tracing::info!("Admin account seeded (email: admin@matchday.dev)");

    seed_user(
        &pool,
        "organizer@matchday.dev",
        "organizer",
        "organizer123",
        "Event",
        "Organizer",
        "ORGANIZER",
    )
    .await?;
    tracing::info!("Organizer account seeded (email: organizer@matchday.dev)");

    tracing::info!("Database seeding completed");
    Ok(())
}

async fn seed_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO users (
            id, email, username, password_hash, first_name, last_name,
            role, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(username)
    .bind(hash_password(password))
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}
