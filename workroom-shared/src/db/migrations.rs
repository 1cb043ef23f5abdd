/// Schema migrations
///
/// Migrations live in the `migrations/` directory at the workspace root and
/// are embedded into the binary at compile time with [`sqlx::migrate!`].
/// Files follow sqlx's `{timestamp}_{name}.sql` naming and run in order;
/// applied versions are tracked in the `_sqlx_migrations` table.
///
/// The API binary runs [`run_migrations`] on startup so a fresh database
/// is usable without any manual steps.
use sqlx::PgPool;
use tracing::info;

/// Applies any migrations that have not run yet
///
/// Safe to call on every startup: already-applied versions are skipped.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails or the
/// recorded history conflicts with the embedded files.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Database migrations complete");

    Ok(())
}

// Behavior against a live database is covered by the integration tests
// in tests/db_tests.rs.
