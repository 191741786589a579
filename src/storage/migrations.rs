//! Database migrations.
//!
//! Embedded SQL migrations tracked in `schema_migrations`. Each migration is
//! itself idempotent, so re-running against an existing table is harmless.

use crate::error::{describe_pg_error, SyncError, SyncResult};
use deadpool_postgres::Object;
use tracing::{debug, info};

/// Embedded migrations, applied in order
pub const EMBEDDED_MIGRATIONS: &[(&str, &str)] = &[(
    "001_deposits",
    include_str!("../../migrations/001_deposits.sql"),
)];

/// Parse migration version from its name (e.g. "001_deposits")
fn parse_migration_version(name: &str) -> Option<i32> {
    name.split('_').next().and_then(|v| v.parse::<i32>().ok())
}

/// Apply every embedded migration.
///
/// All migrations run on every start since each one is idempotent; a table
/// dropped after its version was recorded gets recreated. `schema_migrations`
/// only records which versions this database has seen.
pub async fn run_embedded_migrations(client: &Object) -> SyncResult<()> {
    client
        .execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            &[],
        )
        .await?;

    let applied: Vec<i32> = client
        .query(
            "SELECT version FROM schema_migrations ORDER BY version",
            &[],
        )
        .await?
        .iter()
        .map(|r| r.get(0))
        .collect();

    let mut new_count = 0;
    for (name, sql) in EMBEDDED_MIGRATIONS {
        let version = parse_migration_version(name).ok_or_else(|| {
            SyncError::Storage(format!("Migration name has no version: {}", name))
        })?;

        let is_new = !applied.contains(&version);
        if is_new {
            info!("Applying migration {}: {}", version, name);
        } else {
            debug!("Re-checking migration {}: {}", version, name);
        }

        client.execute("BEGIN", &[]).await?;

        match client.batch_execute(sql).await {
            Ok(_) => {
                client
                    .execute(
                        "INSERT INTO schema_migrations (version, name) VALUES ($1, $2)
                         ON CONFLICT (version) DO NOTHING",
                        &[&version, &name.to_string()],
                    )
                    .await?;

                client.execute("COMMIT", &[]).await?;
                if is_new {
                    new_count += 1;
                }
            }
            Err(e) => {
                client.execute("ROLLBACK", &[]).await?;
                return Err(SyncError::Storage(format!(
                    "Migration {} failed: {}",
                    version,
                    describe_pg_error(&e)
                )));
            }
        }
    }

    if new_count > 0 {
        info!("Applied {} migrations", new_count);
    } else {
        info!("Database schema is up to date");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_migration_version() {
        assert_eq!(parse_migration_version("001_deposits"), Some(1));
        assert_eq!(parse_migration_version("012_more"), Some(12));
        assert_eq!(parse_migration_version("deposits"), None);
        assert_eq!(parse_migration_version(""), None);
    }

    #[test]
    fn test_embedded_migrations_versions_increase() {
        let versions: Vec<i32> = EMBEDDED_MIGRATIONS
            .iter()
            .map(|(name, _)| parse_migration_version(name).unwrap())
            .collect();
        assert!(!versions.is_empty());
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_deposits_table_is_idempotent() {
        let (_, sql) = EMBEDDED_MIGRATIONS[0];
        let sql = sql.to_uppercase();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS T_DEPOSITS"));
        assert!(sql.contains("F_INDEX BIGINT NOT NULL PRIMARY KEY"));
        assert!(sql.contains("F_KEY TEXT"));
        assert!(sql.contains("F_POOL TEXT"));
    }
}
