//! Error types for the sync run.

use thiserror::Error;

/// Every failure a run can hit. All of them are fatal except a failed upsert
/// batch, which the pipeline logs and carries into verification.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Beacon node request failed: {0}")]
    Transport(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Written entries do not match: fetched {expected}, stored {stored}")]
    Consistency { expected: u64, stored: u64 },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

impl From<tokio_postgres::Error> for SyncError {
    fn from(err: tokio_postgres::Error) -> Self {
        SyncError::Storage(describe_pg_error(&err))
    }
}

/// Postgres error text including the server's message and SQLSTATE.
///
/// `Display` on a server-side error only prints "db error".
pub fn describe_pg_error(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => format_db_error(db.severity(), db.message(), db.code().code()),
        None => err.to_string(),
    }
}

fn format_db_error(severity: &str, message: &str, sqlstate: &str) -> String {
    format!("{}: {} (SQLSTATE {})", severity, message, sqlstate)
}

impl From<deadpool_postgres::PoolError> for SyncError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        let detail = match &err {
            deadpool_postgres::PoolError::Backend(e) => describe_pg_error(e),
            other => other.to_string(),
        };
        SyncError::Storage(format!("Failed to get connection: {}", detail))
    }
}

impl From<deadpool_postgres::CreatePoolError> for SyncError {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        SyncError::Storage(format!("Failed to create pool: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_message_includes_counts() {
        let err = SyncError::Consistency {
            expected: 5,
            stored: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("fetched 5"));
        assert!(msg.contains("stored 4"));
    }

    #[test]
    fn test_db_error_keeps_server_message() {
        let msg = format_db_error("ERROR", "relation \"t_deposits\" does not exist", "42P01");
        assert_eq!(
            msg,
            "ERROR: relation \"t_deposits\" does not exist (SQLSTATE 42P01)"
        );
        let err = SyncError::Storage(msg);
        assert!(err.to_string().contains("does not exist"));
        assert!(err.to_string().contains("42P01"));
    }

    #[test]
    fn test_transport_message() {
        let err = SyncError::Transport("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Beacon node request failed: connection refused"
        );
    }
}
