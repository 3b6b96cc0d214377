use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::StartupError;

/// Open the pool, retrying every `retry_interval` until `connect_timeout`.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, StartupError> {
    // Ensure data directory exists
    if let Some(parent) = Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let options = SqliteConnectOptions::from_str(&config.dsn())
        .map_err(StartupError::Connect)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);

    retry_until(config.connect_timeout(), config.retry_interval(), move || {
        pool_options.clone().connect_with(options.clone())
    })
    .await
}

/// Run `attempt` on a background task until it succeeds, sleeping `interval`
/// after each failure. If `timeout` elapses first the task is aborted and
/// `ConnectionTimeout` is returned. Individual failures are only logged.
pub async fn retry_until<T, E, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut attempt: F,
) -> Result<T, StartupError>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let mut task = tokio::spawn(async move {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match attempt().await {
                Ok(value) => {
                    tracing::info!(attempts, "database connected");
                    return value;
                }
                Err(e) => {
                    tracing::warn!(attempt = attempts, "database connection failed: {e}");
                    tokio::time::sleep(interval).await;
                }
            }
        }
    });

    match tokio::time::timeout(timeout, &mut task).await {
        Ok(joined) => Ok(joined?),
        Err(_) => {
            task.abort();
            tracing::error!("database connection timed out after {timeout:?}");
            Err(StartupError::ConnectionTimeout(timeout))
        }
    }
}

/// Execute the DDL file at `path` as one batch.
pub async fn apply_schema(pool: &SqlitePool, path: &Path) -> Result<(), StartupError> {
    let schema = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StartupError::SchemaRead {
            path: path.to_path_buf(),
            source,
        })?;

    sqlx::raw_sql(&schema)
        .execute(pool)
        .await
        .map_err(StartupError::SchemaApply)?;

    tracing::info!("applied schema from {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn retry_stops_at_first_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let value = retry_until(Duration::from_secs(5), Duration::from_millis(5), move || {
            let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(format!("attempt {call} refused"))
                } else {
                    Ok(call)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_times_out_and_abandons_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = retry_until(Duration::from_millis(100), Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("refused") }
        })
        .await;

        assert!(matches!(result, Err(StartupError::ConnectionTimeout(_))));
        assert!(calls.load(Ordering::SeqCst) > 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let after_timeout = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_timeout);
    }

    #[tokio::test]
    async fn connect_creates_database_and_applies_schema() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested/travels.db").display().to_string(),
            max_connections: 1,
            schema: "schema.sql".into(),
            connect_timeout_secs: 5,
            retry_interval_secs: 1,
        };

        let pool = connect(&config).await.unwrap();
        apply_schema(&pool, &config.schema).await.unwrap();
        // A second run must be harmless.
        apply_schema(&pool, &config.schema).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<String> = tables.into_iter().map(|(name,)| name).collect();
        assert_eq!(names, vec!["locations", "users", "visits"]);
    }

    #[tokio::test]
    async fn missing_schema_file_is_fatal() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let err = apply_schema(&pool, Path::new("missing.sql")).await.unwrap_err();
        assert!(matches!(err, StartupError::SchemaRead { .. }));
    }

    #[tokio::test]
    async fn broken_schema_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        std::fs::write(&path, "CREATE TABLE oops (").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let err = apply_schema(&pool, &path).await.unwrap_err();
        assert!(matches!(err, StartupError::SchemaApply(_)));
    }
}
