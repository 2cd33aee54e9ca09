use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Minimal schema bootstrap. Kept as plain SQL so a fresh database is
/// usable without a separate migration step.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sku TEXT NOT NULL COLLATE NOCASE UNIQUE,
        name TEXT NOT NULL,
        description TEXT,
        price REAL,
        quantity INTEGER NOT NULL DEFAULT 0,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT,
        updated_at TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS webhooks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL,
        event_type TEXT NOT NULL,
        enabled INTEGER NOT NULL DEFAULT 1,
        created_at TEXT,
        updated_at TEXT
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_webhooks_event_type ON webhooks (event_type);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS webhook_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        webhook_id INTEGER NOT NULL,
        event_type TEXT NOT NULL,
        status_code INTEGER,
        response_body TEXT,
        error_message TEXT,
        created_at TEXT
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_webhook_logs_webhook_id ON webhook_logs (webhook_id);
    "#,
];

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    if DB_CONN.get().is_some() {
        return Ok(());
    }

    let db_file = db_path.unwrap_or("target/db/app.db");

    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    for ddl in SCHEMA {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            ddl.to_string(),
        ))
        .await?;
    }

    tracing::info!("Database initialized at {}", db_file);
    let _ = DB_CONN.set(conn);
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("database not initialized, call initialize_database first")
}

/// Shared database for tests. File-backed on purpose: the connection
/// pool reconnects whenever a test runtime goes away, and a reconnect to
/// an in-memory SQLite lands in a fresh empty database. A per-process
/// file keeps the schema and data reachable from every test.
#[cfg(test)]
pub async fn setup_test_db() {
    static TEST_INIT: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();
    TEST_INIT
        .get_or_init(|| async {
            let path = std::env::temp_dir().join(format!("import-test-{}.db", std::process::id()));
            let _ = std::fs::remove_file(&path);
            initialize_database(path.to_str())
                .await
                .expect("test database initializes");
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Runs on its own test runtime, so it also exercises the pool after
    // the initializing runtime is gone.
    #[tokio::test]
    async fn bootstrap_creates_queryable_tables() {
        setup_test_db().await;
        let conn = get_connection();
        for table in ["products", "webhooks", "webhook_logs"] {
            let stmt = Statement::from_string(
                DatabaseBackend::Sqlite,
                format!("SELECT COUNT(*) FROM {}", table),
            );
            assert!(conn.query_one(stmt).await.unwrap().is_some());
        }
    }
}
