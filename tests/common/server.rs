//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database.

use super::constants::*;
use super::fixtures::StaticMetadataSource;
use anime_score_server::catalog_store::SqliteCatalogStore;
use anime_score_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use anime_score_server::user::{CredentialHasher, TokenSigner, DEFAULT_TOKEN_TTL};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// When dropped, the server shuts down and the database directory is removed.
#[allow(dead_code)]
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    pub store: Arc<SqliteCatalogStore>,
    pub source: Arc<StaticMetadataSource>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteCatalogStore::new(temp_db_dir.path().join("review.db"), 2)
                .expect("Failed to open store"),
        );
        let source = Arc::new(StaticMetadataSource::new());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = ServerState::new(
            ServerConfig {
                port,
                requests_logging_level: RequestsLoggingLevel::None,
                frontend_dir_path: None,
                ..Default::default()
            },
            store.clone(),
            source.clone(),
            CredentialHasher::TestFast,
            TokenSigner::new(JWT_SECRET, DEFAULT_TOKEN_TTL),
        );
        let app = make_app(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url,
            store,
            source,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}

impl TestServer {
    /// Removes an account behind the server's back, as an operator would.
    pub fn delete_account(&self, username: &str) {
        let conn = rusqlite::Connection::open(self._temp_db_dir.path().join("review.db"))
            .expect("Failed to open database");
        let deleted = conn
            .execute(
                "DELETE FROM account WHERE username = ?1",
                rusqlite::params![username],
            )
            .expect("Failed to delete account");
        assert_eq!(deleted, 1, "No account named {}", username);
    }

    pub fn stored_hasher(&self, username: &str) -> String {
        let conn = rusqlite::Connection::open(self._temp_db_dir.path().join("review.db"))
            .expect("Failed to open database");
        conn.query_row(
            "SELECT hasher FROM account WHERE username = ?1",
            rusqlite::params![username],
            |row| row.get(0),
        )
        .expect("Failed to read account hasher")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
