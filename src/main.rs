use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anime_score_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use anime_score_server::config::{AppConfig, CliConfig, FileConfig};
use anime_score_server::metadata::{AnnictClient, MetadataSource};
use anime_score_server::server::{run_server, RequestsLoggingLevel, ServerConfig, ServerState};
use anime_score_server::user::{CredentialHasher, TokenSigner};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the review database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// GraphQL endpoint of the metadata provider.
    #[clap(long)]
    pub metadata_endpoint: Option<String>,

    /// Timeout in seconds for metadata provider requests.
    #[clap(long)]
    pub metadata_timeout_sec: Option<u64>,

    /// Number of read-only database connections.
    #[clap(long)]
    pub read_pool_size: Option<usize>,

    /// Lifetime of issued session tokens, in hours.
    #[clap(long)]
    pub token_ttl_hours: Option<u64>,

    /// Browser origin allowed to call the API. Can be repeated.
    #[clap(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            metadata_endpoint: self.metadata_endpoint.clone(),
            metadata_timeout_sec: self.metadata_timeout_sec,
            read_pool_size: self.read_pool_size,
            token_ttl_hours: self.token_ttl_hours,
            cors_origins: self.cors_origins.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Could not initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let db_path = config.review_db_path();
    info!("Opening SQLite review database at {:?}...", db_path);
    let store = Arc::new(SqliteCatalogStore::new(&db_path, config.read_pool_size)?);
    info!("Catalog holds {} cached items", store.get_items_count()?);

    info!("Using metadata provider at {}", config.metadata.endpoint);
    let source: Arc<dyn MetadataSource> = Arc::new(AnnictClient::new(
        config.metadata.endpoint.clone(),
        config.metadata.access_token.clone(),
        config.metadata.timeout,
    )?);

    let signer = TokenSigner::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl);
    let state = ServerState::new(
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            frontend_dir_path: config.frontend_dir_path.clone(),
            cors_allowed_origins: config.cors_allowed_origins.clone(),
        },
        store,
        source,
        CredentialHasher::Argon2,
        signer,
    );

    info!("Ready to serve at port {}!", config.port);
    run_server(state).await
}
