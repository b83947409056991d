mod file_config;

pub use file_config::{AuthConfig, FileConfig, MetadataConfig};

use crate::catalog_store::DEFAULT_READ_POOL_SIZE;
use crate::metadata::{DEFAULT_ANNICT_ENDPOINT, DEFAULT_METADATA_TIMEOUT};
use crate::server::{RequestsLoggingLevel, DEFAULT_CORS_ORIGIN};
use crate::user::DEFAULT_TOKEN_TTL;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const METADATA_TOKEN_ENV: &str = "ANNICT_ACCESS_TOKEN";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";
/// Extra browser origin allowed on top of the configured ones.
pub const FRONTEND_URL_ENV: &str = "FRONTEND_URL";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub metadata_endpoint: Option<String>,
    pub metadata_timeout_sec: Option<u64>,
    pub read_pool_size: Option<usize>,
    pub token_ttl_hours: Option<u64>,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MetadataSettings {
    pub endpoint: String,
    pub timeout: Duration,
    pub access_token: Option<String>,
}

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub read_pool_size: usize,
    pub metadata: MetadataSettings,
    pub auth: AuthSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, the optional TOML file config and the
    /// process environment. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        Self::resolve_with_env(cli, file_config, |key| std::env::var(key).ok())
    }

    pub fn resolve_with_env<E>(cli: &CliConfig, file_config: Option<FileConfig>, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| anyhow!("db_dir must be specified via --db-dir or in config file"))?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let mut cors_allowed_origins = file
            .cors_allowed_origins
            .or_else(|| Some(cli.cors_origins.clone()).filter(|o| !o.is_empty()))
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]);
        if let Some(frontend_url) = env(FRONTEND_URL_ENV).filter(|u| !u.is_empty()) {
            if !cors_allowed_origins.contains(&frontend_url) {
                cors_allowed_origins.push(frontend_url);
            }
        }

        let read_pool_size = file
            .read_pool_size
            .or(cli.read_pool_size)
            .unwrap_or(DEFAULT_READ_POOL_SIZE);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        let metadata_file = file.metadata.unwrap_or_default();
        let access_token = metadata_file
            .access_token
            .or_else(|| env(METADATA_TOKEN_ENV))
            .filter(|t| !t.is_empty());
        if access_token.is_none() {
            warn!(
                "No metadata provider token configured ({} unset), provider calls will likely be rejected",
                METADATA_TOKEN_ENV
            );
        }
        let metadata = MetadataSettings {
            endpoint: metadata_file
                .endpoint
                .or_else(|| cli.metadata_endpoint.clone())
                .unwrap_or_else(|| DEFAULT_ANNICT_ENDPOINT.to_string()),
            timeout: metadata_file
                .timeout_sec
                .or(cli.metadata_timeout_sec)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_METADATA_TIMEOUT),
            access_token,
        };

        let auth_file = file.auth.unwrap_or_default();
        let jwt_secret = auth_file
            .jwt_secret
            .or_else(|| env(JWT_SECRET_ENV))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "A token signing secret must be set via {} or [auth] jwt_secret",
                    JWT_SECRET_ENV
                )
            })?;
        let auth = AuthSettings {
            jwt_secret,
            token_ttl: auth_file
                .token_ttl_hours
                .or(cli.token_ttl_hours)
                .map(|h| Duration::from_secs(h * 3600))
                .unwrap_or(DEFAULT_TOKEN_TTL),
        };

        Ok(AppConfig {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            cors_allowed_origins,
            read_pool_size,
            metadata,
            auth,
        })
    }

    pub fn review_db_path(&self) -> PathBuf {
        self.db_dir.join("review.db")
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_with_secret(key: &str) -> Option<String> {
        match key {
            JWT_SECRET_ENV => Some("env-secret".to_string()),
            _ => None,
        }
    }

    fn cli_for(temp_dir: &TempDir) -> CliConfig {
        CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 3001,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("BODY"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("loud").is_none());
    }

    #[test]
    fn cli_only_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            AppConfig::resolve_with_env(&cli_for(&temp_dir), None, env_with_secret).unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.read_pool_size, DEFAULT_READ_POOL_SIZE);
        assert_eq!(config.metadata.endpoint, DEFAULT_ANNICT_ENDPOINT);
        assert_eq!(config.metadata.timeout, Duration::from_secs(10));
        assert_eq!(config.metadata.access_token, None);
        assert_eq!(config.auth.jwt_secret, "env-secret");
        assert_eq!(config.auth.token_ttl, Duration::from_secs(72 * 3600));
        assert_eq!(config.review_db_path(), temp_dir.path().join("review.db"));
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn frontend_url_is_added_to_cors_origins() {
        let temp_dir = TempDir::new().unwrap();
        let env = |key: &str| match key {
            FRONTEND_URL_ENV => Some("https://anime.example.com".to_string()),
            _ => env_with_secret(key),
        };

        let config = AppConfig::resolve_with_env(&cli_for(&temp_dir), None, env).unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://anime.example.com"]
        );

        let mut cli = cli_for(&temp_dir);
        cli.cors_origins = vec!["https://anime.example.com".to_string()];
        let config = AppConfig::resolve_with_env(&cli, None, env).unwrap();
        assert_eq!(config.cors_allowed_origins, vec!["https://anime.example.com"]);

        let file = FileConfig {
            cors_allowed_origins: Some(vec!["http://10.0.0.2:8080".to_string()]),
            ..Default::default()
        };
        let config = AppConfig::resolve_with_env(&cli, Some(file), env).unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://10.0.0.2:8080", "https://anime.example.com"]
        );
    }

    #[test]
    fn file_overrides_cli_and_env() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = cli_for(&temp_dir);
        cli.metadata_timeout_sec = Some(20);
        cli.token_ttl_hours = Some(1);
        let file = FileConfig {
            port: Some(4000),
            logging_level: Some("headers".to_string()),
            metadata: Some(MetadataConfig {
                timeout_sec: Some(5),
                access_token: Some("file-token".to_string()),
                ..Default::default()
            }),
            auth: Some(AuthConfig {
                jwt_secret: Some("file-secret".to_string()),
                token_ttl_hours: None,
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve_with_env(&cli, Some(file), env_with_secret).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.metadata.timeout, Duration::from_secs(5));
        assert_eq!(config.metadata.access_token.as_deref(), Some("file-token"));
        assert_eq!(config.auth.jwt_secret, "file-secret");
        assert_eq!(config.auth.token_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn provider_token_comes_from_env() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::resolve_with_env(&cli_for(&temp_dir), None, |key| match key {
            METADATA_TOKEN_ENV => Some("env-token".to_string()),
            JWT_SECRET_ENV => Some("s".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.metadata.access_token.as_deref(), Some("env-token"));
    }

    #[test]
    fn missing_jwt_secret_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = AppConfig::resolve_with_env(&cli_for(&temp_dir), None, |_| None);
        assert!(result.unwrap_err().to_string().contains(JWT_SECRET_ENV));

        let empty = AppConfig::resolve_with_env(&cli_for(&temp_dir), None, |_| Some(String::new()));
        assert!(empty.is_err());
    }

    #[test]
    fn db_dir_must_be_an_existing_directory() {
        let temp_dir = TempDir::new().unwrap();

        let missing = AppConfig::resolve_with_env(&CliConfig::default(), None, env_with_secret);
        assert!(missing.is_err());

        let cli = CliConfig {
            db_dir: Some(temp_dir.path().join("nope")),
            ..Default::default()
        };
        assert!(AppConfig::resolve_with_env(&cli, None, env_with_secret).is_err());

        let file_path = temp_dir.path().join("file");
        std::fs::write(&file_path, "x").unwrap();
        let cli = CliConfig {
            db_dir: Some(file_path),
            ..Default::default()
        };
        assert!(AppConfig::resolve_with_env(&cli, None, env_with_secret).is_err());
    }

    #[test]
    fn zero_read_pool_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = cli_for(&temp_dir);
        cli.read_pool_size = Some(0);
        assert!(AppConfig::resolve_with_env(&cli, None, env_with_secret).is_err());
    }
}
