use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use habit_core::Database;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime settings for the HTTP server. Each flag falls back to an
/// environment variable, then to a built-in default.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HABIT_HERO_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port for HTTP API
    #[arg(short, long, env = "HABIT_HERO_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[command(flatten)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Args)]
pub struct StorageConfig {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "HABIT_HERO_DB")]
    pub database: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {addr}: {e}"))
    }
}

impl StorageConfig {
    /// Opens the configured database and brings its schema up to date.
    pub fn open(&self) -> anyhow::Result<Database> {
        let db = match &self.database {
            Some(path) => Database::open(path)?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}
