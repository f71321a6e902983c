use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use redline_db::DbConfig;
use redline_service::backend::openai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use redline_service::OpenAiConfig;

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "REDLINE_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port for the HTTP server
    #[arg(long, env = "REDLINE_PORT", default_value = "3720")]
    pub port: u16,

    /// Editorial guideline file. A missing file falls back to built-in guidelines.
    #[arg(long, env = "REDLINE_GUIDELINES", default_value = "clarity.txt")]
    pub guidelines: PathBuf,

    /// Model requested from the generation service
    #[arg(long, env = "REDLINE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// API key for the generation service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// SQLite file for traced calls and feedback
    #[arg(long, env = "REDLINE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Timeout for one generation request (seconds). Unset means no timeout.
    #[arg(long, env = "REDLINE_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            sqlite_path: self
                .db_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        }
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_base: self.api_base.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout: self.request_timeout.map(Duration::from_secs),
        }
    }
}
