//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Which gateway carries outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundProvider {
    Evolution,
    Waha,
}

/// Webhook server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Bearer token agents present when opening the realtime channel.
    pub agent_ws_token: String,
    /// Allow-list of customer numbers; empty means everyone is allowed.
    pub authorized_numbers: Vec<String>,
    /// Shared key expected on n8n webhook calls, if configured.
    pub n8n_api_key: Option<String>,
    /// Outbound gateway selection.
    pub outbound_provider: OutboundProvider,
    /// Whether the secondary local-LLM tier is installed.
    pub ollama_enabled: bool,
    /// Whether the NLU tier is installed.
    pub nlu_enabled: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SERVER_ADDR` | Bind address | `127.0.0.1:8000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:atende.db?mode=rwc` |
    /// | `AGENT_WS_TOKEN` | Realtime channel bearer token | (required) |
    /// | `AUTHORIZED_NUMBERS` | Comma-separated allow-list | empty |
    /// | `N8N_API_KEY` | Shared key for the n8n webhook | unset |
    /// | `OUTBOUND_PROVIDER` | `evolution` or `waha` | `evolution` |
    /// | `OLLAMA_ENABLED` | Install the secondary LLM tier | `true` |
    /// | `NLU_ENABLED` | Install the NLU tier | `true` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:atende.db?mode=rwc".to_string());

        let agent_ws_token = env::var("AGENT_WS_TOKEN").map_err(|_| ConfigError::MissingWsToken)?;

        let authorized_numbers = env::var("AUTHORIZED_NUMBERS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        let n8n_api_key = env::var("N8N_API_KEY").ok().filter(|k| !k.is_empty());

        let outbound_provider = match env::var("OUTBOUND_PROVIDER")
            .unwrap_or_else(|_| "evolution".to_string())
            .to_lowercase()
            .as_str()
        {
            "waha" => OutboundProvider::Waha,
            "evolution" => OutboundProvider::Evolution,
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let ollama_enabled = flag("OLLAMA_ENABLED", true);
        let nlu_enabled = flag("NLU_ENABLED", true);

        Ok(Self {
            addr,
            database_url,
            agent_ws_token,
            authorized_numbers,
            n8n_api_key,
            outbound_provider,
            ollama_enabled,
            nlu_enabled,
        })
    }
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|v| {
            let v = v.to_lowercase();
            v == "true" || v == "1"
        })
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SERVER_ADDR format")]
    InvalidAddr,

    #[error("AGENT_WS_TOKEN environment variable is required")]
    MissingWsToken,

    #[error("Unknown OUTBOUND_PROVIDER: {0}")]
    UnknownProvider(String),
}
