//! Webhook and realtime server for the Atende service desk.
//!
//! Receives customer messages from the supported WhatsApp providers, routes
//! them through the escalation engine and fans ledger events out to
//! connected agent clients.

mod config;
mod dispatch;
mod error;
mod normalize;
mod notifier;
mod routes;
mod state;
mod ws;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use context_store::{sweeper, ContextStore, MemoryContextStore};
use database::Database;
use engine::{Engine, EngineConfig, MessageSender, ResponderChain};
use fallback_responder::FallbackResponder;
use llm_responder::LlmResponder;
use nlu_responder::NluResponder;
use ollama_responder::OllamaResponder;
use transport::{EvolutionClient, WahaClient};

use crate::config::{OutboundProvider, ServerConfig};
use crate::notifier::ConnectionManager;
use crate::state::AppState;

/// Per-tier call budgets.
const LLM_TIMEOUT: Duration = Duration::from_secs(4);
const OLLAMA_TIMEOUT: Duration = Duration::from_secs(5);
const NLU_TIMEOUT: Duration = Duration::from_secs(5);
const FALLBACK_TIMEOUT: Duration = Duration::from_secs(1);

/// Context sweep cadence.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    let engine_config = EngineConfig::from_env();
    info!(addr = %config.addr, "Starting webhook server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Context store with its periodic sweeper
    let contexts: Arc<dyn ContextStore> =
        Arc::new(MemoryContextStore::with_ttl(engine_config.context_ttl));
    sweeper::spawn(Arc::clone(&contexts), SWEEP_INTERVAL);

    // Responder chain, ordered by priority; the fallback terminates it.
    let chain = build_chain(&config);
    let engine = Arc::new(Engine::new(
        contexts,
        engine_config.policy.clone(),
        chain,
    ));

    // Outbound gateway
    let sender: Arc<dyn MessageSender> = match config.outbound_provider {
        OutboundProvider::Evolution => Arc::new(EvolutionClient::from_env()?),
        OutboundProvider::Waha => Arc::new(WahaClient::from_env()?),
    };

    // Build application state
    let state = AppState {
        db,
        engine,
        gate: engine_config.gate.clone(),
        delay: engine_config.delay,
        notifier: Arc::new(ConnectionManager::new()),
        sender,
        config: Arc::new(config.clone()),
    };

    // Start server
    let app = routes::router().with_state(state);
    info!(addr = %config.addr, "Webhook server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the responder chain from the configured tiers.
///
/// The primary LLM tier is only installed when its API key is present; the
/// permanent fallback always terminates the chain.
fn build_chain(config: &ServerConfig) -> ResponderChain {
    let mut chain = ResponderChain::new();

    match LlmResponder::from_env() {
        Ok(responder) => {
            info!("LLM tier installed");
            chain.push(Arc::new(responder), LLM_TIMEOUT);
        }
        Err(e) => warn!(error = %e, "LLM tier not installed"),
    }

    if config.ollama_enabled {
        match OllamaResponder::from_env() {
            Ok(responder) => {
                info!("secondary LLM tier installed");
                chain.push(Arc::new(responder), OLLAMA_TIMEOUT);
            }
            Err(e) => warn!(error = %e, "secondary LLM tier not installed"),
        }
    }

    if config.nlu_enabled {
        match NluResponder::from_env() {
            Ok(responder) => {
                info!("NLU tier installed");
                chain.push(Arc::new(responder), NLU_TIMEOUT);
            }
            Err(e) => warn!(error = %e, "NLU tier not installed"),
        }
    }

    chain.push(Arc::new(FallbackResponder::new()), FALLBACK_TIMEOUT);
    chain
}
