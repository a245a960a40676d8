use std::net::SocketAddr;
use std::sync::Arc;

use ollama_relay::config::RelayConfig;
use ollama_relay::llm::OllamaClient;
use ollama_relay::relay::ChatRelay;
use ollama_relay::routes::configure_routes;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ollama_relay=info,warp=info")),
        )
        .init();

    let config = RelayConfig::from_env()?;
    tracing::info!(
        ollama_host = %config.ollama_host,
        model = %config.model,
        system_prompt = config.system_prompt.is_some(),
        "loaded configuration"
    );

    let client = OllamaClient::new(config.ollama_host.clone(), config.connect_timeout)?;
    let relay = Arc::new(ChatRelay::from_config(Arc::new(client), &config));
    let routes = configure_routes(relay, config.max_body_bytes);

    let addr = SocketAddr::new(config.bind_addr, config.port);
    tracing::info!("Starting server on http://{}", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
