use std::sync::Arc;

use retired_routes_backend::api::{self, AppState};
use retired_routes_backend::config::Config;
use retired_routes_backend::metrics;
use retired_routes_backend::retirement::RetirementTable;
use retired_routes_backend::topics::{HttpTopicDiscovery, TopicDiscovery, UnconfiguredTopicDiscovery};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    let retirements = match &config.retirements_file {
        Some(path) => RetirementTable::from_json_file(path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {e}", path.display())),
        None => RetirementTable::builtin(),
    };
    tracing::info!("Loaded {} retired routes", retirements.len());

    // Cycles are an operational problem; surface them but keep serving.
    for cycle in retirements.find_cycles() {
        tracing::warn!("Retired routes redirect in a cycle: {}", cycle.join(" -> "));
    }

    let topics: Arc<dyn TopicDiscovery> = match &config.topic_discovery_url {
        Some(url) => Arc::new(
            HttpTopicDiscovery::new(url.clone(), config.topic_discovery_timeout)
                .expect("Failed to build topic discovery client"),
        ),
        None => {
            tracing::warn!("TOPIC_DISCOVERY_URL not set; trending topics will return 500");
            Arc::new(UnconfiguredTopicDiscovery)
        }
    };

    if !config.ad_sdk.is_enabled() {
        tracing::info!("Ad SDK not configured; placeholders will not load it");
    }

    let state = AppState::new(retirements, topics, config.ad_sdk.clone());
    let app = api::app(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("Retired routes backend listening on {addr}");
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
