use std::sync::Arc;
use log::{error, info, warn};
use up_proxy::api::http_server::{self, AppState};
use up_proxy::connectors::{self, up_rest::UpClient};
use up_proxy::core::cache::TransactionCache;
use up_proxy::core::interfaces::SystemClock;
use up_proxy::core::models::DataSource;
use up_proxy::utils::config::AppConfig;
use up_proxy::utils::scheduler;

#[tokio::main]
async fn main() {
    // 1. Load Config (defaults < config file < .env / environment)
    let config: AppConfig = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize Logger, RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    info!(">>> Up Proxy is Starting... <<<");

    if config.up_token.is_empty() && config.data_source == DataSource::Live {
        warn!("UP_TOKEN is not set; upstream calls will be rejected");
    }

    // 3. Build Upstream Client, Source & Cache
    let client: UpClient = UpClient::from_config(&config);
    let source = connectors::build_source(&config, &client);
    let cache = TransactionCache::new(
        source,
        Arc::new(SystemClock),
        config.cache_ttl(),
        config.amount_policy,
    );

    let state = AppState {
        cache: Arc::new(cache),
        client: Arc::new(client),
    };

    // 4. Background Jobs
    if let Err(e) = scheduler::spawn_jobs(&config) {
        warn!("Scheduler not started: {}", e);
    }

    // 5. Serve
    let address: String = config.bind_address();
    info!(">>> Serving on {} (source: {:?}, ttl: {}s) <<<", address, config.data_source, config.cache_ttl_secs);

    if let Err(e) = http_server::start_server(&address, state).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
