use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use ethers::providers::{Http, Provider};
use energy_trading_gateway::config::GatewayConfig;
use energy_trading_gateway::routes::{self, initialize_app_state};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    let app_state = web::Data::new(initialize_app_state(&config).context("failed to create blockchain client")?);
    let json_limit = config.json_limit;

    log::info!(
        "Starting energy trading gateway on {} (demo mode: {})",
        config.bind_address,
        config.demo_mode
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(app_state.clone()) // One facade shared by every worker
            .configure(routes::configure::<Provider<Http>>(json_limit))
    })
    .bind(&config.bind_address)
    .with_context(|| format!("failed to bind {}", config.bind_address))?
    .run()
    .await
    .context("server error")
}
