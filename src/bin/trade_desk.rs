use std::env;
use std::sync::Arc;
use dotenv::dotenv;
use energy_trading_gateway::ui::client::ApiClient;
use energy_trading_gateway::ui::controller::{TradeDeskController, TradeForm};
use energy_trading_gateway::ui::monitor::MonitorHandle;
use energy_trading_gateway::ui::view::ConsoleView;

const USAGE: &str = "usage: trade_desk [--url <gateway>] [--yes] <command>

commands:
  status                         show connection status and listed trades
  trades                         list active trades
  order <sell|buy> <kwh> <price> submit a trade order (price per kWh)
  buy <trade-id>                 purchase a listed trade
  watch <tx-hash>                follow a transaction until it is confirmed";

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenv().ok();
    env_logger::init();

    let mut url = env::var("TRADE_DESK_URL").unwrap_or_else(|_| ApiClient::DEFAULT_BASE_URL.to_string());
    let mut assume_yes = false;
    let mut command = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => url = args.next().ok_or("--url needs a value")?,
            "--yes" | "-y" => assume_yes = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => command.push(arg),
        }
    }

    let view = Arc::new(ConsoleView::new(assume_yes));
    let desk = TradeDeskController::new(ApiClient::new(url), view);

    match command.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["status"] | [] => desk.activate().await,
        ["trades"] => desk.load_trades().await,
        ["order", direction, kwh, price] => {
            let form = TradeForm {
                direction: direction.parse().map_err(|_| format!("unknown direction {:?}", direction))?,
                amount_kwh: kwh.parse().map_err(|_| format!("invalid amount {:?}", kwh))?,
                price: price.parse().map_err(|_| format!("invalid price {:?}", price))?,
            };
            if let Ok(monitor) = desk.submit_trade(&form).await {
                follow(monitor).await;
            }
        }
        ["buy", trade_id] => {
            if let Ok(monitor) = desk.buy(trade_id).await {
                follow(monitor).await;
            }
        }
        ["watch", hash] => follow(desk.show_transaction_details(hash, "Transaction")).await,
        _ => return Err(USAGE.to_string()),
    }

    Ok(())
}

// Ctrl-C plays the part of closing the details view.
async fn follow(mut monitor: MonitorHandle) {
    let hash = monitor.hash().to_string();
    tokio::select! {
        _ = monitor.finished() => {}
        _ = tokio::signal::ctrl_c() => {
            log::info!("Stopped following {}", hash);
        }
    }
    monitor.cancel();
}
