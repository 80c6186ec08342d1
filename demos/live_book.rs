//! Live book demo - reconstructs a product's order book from the full
//! channel and prints the top of book once a second.
//!
//! Usage:
//!   cargo run --example live_book -- BTC-USD
//!
//! Optional:
//!   L3_ENV=sandbox  # Use the public sandbox endpoints

use std::sync::Arc;
use std::time::Duration;

use l3_orderbook::client::rest::RestClient;
use l3_orderbook::client::websocket::{drive, FeedClient};
use l3_orderbook::config::Environment;
use l3_orderbook::orderbook::BookReconstructor;
use l3_orderbook::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("l3_orderbook=info".parse().unwrap()),
        )
        .init();

    let product = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "BTC-USD".to_string());

    // Determine environment
    let env = match std::env::var("L3_ENV")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "sandbox" => Environment::Sandbox,
        _ => Environment::Production,
    };
    let config = Config::new().with_environment(env);

    println!("=== Live Book: {} ===\n", product);

    let book = Arc::new(BookReconstructor::new(
        product.clone(),
        RestClient::new(&config)?,
    ));

    println!("Connecting to feed...");
    let mut feed = FeedClient::connect(&config).await?;
    feed.subscribe_full(&[&product]).await?;
    println!("Subscribed to the full channel\n(Press Ctrl+C to stop)\n");

    let (stop, mut shutdown) = tokio::sync::watch::channel(false);

    // Top-of-book printer, reading concurrently with the feed task
    let reader = Arc::clone(&book);
    let printer = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            if !reader.is_synced() {
                continue;
            }

            let (bid_levels, ask_levels) = reader.num_levels();
            println!(
                "seq {:?} | BID {:?} | ASK {:?} | spread {:?} | {} bid levels / {} ask levels",
                reader.sequence(),
                reader.best_bid_price().ok(),
                reader.best_ask_price().ok(),
                reader.spread(),
                bid_levels,
                ask_levels
            );

            if let Some(trade) = reader.last_trade() {
                println!(
                    "         last trade: {:?} {} @ {}",
                    trade.side, trade.size, trade.price
                );
            }
        }
    });

    // Flip the shutdown flag on Ctrl+C
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = stop.send(true);
    });

    drive(&mut feed, &book, &mut shutdown).await?;

    printer.abort();
    let _ = feed.close().await;
    println!("\nStopped");
    Ok(())
}
