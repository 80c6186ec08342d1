//! WebSocket client for the full-channel market data feed.
//!
//! This module provides the [`FeedClient`] for streaming the sequenced
//! per-order feed, and [`drive`], the serial message pump that keeps a
//! [`BookReconstructor`] synchronized until shutdown.
//!
//! # Example
//!
//! ```rust,no_run
//! use l3_orderbook::client::rest::RestClient;
//! use l3_orderbook::client::websocket::{drive, FeedClient};
//! use l3_orderbook::orderbook::BookReconstructor;
//! use l3_orderbook::Config;
//!
//! # async fn example() -> l3_orderbook::Result<()> {
//! let config = Config::new();
//! let book = BookReconstructor::new("BTC-USD", RestClient::new(&config)?);
//!
//! let mut feed = FeedClient::connect(&config).await?;
//! feed.subscribe_full(&["BTC-USD"]).await?;
//!
//! let (_stop, mut shutdown) = tokio::sync::watch::channel(false);
//! drive(&mut feed, &book, &mut shutdown).await?;
//! # Ok(())
//! # }
//! ```

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::warn;
use url::Url;

use crate::config::Config;
use crate::error::Error;
use crate::orderbook::{BookReconstructor, SnapshotProvider};
use crate::types::messages::{FeedCommand, FeedMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client for the full channel
///
/// # Thread Safety
///
/// This client is NOT thread-safe. Run it from a single task; share the
/// reconstructed book instead.
#[derive(Debug)]
pub struct FeedClient {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

impl FeedClient {
    /// Connect to the exchange WebSocket feed
    ///
    /// # Errors
    ///
    /// Returns an error if the feed URL is invalid or the connection fails.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let url = Url::parse(config.websocket_url())?;
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (write, read) = ws_stream.split();

        Ok(Self { write, read })
    }

    /// Send a command to the feed server
    async fn send_command(&mut self, cmd: &FeedCommand) -> Result<(), Error> {
        let json = serde_json::to_string(cmd)?;
        self.write.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Subscribe to the full channel for the given products
    pub async fn subscribe_full(&mut self, product_ids: &[&str]) -> Result<(), Error> {
        let cmd = FeedCommand::Subscribe {
            product_ids: product_ids.iter().map(|s| s.to_string()).collect(),
            channels: vec!["full".to_string()],
        };
        self.send_command(&cmd).await
    }

    /// Unsubscribe from the full channel for the given products
    pub async fn unsubscribe_full(&mut self, product_ids: &[&str]) -> Result<(), Error> {
        let cmd = FeedCommand::Unsubscribe {
            product_ids: product_ids.iter().map(|s| s.to_string()).collect(),
            channels: vec!["full".to_string()],
        };
        self.send_command(&cmd).await
    }

    /// Receive the next feed message.
    ///
    /// Pings are answered automatically. Text frames that fail to decode
    /// are logged and skipped rather than surfaced: the feed is noisy and
    /// a bad frame must not stop the pump. (Its lost sequence slot will
    /// surface as a gap and heal through a resync.)
    ///
    /// # Returns
    ///
    /// The next message, or `None` if the connection is closed.
    pub async fn next(&mut self) -> Option<Result<FeedMessage, Error>> {
        loop {
            match self.read.next().await? {
                Ok(Message::Text(text)) => match serde_json::from_str::<FeedMessage>(&text) {
                    Ok(msg) => return Some(Ok(msg)),
                    Err(err) => {
                        warn!(%err, "skipping undecodable feed frame");
                        continue;
                    }
                },
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.write.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(_)) => {
                    return Some(Err(Error::ConnectionClosed));
                }
                Ok(_) => {
                    // Ignore other message types (Binary, Pong, Frame)
                    continue;
                }
                Err(e) => {
                    return Some(Err(e.into()));
                }
            }
        }
    }

    /// Close the WebSocket connection
    pub async fn close(&mut self) -> Result<(), Error> {
        self.write.close().await?;
        Ok(())
    }
}

/// Pump feed messages into the book until shutdown or a feed error.
///
/// Messages are applied strictly serially; the sequence-number contract
/// forbids parallel application. The shutdown flag is only honored between
/// messages, so the book is never left mid-mutation.
///
/// # Errors
///
/// Returns transport errors and snapshot-provider failures. A clean
/// shutdown returns `Ok(())`.
pub async fn drive<P: SnapshotProvider>(
    feed: &mut FeedClient,
    book: &BookReconstructor<P>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), Error> {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                // a dropped sender also means stop
                if changed.is_err() || *shutdown.borrow() {
                    return Ok(());
                }
            }
            message = feed.next() => match message {
                Some(Ok(msg)) => book.on_message(&msg).await?,
                Some(Err(err)) => return Err(err),
                None => return Err(Error::ConnectionClosed),
            },
        }
    }
}
