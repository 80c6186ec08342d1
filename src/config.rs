//! Configuration for the feed and snapshot clients.
//!
//! This module provides the [`Config`] struct for selecting the exchange
//! environment and tuning client settings.

use std::time::Duration;

/// API environment (production or sandbox)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Production environment (live market data)
    #[default]
    Production,
    /// Public sandbox environment
    Sandbox,
}

impl Environment {
    /// Get the base URL for the REST API
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.exchange.coinbase.com",
            Environment::Sandbox => "https://api-public.sandbox.exchange.coinbase.com",
        }
    }

    /// Get the WebSocket feed URL
    pub fn websocket_url(&self) -> &'static str {
        match self {
            Environment::Production => "wss://ws-feed.exchange.coinbase.com",
            Environment::Sandbox => "wss://ws-feed-public.sandbox.exchange.coinbase.com",
        }
    }
}

/// Configuration for the market-data clients
///
/// # Example
///
/// ```rust
/// use l3_orderbook::Config;
///
/// let config = Config::new();
///
/// // Use the sandbox feed
/// let sandbox_config = Config::new()
///     .with_environment(l3_orderbook::config::Environment::Sandbox);
///
/// // Custom timeout
/// let config = Config::new()
///     .with_timeout(std::time::Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API environment
    environment: Environment,

    /// HTTP request timeout
    timeout: Option<Duration>,
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self {
            environment: Environment::default(),
            timeout: Some(Duration::from_secs(10)),
        }
    }

    /// Set the API environment (production or sandbox)
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the HTTP request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Get the REST API base URL
    pub fn rest_base_url(&self) -> &'static str {
        self.environment.rest_base_url()
    }

    /// Get the WebSocket feed URL
    pub fn websocket_url(&self) -> &'static str {
        self.environment.websocket_url()
    }

    /// Get the timeout duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
