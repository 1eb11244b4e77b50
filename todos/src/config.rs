//! Command line configuration

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::api::{FakeServer, HttpApi, TodoApi};

/// Command line to-do list on a Redux-style store
#[derive(Parser, Debug)]
#[command(name = "todos")]
#[command(about = "A to-do list REPL demonstrating todo-dispatch patterns")]
pub struct Args {
    /// Base URL of an HTTP backend; the in-memory backend is used without it
    #[arg(long)]
    pub server: Option<String>,

    /// Simulated latency of the in-memory backend, in milliseconds
    #[arg(long, default_value = "0")]
    pub latency_ms: u64,

    /// Start the in-memory backend with sample items (default)
    #[arg(long, overrides_with = "no_seed")]
    pub seed: bool,

    /// Start the in-memory backend empty
    #[arg(long, overrides_with = "seed")]
    pub no_seed: bool,

    /// Default log filter; RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Filter combinations the filtered list selector keeps cached
    #[arg(long, default_value = "1")]
    pub max_cached: usize,
}

/// Resolved settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub server: Option<String>,
    pub latency: Duration,
    pub seed: bool,
    pub log_level: String,
    pub max_cached: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: None,
            latency: Duration::ZERO,
            seed: true,
            log_level: "warn".to_string(),
            max_cached: 1,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            server: args.server,
            latency: Duration::from_millis(args.latency_ms),
            seed: !args.no_seed,
            log_level: args.log_level,
            max_cached: args.max_cached.max(1),
        }
    }
}

impl Config {
    /// Build the backend client these settings describe.
    pub fn api(&self) -> Arc<dyn TodoApi> {
        match &self.server {
            Some(url) => {
                tracing::info!(%url, "Using HTTP backend");
                Arc::new(HttpApi::new(url.clone()))
            }
            None => {
                let server = if self.seed {
                    FakeServer::seeded()
                } else {
                    FakeServer::new()
                };
                tracing::info!(seeded = self.seed, "Using in-memory backend");
                Arc::new(server.with_latency(self.latency))
            }
        }
    }
}
