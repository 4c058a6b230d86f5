//! CLI flags for the task-scheduler binary (SPEC_FULL.md §6):
//!
//! ```text
//! task-scheduler --listen <host:port>
//!                [--tls-cert <path> --tls-key <path> [--tls-client-ca <path>]]
//!                [--cache-capacity <N>] [--cache-shards <N>]
//!                [--shutdown-grace-seconds <N>]
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use scheduler_grpc::{ServerConfig, TlsMaterial};

#[derive(Parser, Debug)]
#[command(name = "task-scheduler", version, about = "Distributed task-scheduler server", long_about = None)]
pub struct Args {
    /// Address to listen on, e.g. `0.0.0.0:50051`.
    #[arg(long, default_value_t = SocketAddr::new(scheduler_grpc::DEFAULT_ADDR, scheduler_grpc::DEFAULT_PORT))]
    listen: SocketAddr,

    /// Server certificate chain (PEM). Presence with `--tls-key` enables TLS.
    #[arg(long)]
    tls_cert: Option<PathBuf>,

    /// Server private key (PEM). Presence with `--tls-cert` enables TLS.
    #[arg(long)]
    tls_key: Option<PathBuf>,

    /// CA bundle (PEM) to verify client certificates against. Presence alongside
    /// `--tls-cert`/`--tls-key` upgrades TLS to mutual TLS.
    #[arg(long)]
    tls_client_ca: Option<PathBuf>,

    /// Total result cache capacity across all shards.
    #[arg(long, default_value_t = scheduler_cache::DEFAULT_CAPACITY)]
    cache_capacity: usize,

    /// Number of independently-locked result cache shards.
    #[arg(long, default_value_t = scheduler_cache::DEFAULT_SHARDS)]
    cache_shards: usize,

    /// How long graceful shutdown waits for in-flight requests before aborting them.
    #[arg(long, default_value_t = 10)]
    shutdown_grace_seconds: u64,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn into_server_config(self) -> ServerConfig {
        ServerConfig {
            addr: self.listen,
            tls: TlsMaterial { cert: self.tls_cert, key: self.tls_key, client_ca: self.tls_client_ca },
            cache_capacity: self.cache_capacity,
            cache_shards: self.cache_shards,
            shutdown_grace: Duration::from_secs(self.shutdown_grace_seconds),
        }
    }
}
