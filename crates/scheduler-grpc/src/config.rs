//! RPC surface configuration (SPEC_FULL.md §3, §6): bind address, transport security
//! mode, and shutdown grace period. Purely a startup-time construct assembled from CLI
//! flags in the `bin` crate -- never wire-visible.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Default gRPC server listening address.
pub const DEFAULT_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default gRPC server listening port.
pub const DEFAULT_PORT: u16 = 50051;

/// Default grace period the harness waits for in-flight requests to drain before
/// aborting them (spec.md §4.6).
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Paths to the PEM material backing the server's transport security, resolved into one
/// of the three modes spec.md §4.5 describes.
#[derive(Debug, Clone, Default)]
pub struct TlsMaterial {
    /// Server certificate chain (PEM). Required for TLS and mTLS.
    pub cert: Option<PathBuf>,
    /// Server private key (PEM). Required for TLS and mTLS.
    pub key: Option<PathBuf>,
    /// CA bundle (PEM) client certificates are verified against. Its presence alongside
    /// `cert`/`key` upgrades plain TLS to mTLS.
    pub client_ca: Option<PathBuf>,
}

/// The transport security mode the RPC surface was configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// No encryption. Development only; a warning is logged at startup.
    Plaintext,
    /// Server presents a certificate chain; clients are not authenticated.
    Tls,
    /// Server presents a certificate chain and requires/verifies client certificates.
    MutualTls,
}

impl TlsMaterial {
    /// Resolves which transport mode this material selects, per spec.md §4.5 / §6:
    /// absent cert+key is plaintext, cert+key only is TLS, all three is mTLS.
    pub fn mode(&self) -> TransportMode {
        match (&self.cert, &self.key, &self.client_ca) {
            (Some(_), Some(_), Some(_)) => TransportMode::MutualTls,
            (Some(_), Some(_), None) => TransportMode::Tls,
            _ => TransportMode::Plaintext,
        }
    }
}

/// Top-level configuration for the RPC surface and the result cache it's built over.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the gRPC server listens on.
    pub addr: SocketAddr,
    /// Transport security material.
    pub tls: TlsMaterial,
    /// Total result cache capacity across all shards.
    pub cache_capacity: usize,
    /// Number of independently-locked cache shards.
    pub cache_shards: usize,
    /// How long graceful shutdown waits for in-flight requests before aborting them.
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            tls: TlsMaterial::default(),
            cache_capacity: scheduler_cache::DEFAULT_CAPACITY,
            cache_shards: scheduler_cache::DEFAULT_SHARDS,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::new(DEFAULT_ADDR, DEFAULT_PORT))
    }
}
