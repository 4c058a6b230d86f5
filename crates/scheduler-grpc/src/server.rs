//! The gRPC server builder (spec.md §4.5 / §4.6): wires the two task-scheduler services
//! plus reflection onto a tonic `Server`, selecting plaintext/TLS/mTLS from
//! [`ServerConfig`], and drives graceful shutdown through the shared [`TaskManager`].

use std::time::Duration;

use scheduler_core::ExecutionCore;
use scheduler_tasks::TaskManager;
use scheduler_wire::task_results_server::TaskResultsServer;
use scheduler_wire::task_submission_server::TaskSubmissionServer;
use scheduler_wire::FILE_DESCRIPTOR_SET;
use tokio::sync::oneshot;
use tonic::transport::Server;
use tracing::{info, warn};

use crate::config::{ServerConfig, TransportMode};
use crate::service::SchedulerService;
use crate::tls;
use crate::Error;

/// A handle to a running gRPC server. Dropping it does not stop the server; call
/// [`GrpcServerHandle::stop`] or await [`GrpcServerHandle::stopped`] explicitly.
#[derive(Debug)]
pub struct GrpcServerHandle {
    addr: std::net::SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_manager: TaskManager,
    shutdown_grace: Duration,
}

impl GrpcServerHandle {
    /// The socket address the server is actually bound to.
    pub fn addr(&self) -> std::net::SocketAddr {
        self.addr
    }

    /// Signals the server to stop accepting new connections. Does not wait for in-flight
    /// requests to finish; pair with [`GrpcServerHandle::graceful_shutdown`] for that.
    pub fn stop(&mut self) -> Result<(), Error> {
        self.shutdown_tx.take().ok_or(Error::AlreadyStopped)?.send(()).ok();
        Ok(())
    }

    /// Stops accepting new connections, then waits up to the configured grace period for
    /// in-flight requests to drain before letting any remaining work be aborted
    /// (spec.md §4.6).
    pub async fn graceful_shutdown(mut self) {
        let _ = self.stop();

        if tokio::time::timeout(self.shutdown_grace, self.task_manager.shutdown()).await.is_err()
        {
            warn!(
                target: "scheduler::grpc",
                grace_seconds = self.shutdown_grace.as_secs(),
                "shutdown grace period elapsed with requests still in flight; aborting",
            );
        }
    }
}

/// Builds and starts the gRPC server over the two task-scheduler services.
#[derive(Debug, Clone)]
pub struct GrpcServer {
    config: ServerConfig,
}

impl GrpcServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Starts serving `core` over the configured transport. Spawns the accept loop onto
    /// the manager's runtime and returns immediately with a handle.
    pub async fn start(
        self,
        core: ExecutionCore,
        task_manager: TaskManager,
    ) -> Result<GrpcServerHandle, Error> {
        let addr = self.config.addr;

        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .map_err(|e| Error::ReflectionBuild(e.to_string()))?;

        let service = SchedulerService::new(core);

        let mut builder = Server::builder();

        match self.config.tls.mode() {
            TransportMode::Plaintext => {
                warn!(target: "scheduler::grpc", %addr, "starting in plaintext mode, no transport encryption");
            }
            mode => {
                let tls_config = tls::build_tls_config(&self.config.tls)?
                    .expect("TLS mode implies cert+key material is present");
                builder = builder.tls_config(tls_config)?;
                info!(target: "scheduler::grpc", %addr, mtls = mode == TransportMode::MutualTls, "TLS enabled");
            }
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let server = builder
            .add_service(reflection_service)
            .add_service(TaskSubmissionServer::new(service.clone()))
            .add_service(TaskResultsServer::new(service));

        let server_future = server.serve_with_shutdown(addr, async {
            let _ = shutdown_rx.await;
        });

        task_manager.task_spawner().spawn(async move {
            if let Err(err) = server_future.await {
                tracing::error!(target: "scheduler::grpc", %err, "gRPC server error");
            }
        });

        info!(target: "scheduler::grpc", %addr, "task scheduler gRPC server started");

        Ok(GrpcServerHandle {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task_manager,
            shutdown_grace: self.config.shutdown_grace,
        })
    }
}
