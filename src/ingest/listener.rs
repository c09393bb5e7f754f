//! TCP accept loop for sensor clients.

use crate::error::{HubError, Result};
use crate::ingest::config::IngestConfig;
use crate::ingest::connection::{handle_connection, ConnectionOutcome};
use crate::store::MetricStore;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{lookup_host, TcpListener, TcpSocket};
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// A bound sensor listener, ready to accept connections.
///
/// The listening socket is owned here and closed when [`run_until`]
/// returns, whichever way it exits.
///
/// [`run_until`]: IngestServer::run_until
pub struct IngestServer {
    listener: TcpListener,
    store: Arc<MetricStore>,
    config: Arc<IngestConfig>,
}

impl IngestServer {
    /// Bind the listening socket with address reuse enabled.
    ///
    /// Failure here is fatal for the service and reported as
    /// [`HubError::Bind`].
    pub async fn bind(config: IngestConfig, store: Arc<MetricStore>) -> Result<Self> {
        config.validate()?;
        let bind_address = config.bind_address();

        let addr = lookup_host(&bind_address)
            .await
            .map_err(|e| HubError::bind_error(&bind_address, e))?
            .next()
            .ok_or_else(|| HubError::bind_error(&bind_address, "address did not resolve"))?;

        let listener = bind_reusable(addr, config.backlog)
            .map_err(|e| HubError::bind_error(&bind_address, e))?;

        info!("Sensor server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            store,
            config: Arc::new(config),
        })
    }

    /// The address actually bound, useful when the configured port is 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Every connection runs on its own task, concurrently with the accept
    /// loop and with every other connection. After shutdown the socket is
    /// closed and in-flight handlers are allowed to finish.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let IngestServer {
            listener,
            store,
            config,
        } = self;
        let mut handlers = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, closing sensor listener");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let store = Arc::clone(&store);
                        let config = Arc::clone(&config);
                        let span = info_span!("sensor", %peer);
                        handlers.spawn(
                            async move {
                                report(handle_connection(stream, store.as_ref(), &config).await);
                            }
                            .instrument(span),
                        );
                    }
                    Err(e) => {
                        warn!("Failed to accept sensor connection: {}", e);
                    }
                },
                Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                    if let Err(e) = joined {
                        error!("Sensor connection task failed: {}", e);
                    }
                }
            }
        }

        drop(listener);
        info!("Sensor server socket closed");

        if !handlers.is_empty() {
            debug!("Waiting for {} in-flight sensor connections", handlers.len());
        }
        while let Some(joined) = handlers.join_next().await {
            if let Err(e) = joined {
                error!("Sensor connection task failed: {}", e);
            }
        }

        Ok(())
    }
}

/// Bind `config` and serve sensor connections until Ctrl-C.
pub async fn serve(config: IngestConfig, store: Arc<MetricStore>) -> Result<()> {
    let server = IngestServer::bind(config, store).await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}

fn bind_reusable(addr: SocketAddr, backlog: u32) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}

fn report(result: Result<ConnectionOutcome>) {
    match result {
        Ok(ConnectionOutcome::Empty) => debug!("Client closed without sending data"),
        Ok(ConnectionOutcome::Processed { reading, .. }) => {
            debug!("Handled {} reading", reading.kind_name())
        }
        Err(e) => warn!("Sensor connection aborted: {}", e),
    }
}
