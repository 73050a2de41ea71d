//! `Server` builder and accept loop.
//!
//! This is the entry point for running a minehub server. It ties the
//! layers together: transport → protocol → room registry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use minehub_protocol::JsonCodec;
use minehub_room::{DEFAULT_CHANNEL_SIZE, RoomConfig, RoomError, RoomRegistry};
use minehub_transport::{PendingConnection, PendingWebSocket, Transport, WebSocketTransport};

use crate::MinehubError;
use crate::handler::handle_connection;

/// How long a connection may stay silent before it is dropped.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a new connection has to finish the WebSocket upgrade, and
/// then again to send its `Hello`.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) rooms: RoomRegistry,
    pub(crate) codec: JsonCodec,
    /// Live connections. Zero at startup; only the connection guard
    /// changes it.
    pub(crate) connections: AtomicUsize,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,ignore
/// let server = Server::builder()
///     .bind("0.0.0.0:8080")
///     .room_defaults(RoomConfig::new(16, 16, 40))
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    room_defaults: RoomConfig,
    channel_size: usize,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_defaults: RoomConfig::default(),
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Board settings for rooms created implicitly by a join.
    pub fn room_defaults(mut self, config: RoomConfig) -> Self {
        self.room_defaults = config;
        self
    }

    /// Command queue length of each room actor.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    /// Validates the settings and binds the listener.
    pub async fn build(self) -> Result<Server, MinehubError> {
        self.room_defaults
            .validate()
            .map_err(RoomError::InvalidConfig)?;

        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: RoomRegistry::with_channel_size(self.room_defaults, self.channel_size),
            codec: JsonCodec,
            connections: AtomicUsize::new(0),
        });

        Ok(Server { transport, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct Server {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, MinehubError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle for inspecting the server while it runs.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Runs the accept loop.
    ///
    /// Each accepted connection gets its own task, which performs the
    /// WebSocket upgrade under [`HANDSHAKE_TIMEOUT`] and then runs the
    /// handler. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), MinehubError> {
        tracing::info!("minehub server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(serve(pending, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Upgrades one accepted connection and hands it to the handler.
async fn serve(pending: PendingWebSocket, state: Arc<ServerState>) {
    let peer = pending.peer_addr();
    let conn = match tokio::time::timeout(HANDSHAKE_TIMEOUT, pending.upgrade()).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            tracing::debug!(%peer, error = %e, "upgrade failed");
            return;
        }
        Err(_) => {
            tracing::debug!(%peer, "upgrade timed out");
            return;
        }
    };
    if let Err(e) = handle_connection(conn, state).await {
        tracing::debug!(%peer, error = %e, "connection ended with error");
    }
}

/// Cheap, cloneable view of a running server.
#[derive(Clone)]
pub struct ServerHandle {
    state: Arc<ServerState>,
}

impl ServerHandle {
    /// Number of connections currently open.
    pub fn connection_count(&self) -> usize {
        self.state.connections.load(Ordering::Relaxed)
    }

    /// The server's room registry.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.state.rooms
    }
}
