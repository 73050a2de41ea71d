//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{
    Connection, ConnectionId, FrameReceiver, FrameSender, PendingConnection, Transport,
    TransportError,
};

/// Counter for generating unique connection IDs. Starts at 1.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

fn io_error(
    kind: std::io::ErrorKind,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> std::io::Error {
    std::io::Error::new(kind, err)
}

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    ///
    /// Port `0` lets the OS pick one; read it back with
    /// [`local_addr`](Transport::local_addr).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        let local = listener.local_addr().map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr = %local, "WebSocket transport listening");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Pending = PendingWebSocket;

    /// Accepts the TCP connection only. The HTTP upgrade happens in
    /// [`PendingWebSocket::upgrade`], off the accept loop.
    async fn accept(&mut self) -> Result<PendingWebSocket, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::trace!(%addr, "accepted TCP connection");
        Ok(PendingWebSocket { stream, addr })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

/// A TCP connection that has not completed the WebSocket upgrade yet.
pub struct PendingWebSocket {
    stream: TcpStream,
    addr: SocketAddr,
}

impl PendingConnection for PendingWebSocket {
    type Connection = WebSocketConnection;

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    async fn upgrade(self) -> Result<WebSocketConnection, TransportError> {
        let ws = tokio_tungstenite::accept_async(self.stream)
            .await
            .map_err(|e| {
                TransportError::AcceptFailed(io_error(std::io::ErrorKind::ConnectionRefused, e))
            })?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, addr = %self.addr, "accepted WebSocket connection");

        Ok(WebSocketConnection {
            id,
            addr: self.addr,
            ws,
        })
    }
}

/// A single accepted WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    addr: SocketAddr,
    ws: WsStream,
}

impl WebSocketConnection {
    /// The remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Connection for WebSocketConnection {
    type Sender = WebSocketSender;
    type Receiver = WebSocketReceiver;

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn into_split(self) -> (WebSocketSender, WebSocketReceiver) {
        let (sink, stream) = self.ws.split();
        (
            WebSocketSender { id: self.id, sink },
            WebSocketReceiver {
                id: self.id,
                stream,
            },
        )
    }
}

/// Write half of a [`WebSocketConnection`].
pub struct WebSocketSender {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
}

impl WebSocketSender {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl FrameSender for WebSocketSender {
    async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        let msg = match String::from_utf8(data) {
            Ok(text) => Message::Text(text.into()),
            Err(e) => Message::Binary(e.into_bytes().into()),
        };
        self.sink
            .send(msg)
            .await
            .map_err(|e| TransportError::SendFailed(io_error(std::io::ErrorKind::BrokenPipe, e)))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(io_error(std::io::ErrorKind::BrokenPipe, e)))
    }
}

/// Read half of a [`WebSocketConnection`].
pub struct WebSocketReceiver {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
}

impl WebSocketReceiver {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl FrameReceiver for WebSocketReceiver {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Ping/pong/raw frames; tungstenite answers pings itself.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(io_error(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }
}
