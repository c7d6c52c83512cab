//! WebSocket listener and connection built on `tokio-tungstenite`.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

use crate::TransportError;

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Listens for incoming WebSocket connections.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds to the given address. Use port 0 to let the OS pick one
    /// (handy in tests); [`local_addr`](Self::local_addr) reports the
    /// actual port.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "websocket listener bound");
        Ok(Self { listener })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next connection and completes the WebSocket
    /// handshake on it.
    pub async fn accept(&mut self) -> Result<WsConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| TransportError::HandshakeFailed(e.to_string()))?;

        tracing::debug!(%peer, "accepted websocket connection");
        Ok(WsConnection { peer, ws })
    }
}

/// One accepted WebSocket connection.
pub struct WsConnection {
    peer: SocketAddr,
    ws: WsStream,
}

impl WsConnection {
    /// The remote peer's address, for logging.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Splits the connection into independently owned halves so reads
    /// and writes can run in separate tasks.
    pub fn into_split(self) -> (WsWriter, WsReader) {
        let (sink, stream) = self.ws.split();
        (
            WsWriter { sink },
            WsReader {
                peer: self.peer,
                stream,
            },
        )
    }
}

/// The write half: ships encoded frames to the client.
pub struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

impl WsWriter {
    /// Sends one frame. UTF-8 payloads (all of this protocol's JSON) go
    /// out as text frames; anything else falls back to binary.
    pub async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        let msg = match String::from_utf8(data) {
            Ok(text) => Message::Text(text.into()),
            Err(raw) => Message::Binary(raw.into_bytes().into()),
        };
        self.sink
            .send(msg)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Closes the connection from the server side.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .send(Message::Close(None))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

/// The read half: yields inbound frames as raw bytes.
pub struct WsReader {
    peer: SocketAddr,
    stream: SplitStream<WsStream>,
}

impl WsReader {
    /// Receives the next data frame.
    ///
    /// Returns `Ok(None)` when the client closed cleanly (a Close frame
    /// or end of stream). Control frames are handled by tungstenite and
    /// skipped here.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    tracing::debug!(peer = %self.peer, error = %e, "websocket receive error");
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
            }
        }
    }
}
