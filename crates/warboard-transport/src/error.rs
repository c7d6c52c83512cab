/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener or accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The TCP connection arrived but the WebSocket upgrade failed.
    #[error("websocket handshake failed: {0}")]
    HandshakeFailed(String),

    /// Sending a frame failed; the connection is gone.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receiving a frame failed; the connection is gone.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}
