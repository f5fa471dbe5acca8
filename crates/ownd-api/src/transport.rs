//! How sessions obtain a byte stream to the gateway.
//!
//! The session runtime is generic over [`Connector`] so reconnect and
//! retransmission behaviour can be exercised against in-memory streams.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::endpoint::GatewayEndpoint;

pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(
        &self,
        endpoint: &GatewayEndpoint,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP, no TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, endpoint: &GatewayEndpoint) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((endpoint.address.as_str(), endpoint.port)).await?;
        stream.set_nodelay(true)?;
        tracing::debug!(peer = ?stream.peer_addr().ok(), "TCP connection established");
        Ok(stream)
    }
}
