#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use ownd_api::{Connector, GatewayEndpoint};
use tokio::io::{AsyncRead, AsyncWrite};

/// Hands out pre-built streams (or connect errors) in order, then refuses.
pub struct Scripted<S> {
    streams: Mutex<VecDeque<io::Result<S>>>,
    attempts: AtomicU32,
}

impl<S> Scripted<S> {
    pub fn new(streams: Vec<io::Result<S>>) -> Self {
        Self {
            streams: Mutex::new(streams.into()),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<S> Connector for &Scripted<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Stream = S;

    async fn connect(&self, _endpoint: &GatewayEndpoint) -> io::Result<S> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.streams.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(io::ErrorKind::ConnectionRefused.into()))
    }
}

pub fn refused<S>() -> io::Result<S> {
    Err(io::ErrorKind::ConnectionRefused.into())
}

pub fn reset<S>() -> io::Result<S> {
    Err(io::ErrorKind::ConnectionReset.into())
}

pub fn endpoint() -> GatewayEndpoint {
    GatewayEndpoint::new("127.0.0.1")
}
