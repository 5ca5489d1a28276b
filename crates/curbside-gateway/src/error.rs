//! Gateway-level error types.
//!
//! These cover transport lifecycle failures only. Anything that goes wrong
//! while handling an individual submission is expressed through
//! [`IngressReply`](crate::ingress::IngressReply) instead, because callers on
//! the wire always receive a response envelope rather than a Rust error.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised while starting or driving a transport.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The transport configuration is unusable.
    #[error("invalid gateway configuration: {0}")]
    Config(String),

    /// The HTTP listener could not bind its address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an I/O error.
    #[error("http transport error: {0}")]
    Serve(#[from] std::io::Error),

    /// The channel transport worker is no longer running.
    #[error("ingress worker is no longer running")]
    ChannelClosed,
}
