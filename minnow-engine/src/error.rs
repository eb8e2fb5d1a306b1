//! Error taxonomy for the engine.
//!
//! Transport and parse failures are deliberately separate types: a connect
//! error aborts startup, while send/receive and parse errors are transient
//! and must never take down the session loop.

use std::io;

use thiserror::Error;

/// Failures at the byte-stream boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    /// The peer ended the stream.
    #[error("connection closed by peer")]
    Closed,
}

/// A protocol line missing an expected structural separator.
///
/// The offending line is dropped and dispatch continues with the next one.
#[derive(Debug, Error)]
pub enum ParseError {
    /// An origin prefix with no command after it.
    #[error("origin prefix without a command: {0:?}")]
    OriginOnly(String),
}
