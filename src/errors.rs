//! All the errors defined by this crate.

use std::io::{self, ErrorKind as IoErrorKind};
use thiserror::Error;

/// [`Result`](std::result::Result) alias for [`RconError`].
pub type Result<T> = std::result::Result<T, RconError>;

/// An error from the RCON protocol that prevents a packet from being framed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RconProtocolError {
    /// Payload too long.
    ///
    /// | Direction   | Payload Length limit |
    /// | ----------- | -------------------- |
    /// | Serverbound | 1446                 |
    /// | Clientbound | 4096                 |
    #[error("payload too long ({len} bytes, limit is {limit})")]
    PayloadTooLong {
        /// Length of the rejected payload in bytes.
        len: usize,
        /// The limit that was exceeded.
        limit: usize,
    },

    /// The payload contained a NUL byte, which would terminate it early on the wire.
    #[error("payload contains a nul byte")]
    NulInPayload,
}

impl From<RconProtocolError> for io::Error {
    fn from(err: RconProtocolError) -> Self {
        io::Error::new(IoErrorKind::InvalidData, err)
    }
}

/// Coarse classification of an [`RconError`].
///
/// Hosts that show errors to end users can match on this to decide how much
/// detail to reveal, without depending on the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The socket could not be opened, or broke while in use.
    Connection,
    /// The server rejected the password.
    Authentication,
    /// A request could not be framed.
    Protocol,
}

/// Error returned by every fallible operation of the RCON client.
#[derive(Error, Debug)]
pub enum RconError {
    /// Network failure: refused connection, reset, timeout or a closed socket.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// Authentication failed. You probably entered the wrong RCON password.
    #[error("authentication failed: wrong password")]
    Authentication,

    /// The request could not be sent because it violates the protocol.
    #[error("protocol error: {0}")]
    Protocol(#[from] RconProtocolError),
}

impl RconError {
    /// Returns the [`ErrorKind`] of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RconError::Connection(_) => ErrorKind::Connection,
            RconError::Authentication => ErrorKind::Authentication,
            RconError::Protocol(_) => ErrorKind::Protocol,
        }
    }
}

/// `TimedOut` error for an operation that did not finish in time.
pub(crate) fn timed_out(what: &str) -> io::Error {
    io::Error::new(IoErrorKind::TimedOut, format!("{what} timed out"))
}

/// `ConnectionAborted` error for a socket the server closed between packets.
pub(crate) fn closed_by_server() -> io::Error {
    io::Error::new(IoErrorKind::ConnectionAborted, "connection closed by server")
}

impl From<RconError> for io::Error {
    fn from(err: RconError) -> Self {
        match err {
            RconError::Connection(inner) => inner,
            RconError::Authentication => io::Error::new(IoErrorKind::PermissionDenied, err),
            RconError::Protocol(inner) => inner.into(),
        }
    }
}
