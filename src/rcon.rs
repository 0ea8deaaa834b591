//! Enables remote command execution for minecraft servers.
//! See the documentation for [`RconClient`] for more information.

mod client;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod packet;
mod shared;

pub use client::{RconClient, RconConnection};
pub use packet::{RconPacket, RconPacketType, Response, Responses};
pub use shared::SharedRconClient;

use crate::errors::Result;

/// Default RCON port of a minecraft server.
pub const DEFAULT_PORT: u16 = 25575;

pub(crate) const MAX_LEN_CLIENTBOUND: usize = 4096;
pub(crate) const MAX_LEN_SERVERBOUND: usize = 1446;

/// Connect to an RCON server and log in with the default configuration.
///
/// Shorthand for [`RconClient::connect`].
///
/// # Errors
/// Returns [`RconError::Connection`](crate::errors::RconError::Connection) if the server
/// cannot be reached and [`RconError::Authentication`](crate::errors::RconError::Authentication)
/// if the password is rejected.
pub async fn connect(host: &str, port: u16, password: &str) -> Result<RconClient> {
    RconClient::connect(host, port, password).await
}
