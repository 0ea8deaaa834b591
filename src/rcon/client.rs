//! Implementation of the [RCON](https://wiki.vg/RCON) protocol.

use super::packet::{RconPacket, RconPacketType, Response, Responses};
use crate::{
    config::{ConnectionParams, RconConfig},
    errors::{timed_out, RconError, Result},
    socket::ReadRconPackets,
};
use bytes::BytesMut;
use std::io::{self, ErrorKind};
use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};
use tracing::{debug, trace, warn};

/// A connection to an RCON server that has not logged in yet.
///
/// Most callers want [`RconClient::connect`], which opens the connection and
/// logs in in one go. Use this type to keep the two steps apart.
///
/// # Examples
///
/// ```no_run
/// use mc_rcon::{config::RconConfig, rcon::RconConnection};
///
/// #[tokio::main]
/// async fn main() -> mc_rcon::errors::Result<()> {
///     let connection = RconConnection::open("localhost", 25575, &RconConfig::default()).await?;
///     let mut client = connection.login("password").await?;
///
///     println!("{}", client.execute("list").await?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RconConnection {
    session: Session,
}

/// An authenticated RCON session.
///
/// Commands run one at a time: each call to [`execute`](RconClient::execute)
/// sends the command and drains the whole response before returning. The
/// socket is closed when the client is dropped.
///
/// # Examples
///
/// ```no_run
/// use mc_rcon::rcon::RconClient;
///
/// #[tokio::main]
/// async fn main() -> mc_rcon::errors::Result<()> {
///     let mut client = RconClient::connect("localhost", 25575, "password").await?;
///
///     let output = client.execute("time set day").await?;
///     println!("{output}");
///
///     Ok(())
/// }
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct RconClient {
    session: Session,
}

#[derive(Debug)]
struct Session {
    socket: TcpStream,
    config: RconConfig,
    next_id: i32,
}

impl RconConnection {
    /// Open a TCP connection to the given host and port.
    ///
    /// # Errors
    /// Returns [`RconError::Connection`] if the port is 0, the server cannot be
    /// reached, or `config.connect_timeout` passes first.
    pub async fn open(host: &str, port: u16, config: &RconConfig) -> Result<Self> {
        if port == 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "port must be in 1..=65535").into());
        }

        debug!(host, port, "connecting to rcon server");

        let socket = timeout(config.connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| timed_out("connect"))??;

        Ok(Self {
            session: Session {
                socket,
                config: config.clone(),
                next_id: config.first_request_id.max(1),
            },
        })
    }

    /// Log in with the RCON password.
    ///
    /// The connection is consumed: on success it becomes an [`RconClient`], on
    /// failure it is closed.
    ///
    /// # Errors
    /// Returns [`RconError::Authentication`] if the server rejects the password
    /// (or stays silent), and [`RconError::Connection`] on network errors,
    /// including a server that closes the connection without replying.
    pub async fn login(mut self, password: &str) -> Result<RconClient> {
        let request_id = self.session.write(RconPacketType::Login, password).await?;
        let responses = self.session.read_all().await?;

        match responses.first().map(|response| response.request_id) {
            Some(id) if id == request_id => {
                debug!(request_id, "rcon login accepted");
                Ok(RconClient {
                    session: self.session,
                })
            }
            Some(id) => {
                debug!(request_id, received = id, "rcon login rejected");
                Err(RconError::Authentication)
            }
            None => {
                debug!(request_id, "no reply to rcon login");
                Err(RconError::Authentication)
            }
        }
    }
}

impl RconClient {
    /// Connect to the given host and port and log in, using the default [`RconConfig`].
    ///
    /// # Arguments
    /// * `host` - A string slice that holds the hostname of the server to connect to.
    /// * `port` - The port to connect to.
    /// * `password` - A string slice that holds the RCON password.
    ///
    /// # Errors
    /// Returns [`RconError::Connection`] if there was a network error and
    /// [`RconError::Authentication`] if the password was rejected.
    pub async fn connect(host: &str, port: u16, password: &str) -> Result<Self> {
        Self::connect_with_config(host, port, password, &RconConfig::default()).await
    }

    /// Like [`connect`](RconClient::connect), with explicit timeouts and limits.
    ///
    /// # Errors
    /// See [`connect`](RconClient::connect).
    pub async fn connect_with_config(
        host: &str,
        port: u16,
        password: &str,
        config: &RconConfig,
    ) -> Result<Self> {
        RconConnection::open(host, port, config)
            .await?
            .login(password)
            .await
    }

    /// Connect using parameters stored by a host application.
    ///
    /// # Errors
    /// See [`connect`](RconClient::connect).
    pub async fn from_params(params: &ConnectionParams, config: &RconConfig) -> Result<Self> {
        Self::connect_with_config(&params.hostname, params.port, &params.password, config).await
    }

    /// The configuration this client was created with.
    pub fn config(&self) -> &RconConfig {
        &self.session.config
    }

    /// Run the given command on the server and return its output.
    ///
    /// A command without output returns an empty string.
    ///
    /// # Arguments
    /// * `command` - A string slice that holds the command to run. Must be under 1446 bytes in length.
    ///
    /// # Errors
    /// Returns [`RconError::Connection`] if the socket is closed or a read or write fails,
    /// and [`RconError::Protocol`] if the command cannot be sent.
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        self.execute_raw(command)
            .await
            .map(|response| response.text())
    }

    /// Like [`execute`](RconClient::execute), but returns the whole [`Response`]
    /// record including its request id and packet type.
    ///
    /// # Errors
    /// See [`execute`](RconClient::execute).
    pub async fn execute_raw(&mut self, command: &str) -> Result<Response> {
        let request_id = self.session.write(RconPacketType::RunCommand, command).await?;
        let mut responses = self.session.read_all().await?;

        let response = responses.take(request_id).unwrap_or(Response {
            request_id,
            packet_type: RconPacketType::Response,
            payload: BytesMut::new(),
        });

        for stray in responses.iter() {
            warn!(
                request_id,
                stray_id = stray.request_id,
                len = stray.payload.len(),
                "discarding rcon response for another request"
            );
        }

        debug!(request_id, len = response.payload.len(), "rcon command finished");
        Ok(response)
    }

    /// Disconnect from the server and close the RCON connection.
    ///
    /// # Errors
    /// Returns `Err` if there was an issue closing the connection.
    pub async fn disconnect(mut self) -> Result<()> {
        debug!("disconnecting from rcon server");
        self.session.socket.shutdown().await?;
        Ok(())
    }
}

impl Session {
    fn next_request_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = if id == i32::MAX {
            self.config.first_request_id.max(1)
        } else {
            id + 1
        };

        id
    }

    /// Write a packet to the socket and return its request id.
    async fn write(&mut self, packet_type: RconPacketType, payload: &str) -> Result<i32> {
        let request_id = self.next_request_id();
        let bytes = RconPacket::new(request_id, packet_type, payload)?.bytes();

        trace!(request_id, ?packet_type, len = bytes.len(), "sending rcon packet");

        timeout(self.config.io_timeout, self.socket.write_all(&bytes))
            .await
            .map_err(|_| timed_out("write"))??;

        Ok(request_id)
    }

    /// Read everything the server sends until it goes quiet.
    async fn read_all(&mut self) -> Result<Responses> {
        let responses = self
            .socket
            .read_all(self.config.max_packet_size, self.config.io_timeout)
            .await?;

        Ok(responses)
    }
}
