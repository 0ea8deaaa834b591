//! Connection parameters and tunables for the RCON client.

use crate::rcon::{DEFAULT_PORT, MAX_LEN_CLIENTBOUND};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// Tunables for an RCON session.
///
/// Every field has a default, so a partial configuration deserializes fine:
///
/// ```
/// use mc_rcon::config::RconConfig;
/// use std::time::Duration;
///
/// let config = RconConfig::default().with_io_timeout(Duration::from_secs(1));
/// assert_eq!(config.io_timeout, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RconConfig {
    /// How long to wait for the TCP connection to be established.
    #[serde(with = "millis", rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,

    /// Bound for every individual read and write on the socket.
    ///
    /// RCON servers never mark the last packet of a response, so a read that
    /// sees no data within this window ends the response. Keep it short.
    #[serde(with = "millis", rename = "io_timeout_ms")]
    pub io_timeout: Duration,

    /// Largest response body, in bytes, that a frame may declare. Minecraft
    /// splits long output into bodies of exactly 4096 bytes. Frames declaring
    /// a larger body are recovered by reading at most this many bytes.
    pub max_packet_size: usize,

    /// The first request id handed out on a new connection.
    pub first_request_id: i32,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_millis(2500),
            max_packet_size: MAX_LEN_CLIENTBOUND,
            first_request_id: 1,
        }
    }
}

impl RconConfig {
    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-operation read/write timeout.
    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Set the response body ceiling.
    #[must_use]
    pub fn with_max_packet_size(mut self, size: usize) -> Self {
        self.max_packet_size = size;
        self
    }

    /// Set the first request id. Values below 1 are clamped to 1, since `-1`
    /// signals a failed login and `0` is used for recovered frames.
    #[must_use]
    pub fn with_first_request_id(mut self, id: i32) -> Self {
        self.first_request_id = id.max(1);
        self
    }
}

/// Where to find a server and how to log in to it.
///
/// This is the shape in which a host application usually stores servers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Hostname or IP address of the server.
    pub hostname: String,
    /// RCON port, `25575` unless configured otherwise.
    #[serde(default = "default_port")]
    pub port: u16,
    /// RCON password.
    pub password: String,
}

impl ConnectionParams {
    /// Create connection parameters.
    pub fn new(hostname: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            password: password.into(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(dur: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(dur.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionParams, RconConfig};
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = RconConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.io_timeout, Duration::from_millis(2500));
        assert_eq!(config.max_packet_size, 4096);
        assert_eq!(config.first_request_id, 1);
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: RconConfig =
            serde_json::from_str(r#"{ "io_timeout_ms": 250, "first_request_id": 7 }"#).unwrap();

        assert_eq!(config.io_timeout, Duration::from_millis(250));
        assert_eq!(config.first_request_id, 7);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_first_request_id_clamped() {
        assert_eq!(RconConfig::default().with_first_request_id(-1).first_request_id, 1);
        assert_eq!(RconConfig::default().with_first_request_id(0).first_request_id, 1);
    }

    #[test]
    fn test_params_default_port_and_redaction() {
        let params: ConnectionParams =
            serde_json::from_str(r#"{ "hostname": "mc.example.org", "password": "hunter2" }"#)
                .unwrap();

        assert_eq!(params.port, 25575);
        let debug = format!("{params:?}");
        assert!(debug.contains("mc.example.org"));
        assert!(!debug.contains("hunter2"));
    }
}
