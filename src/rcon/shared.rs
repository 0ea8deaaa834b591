use super::{RconClient, Response};
use crate::errors::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A cloneable handle to one [`RconClient`] for concurrent callers.
///
/// The protocol cannot tell which packets belong to which command once more
/// than one is in flight, so the lock is held from sending a command until its
/// response has been drained.
#[derive(Debug, Clone)]
pub struct SharedRconClient {
    inner: Arc<Mutex<RconClient>>,
}

impl SharedRconClient {
    /// Wrap a connected client.
    pub fn new(client: RconClient) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// See [`RconClient::execute`].
    ///
    /// # Errors
    /// See [`RconClient::execute`].
    pub async fn execute(&self, command: &str) -> Result<String> {
        self.inner.lock().await.execute(command).await
    }

    /// See [`RconClient::execute_raw`].
    ///
    /// # Errors
    /// See [`RconClient::execute_raw`].
    pub async fn execute_raw(&self, command: &str) -> Result<Response> {
        self.inner.lock().await.execute_raw(command).await
    }

    /// Close the connection if this is the last handle, otherwise just drop it.
    ///
    /// # Errors
    /// Returns `Err` if there was an issue closing the connection.
    pub async fn disconnect(self) -> Result<()> {
        match Arc::try_unwrap(self.inner) {
            Ok(client) => client.into_inner().disconnect().await,
            Err(_) => Ok(()),
        }
    }
}

impl From<RconClient> for SharedRconClient {
    fn from(client: RconClient) -> Self {
        Self::new(client)
    }
}
