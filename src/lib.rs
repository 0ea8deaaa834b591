//! An asynchronous client for the [RCON](https://wiki.vg/RCON) protocol, used to
//! remotely administer minecraft (and other Source RCON compatible) servers.
//!
//! ```no_run
//! use mc_rcon::rcon;
//!
//! #[tokio::main]
//! async fn main() -> mc_rcon::errors::Result<()> {
//!     let mut client = rcon::connect("localhost", 25575, "password").await?;
//!     println!("{}", client.execute("list").await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! The crate logs through [`tracing`] and never installs a subscriber itself.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]

pub mod config;
pub mod errors;
pub mod rcon;
mod socket;

pub use config::{ConnectionParams, RconConfig};
pub use errors::{RconError, Result};
pub use rcon::RconClient;
