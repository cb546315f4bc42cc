//! Network Module
//!
//! Unix socket transport.
//!
//! ## Architecture
//! - One fresh connection per command, released on every exit path
//! - No pooling, no reconnection
//! - A stub daemon for driving the client without a real one (`stub` feature)

mod connection;
#[cfg(feature = "stub")]
mod server;

pub use connection::{Connection, ResponseReader};
#[cfg(feature = "stub")]
pub use server::{StubDaemon, StubHandle};
