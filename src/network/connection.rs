//! Connection Handler
//!
//! One-shot request/response over the daemon's Unix socket.

use std::io::{BufReader, BufWriter};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::error::{FtlError, Result};
use crate::protocol::{write_command, Command, WireReader};

/// Stream type handed to response decoders
pub type ResponseReader = WireReader<BufReader<UnixStream>>;

/// A single dialed connection, owned by exactly one command call
///
/// The socket is shut down by [`Connection::close`] or, on early returns,
/// released when the value is dropped. Ownership makes the release happen
/// once.
pub struct Connection {
    /// Socket reader (buffered so decoders can peek for a clean close)
    reader: ResponseReader,

    /// Socket writer
    writer: BufWriter<UnixStream>,

    /// Socket path for logging
    socket_path: PathBuf,
}

impl Connection {
    /// Dial the configured socket and apply its timeouts
    pub fn open(config: &Config) -> Result<Self> {
        tracing::debug!("Connecting to {}", config.socket_path.display());

        let stream = UnixStream::connect(&config.socket_path).map_err(|source| FtlError::Connect {
            path: config.socket_path.clone(),
            source,
        })?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut connection = Self {
            reader: WireReader::new(BufReader::new(read_stream)),
            writer: BufWriter::new(write_stream),
            socket_path: config.socket_path.clone(),
        };
        connection.set_timeouts(config.read_timeout(), config.write_timeout())?;

        Ok(connection)
    }

    /// Configure connection timeouts (`None` blocks forever)
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        self.reader.get_ref().get_ref().set_read_timeout(read)?;
        self.writer.get_ref().set_write_timeout(write)?;
        Ok(())
    }

    /// Write a command literal
    pub fn send(&mut self, command: Command) -> Result<()> {
        tracing::trace!("Sending {} to {}", command, self.socket_path.display());
        write_command(&mut self.writer, command)
    }

    /// Send `command`, decode its response and close the connection
    ///
    /// The connection is consumed: it is released whether the send, the
    /// decode or nothing fails.
    pub fn request<T, F>(mut self, command: Command, decode: F) -> Result<T>
    where
        F: FnOnce(&mut ResponseReader) -> Result<T>,
    {
        self.send(command)?;

        let result = decode(&mut self.reader);

        if let Err(ref e) = result {
            tracing::debug!("Decoding {} failed: {}", command, e);
        }

        self.close();
        result
    }

    /// Shut the socket down in both directions
    pub fn close(self) {
        let stream = self.reader.get_ref().get_ref();
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => tracing::trace!("Closed connection to {}", self.socket_path.display()),
            // Peer hung up first
            Err(ref e) if e.kind() == std::io::ErrorKind::NotConnected => {}
            Err(e) => tracing::warn!(
                "Error closing connection to {}: {}",
                self.socket_path.display(),
                e
            ),
        }
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &std::path::Path {
        &self.socket_path
    }
}
