//! Stub daemon
//!
//! A Unix-socket server that answers command literals with canned bytes, the
//! way the FTL daemon answers its API socket. Used to exercise the client
//! end to end without a Pi-hole install.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{FtlError, Result};
use crate::protocol::Command;

/// Largest command literal the stub will read in one go
const MAX_COMMAND_LEN: usize = 512;

/// Canned responses, keyed by command literal
pub struct StubDaemon {
    socket_path: PathBuf,
    responses: HashMap<String, Bytes>,
}

impl StubDaemon {
    /// Create a stub that will listen on `socket_path`
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            responses: HashMap::new(),
        }
    }

    /// Answer `command` with `response`
    pub fn respond(self, command: Command, response: impl Into<Bytes>) -> Self {
        self.respond_literal(command.literal(), response)
    }

    /// Answer an arbitrary literal, known to the client or not
    pub fn respond_literal(mut self, literal: &str, response: impl Into<Bytes>) -> Self {
        self.responses.insert(literal.to_string(), response.into());
        self
    }

    /// Bind the socket and start accepting on a background thread
    pub fn spawn(self) -> Result<StubHandle> {
        let listener = UnixListener::bind(&self.socket_path)?;
        let state = Arc::new(SharedState::default());
        let responses = Arc::new(self.responses);

        let acceptor = {
            let state = Arc::clone(&state);
            thread::spawn(move || accept_loop(listener, responses, state))
        };

        tracing::debug!("Stub daemon listening on {}", self.socket_path.display());

        Ok(StubHandle {
            socket_path: self.socket_path,
            state,
            acceptor: Some(acceptor),
        })
    }
}

#[derive(Default)]
struct SharedState {
    /// Literals received, in arrival order
    requests: Mutex<Vec<String>>,

    /// Connections the client has closed
    closed: AtomicUsize,

    shutdown: AtomicBool,
}

/// Running stub; stops and removes its socket when dropped
pub struct StubHandle {
    socket_path: PathBuf,
    state: Arc<SharedState>,
    acceptor: Option<JoinHandle<()>>,
}

impl StubHandle {
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Literals received so far
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }

    /// Number of connections the client has hung up
    pub fn closed_connections(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Block until at least `count` connections were closed by the client
    pub fn wait_for_closed(&self, count: usize, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while self.closed_connections() < count {
            if Instant::now() >= deadline {
                return Err(FtlError::Protocol(format!(
                    "only {} of {} connections closed",
                    self.closed_connections(),
                    count
                )));
            }
            thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }

    /// Stop accepting and wait for the acceptor thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(acceptor) = self.acceptor.take() else {
            return;
        };

        self.state.shutdown.store(true, Ordering::SeqCst);
        // Wake the blocking accept
        let _ = UnixStream::connect(&self.socket_path);
        let _ = acceptor.join();
        let _ = std::fs::remove_file(&self.socket_path);

        tracing::debug!("Stub daemon on {} stopped", self.socket_path.display());
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(
    listener: UnixListener,
    responses: Arc<HashMap<String, Bytes>>,
    state: Arc<SharedState>,
) {
    for stream in listener.incoming() {
        if state.shutdown.load(Ordering::SeqCst) {
            break;
        }

        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Stub daemon accept failed: {}", e);
                continue;
            }
        };

        let responses = Arc::clone(&responses);
        let state = Arc::clone(&state);
        thread::spawn(move || {
            if let Err(e) = serve(stream, &responses, &state) {
                tracing::debug!("Stub daemon connection error: {}", e);
            }
        });
    }
}

/// Answer one connection, then wait for the client to hang up
fn serve(
    mut stream: UnixStream,
    responses: &HashMap<String, Bytes>,
    state: &SharedState,
) -> std::io::Result<()> {
    // The literal carries no delimiter; the client writes it in one call.
    let mut buf = [0u8; MAX_COMMAND_LEN];
    let n = stream.read(&mut buf)?;
    let literal = String::from_utf8_lossy(&buf[..n]).into_owned();

    tracing::trace!("Stub daemon received {:?}", literal);

    let response = responses.get(&literal);
    state.requests.lock().push(literal);

    if let Some(response) = response {
        stream.write_all(response)?;
        stream.flush()?;
    }

    // Drain until the client closes its end
    let mut sink = [0u8; 64];
    loop {
        match stream.read(&mut sink) {
            Ok(0) => break,
            Ok(_) => continue,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    state.closed.fetch_add(1, Ordering::SeqCst);

    Ok(())
}
