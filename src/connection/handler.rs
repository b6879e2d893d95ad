//! Connection Handler Module
//!
//! This module handles individual client connections.
//! Each accepted socket gets its own handler task that reads a frame,
//! executes it and writes the reply back.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  Read bytes until a full     │
//!    │  frame is buffered           │
//!    │              │               │
//!    │              ▼               │
//!    │  Execute command             │
//!    │              │               │
//!    │              ▼               │
//!    │  Send reply                  │
//!    │              │               │
//!    │              ▼               │
//!    │  Single: stop                │
//!    │  Persistent: loop back       │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Stream shut down, handler task ends
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a stream protocol, so a frame may arrive split across several reads.
//! Incoming bytes accumulate in a `BytesMut` until the parser reports a
//! complete frame.

use crate::commands::CommandHandler;
use crate::config::{ConnectionConfig, ConnectionMode};
use crate::protocol::{Command, FrameParser, ParseError, Reply};
use bytes::{Buf, BytesMut};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, error, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Connections dropped because of a malformed frame
    pub parse_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so the same code serves TCP sockets and in-memory
/// test streams.
pub struct ConnectionHandler<S> {
    /// The client stream; writes are buffered until each reply is flushed
    stream: BufWriter<S>,

    /// Client's address (for logging)
    peer: String,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The command handler (shares the store with every other connection)
    command_handler: CommandHandler,

    parser: FrameParser,

    config: ConnectionConfig,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream
    /// * `peer` - The client's address, used in log fields
    /// * `command_handler` - The command handler for executing commands
    /// * `stats` - Shared connection statistics
    /// * `config` - Per-connection settings
    pub fn new(
        stream: S,
        peer: impl fmt::Display,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
        config: ConnectionConfig,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            peer: peer.to_string(),
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            parser: FrameParser::new(config.framing),
            config,
            stats,
        }
    }

    /// Runs the connection to completion.
    ///
    /// In single mode this serves one command and shuts the stream down.
    /// In persistent mode it serves commands until the client disconnects or
    /// an error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        debug!(client = %self.peer, mode = ?self.config.mode, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => debug!(client = %self.peer, "Connection finished"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    debug!(client = %self.peer, "Client disconnected")
                }
                ConnectionError::IoError(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.peer, "Connection reset by client")
                }
                _ => warn!(client = %self.peer, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The read-execute-respond cycle.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            let command = self.read_command().await?;

            let reply = self.command_handler.execute_command(&command);
            self.stats.command_processed();

            self.send_reply(&reply).await?;

            if self.config.mode == ConnectionMode::Single {
                if !self.buffer.is_empty() {
                    debug!(
                        client = %self.peer,
                        ignored = self.buffer.len(),
                        "Discarding input after the first command"
                    );
                }
                self.stream.shutdown().await?;
                return Ok(());
            }
        }
    }

    /// Reads from the stream until one full frame is buffered and decodes it.
    async fn read_command(&mut self) -> Result<Command, ConnectionError> {
        loop {
            if let Some(command) = self.try_parse_command()? {
                return Ok(command);
            }

            // Need more data - read from the socket
            self.read_more_data().await?;
        }
    }

    /// Attempts to parse a command from the buffer.
    fn try_parse_command(&mut self) -> Result<Option<Command>, ConnectionError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match self.parser.parse(&self.buffer) {
            Ok(Some((command, consumed))) => {
                self.buffer.advance(consumed);
                trace!(
                    client = %self.peer,
                    consumed = consumed,
                    remaining = self.buffer.len(),
                    "Parsed command"
                );
                Ok(Some(command))
            }
            Ok(None) => {
                trace!(
                    client = %self.peer,
                    buffered = self.buffer.len(),
                    "Incomplete command, need more data"
                );
                Ok(None)
            }
            Err(e) => {
                self.stats.parse_error();
                Err(ConnectionError::ParseError(e))
            }
        }
    }

    /// Reads more data from the stream into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= self.config.max_frame_bytes {
            error!(
                client = %self.peer,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        // Ensure we have some capacity
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let read = self.stream.get_mut().read_buf(&mut self.buffer);
        let n = match self.config.read_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| ConnectionError::ReadTimeout)??,
            None => read.await?,
        };

        if n == 0 {
            // Connection closed by client
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial command in buffer
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.peer, bytes = n, "Read data");

        Ok(())
    }

    /// Sends a reply to the client.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        let bytes = reply.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(client = %self.peer, bytes = bytes.len(), "Sent reply");
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed command frame
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    /// Client disconnected before sending anything further
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial command)
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("Buffer size limit exceeded")]
    BufferFull,

    /// No data arrived within the configured read timeout
    #[error("Read timed out")]
    ReadTimeout,
}

/// Handles a client connection.
///
/// This creates a [`ConnectionHandler`] and runs it to completion. Errors are
/// logged and never propagated.
///
/// # Arguments
///
/// * `stream` - The client stream
/// * `peer` - The client's address
/// * `command_handler` - The command handler for executing commands
/// * `stats` - Shared connection statistics
/// * `config` - Per-connection settings
pub async fn handle_connection<S>(
    stream: S,
    peer: impl fmt::Display,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
    config: ConnectionConfig,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, peer, command_handler, stats, config);
    // `run` has already logged the outcome.
    let _ = handler.run().await;
}
