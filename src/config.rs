//! Server Configuration
//!
//! Command-line options for the `respkv` binary, plus the per-connection
//! settings derived from them.

use crate::protocol::FramingMode;
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Default read buffer limit per connection (64 KB)
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// What happens to a connection after its first reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConnectionMode {
    /// Serve exactly one command, then close.
    #[default]
    Single,
    /// Keep serving commands until the client disconnects.
    Persistent,
}

/// Settings applied to every accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub mode: ConnectionMode,
    pub framing: FramingMode,
    /// `None` waits forever for the rest of a frame
    pub read_timeout: Option<Duration>,
    pub max_frame_bytes: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Single,
            framing: FramingMode::Lenient,
            read_timeout: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// respkv server
#[derive(Parser, Debug, Clone)]
#[command(name = "respkv")]
#[command(about = "Minimal in-memory key-value server speaking a RESP-style protocol")]
#[command(version)]
pub struct ServerConfig {
    /// Host to bind to
    #[arg(long, default_value = crate::DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = crate::DEFAULT_PORT)]
    pub port: u16,

    /// Close after one command, or keep the connection open
    #[arg(long, value_enum, default_value_t = ConnectionMode::Single)]
    pub mode: ConnectionMode,

    /// Require `*`/`$` header markers and matching bulk lengths
    #[arg(long)]
    pub strict_framing: bool,

    /// Drop a connection that sends nothing for this long (0 disables)
    #[arg(long, default_value_t = 0)]
    pub read_timeout_ms: u64,

    /// Largest amount of unparsed input buffered per connection
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_HOST.to_string(),
            port: crate::DEFAULT_PORT,
            mode: ConnectionMode::Single,
            strict_framing: false,
            read_timeout_ms: 0,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the settings handed to each connection.
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            mode: self.mode,
            framing: if self.strict_framing {
                FramingMode::Strict
            } else {
                FramingMode::Lenient
            },
            read_timeout: (self.read_timeout_ms > 0)
                .then(|| Duration::from_millis(self.read_timeout_ms)),
            max_frame_bytes: self.max_frame_bytes,
        }
    }
}
