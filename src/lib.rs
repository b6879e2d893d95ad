//! # respkv - A Minimal RESP-Style Key-Value Server
//!
//! respkv keeps string keys and string values in memory and serves them over a
//! small RESP-style protocol: a client sends one command as an array of bulk
//! strings and gets back exactly one typed reply.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                            respkv                             │
//! │                                                               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐        │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │        │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │        │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘        │
//! │                            │                  │               │
//! │                            ▼                  ▼               │
//! │                     ┌─────────────┐    ┌─────────────┐        │
//! │                     │ Frame Parser│    │    Store    │        │
//! │                     │ Reply Codec │    │  (RwLock)   │        │
//! │                     └─────────────┘    └─────────────┘        │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use respkv::commands::CommandHandler;
//! use respkv::config::ConnectionConfig;
//! use respkv::connection::{handle_connection, ConnectionStats};
//! use respkv::storage::Store;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = Arc::new(Store::new());
//!     let stats = Arc::new(ConnectionStats::new());
//!     let listener = TcpListener::bind("127.0.0.1:5000").await.unwrap();
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let handler = CommandHandler::new(Arc::clone(&storage));
//!         let stats = Arc::clone(&stats);
//!
//!         tokio::spawn(handle_connection(stream, addr, handler, stats, ConnectionConfig::default()));
//!     }
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `PING [message]`
//! - `SET key value [NX|XX]`
//! - `GET key`
//! - `DEL key [key ...]`
//! - `EXISTS key [key ...]`
//! - `INCR key` / `INCRBY key increment`
//! - `DECR key` / `DECRBY key decrement`
//!
//! Integer values are stored as decimal text and must fit in an `i64`.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Frame parser and reply encoding
//! - [`storage`]: Thread-safe in-memory store
//! - [`commands`]: Command dispatch and per-command rules
//! - [`connection`]: Client connection management
//! - [`config`]: Command-line configuration

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use config::{ConnectionConfig, ConnectionMode, ServerConfig};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{Command, FrameParser, FramingMode, ParseError, Reply};
pub use storage::Store;

/// The default port respkv listens on
pub const DEFAULT_PORT: u16 = 5000;

/// The default host respkv binds to
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Version of respkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
