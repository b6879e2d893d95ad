//! Command Handler Module
//!
//! This module implements the command processing layer.
//! It receives decoded commands, executes them against the store,
//! and returns the reply to encode.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Frame Parser   │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `PING`
//! - `SET` (with `NX` / `XX`), `GET`, `DEL`, `EXISTS`
//! - `INCR`, `INCRBY`, `DECR`, `DECRBY`

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
