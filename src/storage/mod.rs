//! Storage Module
//!
//! In-memory string-to-string store shared by all connections.
//!
//! ## Features
//!
//! - **Single lock**: one `RwLock` around the map; compound commands run under one write guard
//! - **Atomic helpers**: conditional SET and integer increment happen in a single critical section
//! - **Owned, not global**: the server creates one `Store` and hands out `Arc` clones
//!
//! ## Example
//!
//! ```
//! use respkv::storage::{SetCondition, Store};
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new());
//!
//! store.set("name", "Ariz");
//! assert!(!store.set_with_condition("name", "Bob", SetCondition::IfAbsent));
//! assert_eq!(store.get("name"), Some("Ariz".to_string()));
//! ```

pub mod engine;

// Re-export commonly used types
pub use engine::{
    is_integer_literal, parse_integer, SetCondition, StorageStats, Store, StoreError,
};
