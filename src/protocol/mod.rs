//! Wire Protocol
//!
//! Request framing and reply encoding for the RESP-style protocol.
//!
//! ## Modules
//!
//! - `types`: The `Reply` enum and its wire encoding
//! - `parser`: Decoder for incoming command frames
//!
//! ## Example
//!
//! ```
//! use respkv::protocol::{parse_frame, Reply};
//!
//! // Decoding a request
//! let data = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
//! let (command, consumed) = parse_frame(data).unwrap().unwrap();
//! assert_eq!(command.name, "GET");
//! assert_eq!(consumed, data.len());
//!
//! // Encoding a reply
//! let bytes = Reply::bulk_string("Ariz").serialize();
//! assert_eq!(bytes, b"$4\r\nAriz\r\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_frame, Command, FrameParser, FramingMode, ParseError, ParseResult};
pub use types::Reply;
