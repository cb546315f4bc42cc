//! Protocol Module
//!
//! The FTL daemon's socket API: ASCII command literals in, tagged binary
//! values out.
//!
//! ## Request Format
//! ```text
//! ┌─────────────────────────────────────┐
//! │ ">" command [" " argument]          │   (no trailing newline)
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Response Format
//! ```text
//! ┌──────────┬──────────┬─────┬──────────┬──────────┐
//! │ Tag (1)  │ Payload  │ ... │ Tag (1)  │ Payload  │   [END (0xC1)]
//! └──────────┴──────────┴─────┴──────────┴──────────┘
//! ```
//!
//! The response has no length header and no overall framing; the shape of
//! each command's answer is known only to its decoder.

mod codec;
mod command;
mod response;

pub use codec::{required, tag, write_command, FrameBuilder, WireReader, MAX_STRING_LEN};
pub use command::Command;
pub use response::{
    decode_client_names, decode_clients_over_time, decode_db_stats, decode_forward_destinations,
    decode_over_time, decode_query_types, decode_stats, decode_top_clients, decode_top_queries,
};
