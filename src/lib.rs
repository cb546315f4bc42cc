//! # ftlwire
//!
//! Client for the Pi-hole FTL daemon's Unix socket API:
//! - One-shot connection per command, released on every exit path
//! - Tagged binary response decoding with explicit END handling
//! - Typed results for all eleven commands
//! - Parallel collection with per-group failure isolation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Collector                               │
//! │             (one thread per command group)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     FtlClient                                │
//! │          (command literal → connection → decoder)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │ Connection  │          │   Decoders   │
//!   │ (UnixStream)│─────────▶│ (WireReader) │
//!   └─────────────┘          └──────┬───────┘
//!                                   │
//!                                   ▼
//!                           ┌──────────────┐
//!                           │    Model     │
//!                           └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod protocol;
pub mod network;
pub mod client;
pub mod collector;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FtlError, Result};
pub use config::Config;
pub use client::FtlClient;
pub use collector::{Collector, Snapshot};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ftlwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
