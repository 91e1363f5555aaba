//! headers/mod.rs
//! Stream header: version byte, per-stream salt, nonce prefix.
//!
//! Notes:
//! - Fixed length per suite (24 bytes for 128-bit suites, 40 for 256-bit).
//! - The header is authenticated by every segment: it is the associated data
//!   of the AEAD suites and the first MAC input of the counter-mode suites.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
