//! stream/mod.rs
//! Segmented streaming engine.
//!
//! - `encrypt`: `EncryptingWriter`, plaintext to header + sealed segments
//! - `decrypt`: `DecryptingReader`, verified plaintext with seek/range reads
//! - `layout`: offset arithmetic shared by both
//! - `io` / `core`: `std::io` adapters and one-shot helpers

pub mod layout;
pub mod encrypt;
pub mod decrypt;
pub mod io;
pub mod core;

pub use layout::*;
pub use encrypt::*;
pub use decrypt::*;
pub use io::*;
pub use self::core::*;
