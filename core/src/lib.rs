//! streaming-aead
//!
//! Segmented streaming authenticated encryption.
//! Bounded memory, per-segment tags, random-access decryption.
//! No I/O of its own beyond the thin `std::io` adapters in `stream::io`.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod params;

// Building blocks
pub mod headers;
pub mod crypto;
pub mod telemetry;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::MasterKey;
    pub use crate::params::{preset_by_name, CipherSuite, Construction, StreamParams};
    pub use crate::stream::{
        decrypt_to_vec, encrypt_to_vec, DecryptingReader, DecryptingStream, EncryptingStream,
        EncryptingWriter, ReaderState, WriterState,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{AuthScope, StreamError};
}
