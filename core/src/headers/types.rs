//! headers/types.rs
//! Stream header struct and header-level errors.
//!
//! Layout (big picture):
//! - byte 0: version byte, equal to the cipher suite id
//! - salt: `suite.salt_len()` bytes, random per stream
//! - nonce prefix: 7 bytes, derived from (key, salt, associated data)
//!
//! The header length is fixed per suite and known before key derivation.

use std::fmt;

use crate::constants::NONCE_PREFIX_LEN;
use crate::params::CipherSuite;
use crate::utils::{enum_name_or_hex, fmt_bytes};

/// Parsed stream header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub suite: CipherSuite,
    pub salt: Vec<u8>,
    pub nonce_prefix: [u8; NONCE_PREFIX_LEN],
}

impl StreamHeader {
    /// Build a header, checking the salt length against the suite.
    pub fn new(
        suite: CipherSuite,
        salt: &[u8],
        nonce_prefix: [u8; NONCE_PREFIX_LEN],
    ) -> Result<Self, HeaderError> {
        if salt.len() != suite.salt_len() {
            return Err(HeaderError::InvalidSaltLen {
                have: salt.len(),
                need: suite.salt_len(),
            });
        }
        Ok(Self { suite, salt: salt.to_vec(), nonce_prefix })
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.suite.id()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.suite.header_len()
    }

    pub fn summary(&self) -> String {
        format!(
            "version=0x{:02x} suite={} salt={} nonce_prefix={}",
            self.version(),
            self.suite,
            fmt_bytes(&self.salt),
            fmt_bytes(&self.nonce_prefix)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Fewer bytes than the fixed header length.
    BufferTooShort { have: usize, need: usize },

    /// Version byte is not a registered cipher suite.
    UnknownVersion { raw: u8 },

    /// Version byte names a suite other than the one configured for the stream.
    SuiteMismatch { have: CipherSuite, expected: CipherSuite },

    /// Salt length does not match the suite.
    InvalidSaltLen { have: usize, need: usize },

    /// Header requested from an accumulator that has not seen enough bytes.
    Incomplete { have: usize, need: usize },
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use HeaderError::*;
        match self {
            BufferTooShort { have, need } =>
                write!(f, "header buffer too short: {} < {}", have, need),
            UnknownVersion { raw } =>
                write!(f, "unknown header version: {}", enum_name_or_hex::<CipherSuite>(*raw)),
            SuiteMismatch { have, expected } =>
                write!(f, "header suite {} does not match configured suite {}", have, expected),
            InvalidSaltLen { have, need } =>
                write!(f, "invalid salt length: {} (expected {})", have, need),
            Incomplete { have, need } =>
                write!(f, "header incomplete: {} of {} bytes buffered", have, need),
        }
    }
}

impl std::error::Error for HeaderError {}
