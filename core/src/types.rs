use std::fmt;
use std::io;

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::headers::HeaderError;

/// Where an authentication failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    /// The header's nonce prefix does not match the one derived from the key,
    /// the salt and the associated data.
    Header,
    /// The tag of the segment with this index did not verify.
    Segment(u64),
}

impl fmt::Display for AuthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScope::Header => write!(f, "stream header"),
            AuthScope::Segment(i) => write!(f, "segment {}", i),
        }
    }
}

/// Unified stream error covering key material, header, authentication,
/// truncation, lifecycle misuse and I/O.
/// - `From<T>` impls enable `?` across the crate.
/// - Every variant is fatal to the writer/reader that produced it.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Master key or salt length does not match the configured suite.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Segment size, tag length or suite selection rejected.
    #[error("invalid stream parameters: {0}")]
    InvalidParameters(String),

    /// Header bytes absent, short, or carrying an unknown version.
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] HeaderError),

    /// Tag mismatch. Bytes released before this point remain valid.
    #[error("authentication failure at {0}")]
    AuthenticationFailure(AuthScope),

    /// End of input reached without a final-flagged segment.
    #[error("truncated stream: no final segment at or after segment {segment_index}")]
    TruncatedStream { segment_index: u64 },

    /// Segment index would no longer fit in the nonce.
    #[error("segment limit exceeded: at most {max} segments per stream")]
    SegmentLimitExceeded { max: u64 },

    /// `write` called on a closed writer.
    #[error("stream closed: write after close")]
    StreamClosed,

    /// `close` called twice.
    #[error("stream already closed")]
    AlreadyClosed,

    /// Operation attempted after a fatal error; only the state may be inspected.
    #[error("stream terminated by an earlier fatal error")]
    Terminated,

    /// Primitive-level failure (cipher construction, keystream, KDF expand).
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// I/O error from a source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    /// True for errors that indicate forged, corrupted or cut ciphertext.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            StreamError::AuthenticationFailure(_) | StreamError::TruncatedStream { .. }
        )
    }
}

/// Map stream errors onto `io::Error` for the `Read`/`Write` adapters.
impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io(inner) => inner,
            other => {
                let kind = if other.is_integrity_failure()
                    || matches!(other, StreamError::MalformedHeader(_))
                {
                    io::ErrorKind::InvalidData
                } else {
                    io::ErrorKind::Other
                };
                io::Error::new(kind, other)
            }
        }
    }
}
