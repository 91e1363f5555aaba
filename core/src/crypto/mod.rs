pub mod types;
pub mod kdf;
pub mod nonce;
pub mod aead;
pub mod ctr_hmac;
pub mod segment;

pub use types::*;
pub use kdf::*;
pub use nonce::*;
pub use aead::*;
pub use ctr_hmac::*;
pub use segment::*;
