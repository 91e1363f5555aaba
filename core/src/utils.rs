use std::fmt;
use std::io::{ErrorKind, Read};

use num_enum::TryFromPrimitive;

use crate::types::StreamError;

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Hex for diagnostics; long values are shortened so keys never end up whole in logs.
pub fn fmt_bytes(b: &[u8]) -> String {
    if b.len() <= 16 {
        format!("0x{}", hex::encode(b))
    } else {
        format!("0x{}..({} bytes)", hex::encode(&b[..8]), b.len())
    }
}

/// Fill `buf` from `r` until it is full or the source reports EOF.
/// Returns the number of bytes read; short count means EOF.
pub fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize, StreamError> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Io(e)),
        }
    }
    Ok(off)
}
