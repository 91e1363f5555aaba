//! stream/core.rs
//! One-shot entry points for callers that do not need segment-level control.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::crypto::MasterKey;
use crate::params::StreamParams;
use crate::stream::decrypt::DecryptingReader;
use crate::stream::encrypt::EncryptingWriter;
use crate::stream::io::{open_input, open_output, InputSource, OutputSink};
use crate::telemetry::TelemetrySnapshot;
use crate::types::StreamError;

/// Encrypt a whole buffer.
pub fn encrypt_to_vec(
    params: StreamParams,
    master_key: &MasterKey,
    associated_data: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, StreamError> {
    let mut writer = EncryptingWriter::new(params, master_key, associated_data)?;
    let mut out = Vec::with_capacity(writer.expected_ciphertext_len(plaintext.len() as u64) as usize);
    writer.write(plaintext)?;
    out.extend_from_slice(&writer.close()?);
    Ok(out)
}

/// Decrypt a whole buffer. Fails unless every segment verifies and the
/// final segment is present.
pub fn decrypt_to_vec(
    params: StreamParams,
    master_key: &MasterKey,
    associated_data: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, StreamError> {
    let mut reader = DecryptingReader::new(params, master_key, associated_data, ciphertext)?;
    let mut out = Vec::with_capacity(ciphertext.len());
    while let Some(pt) = reader.read_segment()? {
        out.extend_from_slice(&pt);
    }
    Ok(out)
}

/// Outcome of a source-to-sink run. `output` is set for `OutputSink::Memory`.
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    pub telemetry: TelemetrySnapshot,
    pub output: Option<Vec<u8>>,
}

/// 🔐 Encrypt from `input` to `output`, one segment of plaintext at a time.
pub fn encrypt_stream(
    input: InputSource,
    output: OutputSink,
    params: StreamParams,
    master_key: &MasterKey,
    associated_data: &[u8],
) -> Result<StreamOutcome, StreamError> {
    let mut reader = open_input(input)?;
    let mut sink = open_output(output)?;
    let mut writer = EncryptingWriter::new(params, master_key, associated_data)?;

    let mut chunk = vec![0u8; params.segment_size()];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write(&chunk[..n])?;
        sink.write_all(&writer.take_output())?;
    }
    sink.write_all(&writer.close()?)?;
    sink.flush()?;

    let telemetry = writer.telemetry();
    debug!(bytes = telemetry.bytes_ciphertext, "encrypt_stream done");
    Ok(StreamOutcome { telemetry, output: sink.into_memory() })
}

/// 🔓 Decrypt from `input` to `output`. Plaintext reaches the sink segment by
/// segment, so on failure the sink holds the verified prefix.
pub fn decrypt_stream(
    input: InputSource,
    output: OutputSink,
    params: StreamParams,
    master_key: &MasterKey,
    associated_data: &[u8],
) -> Result<StreamOutcome, StreamError> {
    let source = open_input(input)?;
    let mut sink = open_output(output)?;
    let mut reader = DecryptingReader::new(params, master_key, associated_data, source)?;

    while let Some(pt) = reader.read_segment()? {
        sink.write_all(&pt)?;
    }
    sink.flush()?;

    let telemetry = reader.telemetry();
    debug!(bytes = telemetry.bytes_plaintext, "decrypt_stream done");
    Ok(StreamOutcome { telemetry, output: sink.into_memory() })
}
