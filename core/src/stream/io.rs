//! stream/io.rs
//! `std::io` adapters over the writer/reader, plus normalized sources and sinks.
//!
//! The adapters only move bytes; all cryptographic decisions stay in
//! `EncryptingWriter` / `DecryptingReader`. Errors cross the `io` boundary
//! through `From<StreamError> for io::Error`.

use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;

use crate::crypto::MasterKey;
use crate::params::StreamParams;
use crate::stream::decrypt::DecryptingReader;
use crate::stream::encrypt::EncryptingWriter;
use crate::telemetry::TelemetrySnapshot;
use crate::types::StreamError;

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> Result<Box<dyn Read + Send>, StreamError> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(std::fs::File::open(p)?),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Opened output sink. `Memory` keeps its bytes so the caller can take them.
pub enum SinkWriter {
    Boxed(Box<dyn Write + Send>),
    Memory(Vec<u8>),
}

impl SinkWriter {
    /// Bytes captured by a `Memory` sink; `None` for the others.
    pub fn into_memory(self) -> Option<Vec<u8>> {
        match self {
            SinkWriter::Memory(v) => Some(v),
            SinkWriter::Boxed(_) => None,
        }
    }
}

impl Write for SinkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Boxed(w) => w.write(data),
            SinkWriter::Memory(v) => v.write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Boxed(w) => w.flush(),
            SinkWriter::Memory(_) => Ok(()),
        }
    }
}

/// Normalize output sink into a writer
pub fn open_output(sink: OutputSink) -> Result<SinkWriter, StreamError> {
    match sink {
        OutputSink::Writer(w) => Ok(SinkWriter::Boxed(w)),
        OutputSink::File(p) => Ok(SinkWriter::Boxed(Box::new(std::fs::File::create(p)?))),
        OutputSink::Memory => Ok(SinkWriter::Memory(Vec::new())),
    }
}

// ================= Encrypting Write adapter =================

/// `Write` adapter: plaintext written here reaches `inner` as ciphertext.
/// Call `finish` to emit the final segment; dropping without it leaves a
/// truncated stream.
pub struct EncryptingStream<W: Write> {
    writer: EncryptingWriter,
    inner: W,
}

impl<W: Write> EncryptingStream<W> {
    pub fn new(
        params: StreamParams,
        master_key: &MasterKey,
        associated_data: &[u8],
        inner: W,
    ) -> Result<Self, StreamError> {
        let writer = EncryptingWriter::new(params, master_key, associated_data)?;
        Ok(Self { writer, inner })
    }

    /// Wrap an already constructed writer.
    pub fn from_writer(writer: EncryptingWriter, inner: W) -> Self {
        Self { writer, inner }
    }

    fn drain(&mut self) -> io::Result<()> {
        let out = self.writer.take_output();
        if !out.is_empty() {
            self.inner.write_all(&out)?;
        }
        Ok(())
    }

    /// Seal the final segment, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<(W, TelemetrySnapshot), StreamError> {
        let tail = self.writer.close()?;
        self.inner.write_all(&tail)?;
        self.inner.flush()?;
        let snapshot = self.writer.telemetry();
        Ok((self.inner, snapshot))
    }

    pub fn writer(&self) -> &EncryptingWriter {
        &self.writer
    }
}

impl<W: Write> Write for EncryptingStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)?;
        self.drain()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.inner.flush()
    }
}

// ================= Decrypting Read adapter =================

/// `Read` adapter over a `DecryptingReader`. Returns `Ok(0)` only after the
/// final segment verified; any integrity failure surfaces as
/// `io::ErrorKind::InvalidData`.
pub struct DecryptingStream<'k, R: Read> {
    reader: DecryptingReader<'k, R>,
    pending: Vec<u8>,
    pos: usize,
}

impl<'k, R: Read> DecryptingStream<'k, R> {
    pub fn new(
        params: StreamParams,
        master_key: &'k MasterKey,
        associated_data: &[u8],
        source: R,
    ) -> Result<Self, StreamError> {
        let reader = DecryptingReader::new(params, master_key, associated_data, source)?;
        Ok(Self::from_reader(reader))
    }

    pub fn from_reader(reader: DecryptingReader<'k, R>) -> Self {
        Self { reader, pending: Vec::new(), pos: 0 }
    }

    pub fn reader(&self) -> &DecryptingReader<'k, R> {
        &self.reader
    }

    pub fn into_reader(self) -> DecryptingReader<'k, R> {
        self.reader
    }
}

impl<R: Read> Read for DecryptingStream<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.pending.len() {
            match self.reader.read_segment()? {
                Some(pt) => {
                    self.pending = pt;
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
