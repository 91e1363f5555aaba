#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read, Write};

    use streaming_aead::{
        crypto::MasterKey,
        params::{preset_by_name, CipherSuite, StreamParams},
        stream::{
            decrypt_stream, decrypt_to_vec, encrypt_stream, encrypt_to_vec, DecryptingReader,
            DecryptingStream, EncryptingStream, EncryptingWriter, InputSource, OutputSink,
            ReaderState,
        },
        types::StreamError,
    };

    fn setup() -> (StreamParams, MasterKey) {
        let p = StreamParams::new(CipherSuite::Aes256GcmHkdf, 4096).unwrap();
        (p, MasterKey::new(&[0x77; 32]))
    }

    fn data(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 199) as u8).collect()
    }

    #[test]
    fn write_adapter_then_read_adapter() {
        let (p, key) = setup();
        let pt = data(50_000);

        let mut enc = EncryptingStream::new(p, &key, b"ctx", Vec::new()).unwrap();
        for chunk in pt.chunks(777) {
            enc.write_all(chunk).unwrap();
        }
        let (ct, telemetry) = enc.finish().unwrap();
        assert_eq!(telemetry.bytes_ciphertext, ct.len() as u64);

        let mut dec = DecryptingStream::new(p, &key, b"ctx", Cursor::new(ct)).unwrap();
        let mut out = Vec::new();
        dec.read_to_end(&mut out).unwrap();
        assert_eq!(out, pt);
    }

    #[test]
    fn read_adapter_reports_tampering_as_invalid_data() {
        let (p, key) = setup();
        let mut ct = encrypt_to_vec(p, &key, b"", &data(10_000)).unwrap();
        let n = ct.len();
        ct[n - 1] ^= 1;

        let mut dec = DecryptingStream::new(p, &key, b"", &ct[..]).unwrap();
        let mut out = Vec::new();
        let err = dec.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        // Verified segments before the failure were delivered.
        assert_eq!(out.len(), 8192);
    }

    #[test]
    fn read_adapter_reports_truncation_as_invalid_data() {
        let (p, key) = setup();
        let ct = encrypt_to_vec(p, &key, b"", &data(8192)).unwrap();
        let cut = p.layout().segment_offset(2) as usize;

        let mut dec = DecryptingStream::new(p, &key, b"", &ct[..cut]).unwrap();
        let err = io::copy(&mut dec, &mut io::sink()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn one_shot_helpers_roundtrip() {
        let (p, key) = setup();
        for len in [0usize, 1, 4096, 4097, 20_000] {
            let pt = data(len);
            let ct = encrypt_to_vec(p, &key, b"ad", &pt).unwrap();
            assert_eq!(decrypt_to_vec(p, &key, b"ad", &ct).unwrap(), pt);
        }
    }

    #[test]
    fn decrypt_to_vec_requires_complete_stream() {
        let (p, key) = setup();
        let ct = encrypt_to_vec(p, &key, b"ad", &data(9000)).unwrap();
        let cut = p.layout().segment_offset(2) as usize;
        let err = decrypt_to_vec(p, &key, b"ad", &ct[..cut]).unwrap_err();
        assert!(matches!(err, StreamError::TruncatedStream { .. }));
    }

    #[test]
    fn source_to_sink_in_memory() {
        let p = preset_by_name("AES128_CTR_HMAC_SHA256_4KB").unwrap();
        let key = MasterKey::new(&[0x12; 16]);
        let pt = data(30_000);

        let enc = encrypt_stream(InputSource::Memory(pt.clone()), OutputSink::Memory, p, &key, b"file-1").unwrap();
        let ct = enc.output.unwrap();
        assert_eq!(enc.telemetry.bytes_plaintext, 30_000);
        assert_eq!(ct.len() as u64, p.layout().ciphertext_len(30_000));

        let dec = decrypt_stream(
            InputSource::Reader(Box::new(Cursor::new(ct))),
            OutputSink::Memory,
            p,
            &key,
            b"file-1",
        )
        .unwrap();
        assert_eq!(dec.output.unwrap(), pt);
        assert_eq!(dec.telemetry.segments, 8);
    }

    #[test]
    fn source_to_sink_files() {
        let (p, key) = setup();
        let dir = std::env::temp_dir();
        let tag = std::process::id();
        let plain = dir.join(format!("streaming_aead_{}_plain.bin", tag));
        let cipher = dir.join(format!("streaming_aead_{}_cipher.bin", tag));
        let back = dir.join(format!("streaming_aead_{}_back.bin", tag));

        let pt = data(12_345);
        std::fs::write(&plain, &pt).unwrap();

        let enc = encrypt_stream(InputSource::File(plain.clone()), OutputSink::File(cipher.clone()), p, &key, b"").unwrap();
        assert!(enc.output.is_none());
        decrypt_stream(InputSource::File(cipher.clone()), OutputSink::File(back.clone()), p, &key, b"").unwrap();
        assert_eq!(std::fs::read(&back).unwrap(), pt);

        for f in [plain, cipher, back] {
            let _ = std::fs::remove_file(f);
        }
    }

    #[test]
    fn missing_input_file_is_io_error() {
        let (p, key) = setup();
        let err = encrypt_stream(
            InputSource::File("/definitely/not/here.bin".into()),
            OutputSink::Memory,
            p,
            &key,
            b"",
        )
        .unwrap_err();
        assert!(matches!(err, StreamError::Io(_)));
    }

    #[test]
    fn adapters_wrap_existing_writer_and_reader() {
        let p = StreamParams::new(CipherSuite::Aes128GcmHkdf, 1024).unwrap();
        let key = MasterKey::generate(p.suite.key_len());
        assert_eq!(key.len(), 16);
        let pt = data(3000);

        let writer = EncryptingWriter::with_salt(p, &key, b"ad", &[9u8; 16]).unwrap();
        let mut enc = EncryptingStream::from_writer(writer, Vec::new());
        enc.write_all(&pt).unwrap();
        assert_eq!(enc.writer().segments_written(), 2);
        let (ct, _) = enc.finish().unwrap();

        let reader = DecryptingReader::new(p, &key, b"ad", &ct[..]).unwrap();
        let mut dec = DecryptingStream::from_reader(reader);
        let mut out = Vec::new();
        dec.read_to_end(&mut out).unwrap();
        assert_eq!(out, pt);

        let reader = dec.into_reader();
        assert_eq!(reader.state(), ReaderState::Exhausted);
        assert_eq!(reader.next_segment_index(), 3);
    }
}
