#[cfg(test)]
mod tests {
    use std::time::Duration;

    use streaming_aead::{
        crypto::MasterKey,
        params::{CipherSuite, StreamParams},
        stream::{encrypt_to_vec, DecryptingReader, EncryptingWriter},
        telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer},
    };

    #[test]
    fn counters_accumulate_and_merge() {
        let mut a = TelemetryCounters::default();
        a.add_header(24);
        a.add_segment(1024, 16);
        let mut b = TelemetryCounters::default();
        b.add_segment(10, 16);
        a.merge(&b);

        assert_eq!(a.segments, 2);
        assert_eq!(a.bytes_plaintext, 1034);
        assert_eq!(a.bytes_overhead, 24 + 32);
        assert_eq!(a.bytes_ciphertext, a.bytes_plaintext + a.bytes_overhead);

        let mut c = TelemetryCounters::default();
        c += a.clone();
        c += b;
        assert_eq!(c.segments, 3);
        assert_eq!(c.headers, 1);
        assert_eq!(c.bytes_plaintext, 1044);
    }

    #[test]
    fn stage_times_accumulate() {
        let mut t = StageTimes::default();
        t.add(Stage::Encrypt, Duration::from_micros(400));
        t.add(Stage::Encrypt, Duration::from_micros(20));
        t.add(Stage::Read, Duration::from_micros(100));
        assert_eq!(t.get(Stage::Encrypt), Duration::from_micros(420));
        assert_eq!(t.total(), Duration::from_micros(520));
        assert_eq!(t.get(Stage::Decrypt), Duration::ZERO);

        let mut seen: Vec<Stage> = (&t).into_iter().map(|(s, _)| *s).collect();
        seen.sort_by_key(|s| s.to_string());
        assert_eq!(seen, vec![Stage::Encrypt, Stage::Read]);
        assert_eq!(Stage::Derive.to_string(), "derive");
    }

    #[test]
    fn writer_and_reader_agree() {
        let p = StreamParams::new(CipherSuite::Aes128CtrHmacSha256, 1024).unwrap();
        let key = MasterKey::new(&[3u8; 16]);
        let pt = vec![0u8; 3000];
        let mut w = EncryptingWriter::new(p, &key, b"").unwrap();
        w.write(&pt).unwrap();
        let ct = [w.take_output(), w.close().unwrap()].concat();
        let enc = w.telemetry();

        let mut r = DecryptingReader::new(p, &key, b"", &ct[..]).unwrap();
        while r.read_segment().unwrap().is_some() {}
        let dec = r.telemetry();

        assert_eq!(enc.segments, dec.segments);
        assert_eq!(enc.bytes_plaintext, dec.bytes_plaintext);
        assert_eq!(enc.bytes_ciphertext, dec.bytes_ciphertext);
        assert!(enc.sanity_check());
        assert!(dec.sanity_check());
        assert!(dec.expansion_ratio > 1.0);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let p = StreamParams::new(CipherSuite::Aes128GcmHkdf, 1024).unwrap();
        let key = MasterKey::new(&[3u8; 16]);
        let ct = encrypt_to_vec(p, &key, b"", b"abc").unwrap();
        let mut r = DecryptingReader::new(p, &key, b"", &ct[..]).unwrap();
        r.read_segment().unwrap();

        let json = r.telemetry().to_json().unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.segments, 1);
        assert_eq!(back.bytes_plaintext, 3);
    }

    #[test]
    fn timer_charges_closure_to_stage() {
        let mut timer = TelemetryTimer::new();
        let v = timer.time(Stage::Derive, || {
            std::thread::sleep(Duration::from_millis(2));
            7
        });
        timer.finish();
        assert_eq!(v, 7);
        assert!(timer.stage_times.get(Stage::Derive) >= Duration::from_millis(2));
        assert!(timer.stage_times.total() <= timer.elapsed());
    }
}
