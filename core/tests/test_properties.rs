// Property-based checks over random plaintexts, chunkings and tamper positions.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Cursor;

    use proptest::prelude::*;
    use streaming_aead::{
        crypto::{derive_key_material, segment_nonce, MasterKey},
        params::{CipherSuite, StreamParams},
        stream::{decrypt_to_vec, encrypt_to_vec, DecryptingReader, EncryptingWriter},
        types::StreamError,
    };

    fn suite_strategy() -> impl Strategy<Value = CipherSuite> {
        prop::sample::select(CipherSuite::ALL.to_vec())
    }

    fn key_for(suite: CipherSuite) -> MasterKey {
        MasterKey::new(&vec![0xC3; suite.key_len()])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_roundtrip(
            suite in suite_strategy(),
            pt in prop::collection::vec(any::<u8>(), 0..3000),
            ad in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            let p = StreamParams::new(suite, 256).unwrap();
            let key = key_for(suite);
            let ct = encrypt_to_vec(p, &key, &ad, &pt).unwrap();
            prop_assert_eq!(ct.len() as u64, p.layout().ciphertext_len(pt.len() as u64));
            prop_assert_eq!(decrypt_to_vec(p, &key, &ad, &ct).unwrap(), pt);
        }

        #[test]
        fn prop_chunking_is_invisible(
            pt in prop::collection::vec(any::<u8>(), 0..2000),
            chunk in 1usize..600,
        ) {
            let p = StreamParams::new(CipherSuite::Aes128CtrHmacSha256, 256).unwrap();
            let key = key_for(p.suite);
            let mut w = EncryptingWriter::new(p, &key, b"").unwrap();
            let mut ct = Vec::new();
            for c in pt.chunks(chunk) {
                w.write(c).unwrap();
                ct.extend_from_slice(&w.take_output());
            }
            ct.extend_from_slice(&w.close().unwrap());
            prop_assert_eq!(decrypt_to_vec(p, &key, b"", &ct).unwrap(), pt);
        }

        #[test]
        fn prop_any_bit_flip_is_detected(
            suite in suite_strategy(),
            len in 0usize..1500,
            pos_seed in any::<u64>(),
            bit in 0u8..8,
        ) {
            let p = StreamParams::new(suite, 256).unwrap();
            let key = key_for(suite);
            let pt: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let mut ct = encrypt_to_vec(p, &key, b"ad", &pt).unwrap();
            let pos = (pos_seed % ct.len() as u64) as usize;
            ct[pos] ^= 1 << bit;

            let err = decrypt_to_vec(p, &key, b"ad", &ct).unwrap_err();
            prop_assert!(
                err.is_integrity_failure() || matches!(err, StreamError::MalformedHeader(_)),
                "unexpected error {:?}", err
            );
        }

        #[test]
        fn prop_seek_equals_sequential(
            suite in suite_strategy(),
            len in 0usize..3000,
            k_seed in any::<u64>(),
        ) {
            let p = StreamParams::new(suite, 256).unwrap();
            let key = key_for(suite);
            let pt: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            let ct = encrypt_to_vec(p, &key, b"", &pt).unwrap();
            let count = p.layout().segment_count(len as u64);
            let k = k_seed % count;

            let mut r = DecryptingReader::new(p, &key, b"", Cursor::new(&ct)).unwrap();
            let seg = r.read_segment_at(k).unwrap().unwrap();
            let start = (k * 256) as usize;
            let end = (start + 256).min(pt.len());
            prop_assert_eq!(seg, pt[start..end].to_vec());
        }

        #[test]
        fn prop_range_read_matches_slice(
            len in 1usize..3000,
            off_seed in any::<u64>(),
            range_len in 0usize..1200,
        ) {
            let p = StreamParams::new(CipherSuite::Aes256GcmHkdf, 256).unwrap();
            let key = key_for(p.suite);
            let pt: Vec<u8> = (0..len).map(|i| (i * 13) as u8).collect();
            let ct = encrypt_to_vec(p, &key, b"", &pt).unwrap();
            let off = off_seed % len as u64;

            let mut r = DecryptingReader::new(p, &key, b"", Cursor::new(&ct)).unwrap();
            let got = r.read_range(off, range_len).unwrap();
            let end = (off as usize + range_len).min(len);
            prop_assert_eq!(got, pt[off as usize..end].to_vec());
        }
    }

    #[test]
    fn nonces_are_pairwise_distinct() {
        let p = StreamParams::new(CipherSuite::Aes128GcmHkdf, 4096).unwrap();
        let material = derive_key_material(&p, &key_for(p.suite), &[1u8; 16], b"").unwrap();

        let mut seen = HashSet::new();
        for index in 0..20_000u64 {
            for last in [false, true] {
                assert!(seen.insert(segment_nonce(&material.nonce_prefix, index, last).unwrap()));
            }
        }
        for index in [u32::MAX as u64 - 1, u32::MAX as u64] {
            for last in [false, true] {
                assert!(seen.insert(segment_nonce(&material.nonce_prefix, index, last).unwrap()));
            }
        }
    }
}
