//! Fuzz `Event::decode` with arbitrary datagrams.
//!
//! Decoding untrusted bytes must never panic. Whatever decodes must
//! re-encode to exactly the bytes it consumed, and its validity must match a
//! fresh checksum over those bytes.

#![no_main]

use bytes::Bytes;
use emitter_proto::Event;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut src = Bytes::copy_from_slice(data);

    match Event::decode(&mut src) {
        Ok((event, consumed)) => {
            // INVARIANT 1: consumed bytes match the encoded length
            assert_eq!(consumed, event.encoded_len());
            assert_eq!(consumed + src.len(), data.len());

            // INVARIANT 2: re-encoding is the identity on consumed bytes
            assert_eq!(&event.to_bytes()[..], &data[..consumed]);

            // INVARIANT 3: validity is exactly a checksum match
            let body = &data[..consumed - 4];
            assert_eq!(event.validate(), crc32fast::hash(body) == event.checksum());
        },
        Err(err) => {
            // INVARIANT 4: a failed decode never claims the whole input
            assert!(err.consumed <= data.len());
            assert!(!err.to_string().is_empty());
        },
    }
});
