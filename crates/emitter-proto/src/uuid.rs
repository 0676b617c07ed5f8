//! 128-bit event identifier.
//!
//! The layout follows the classic UUID field split, but the codec never
//! interprets the version or variant bits. The canonical string is a plain
//! hex rendering of the wire bytes.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::{
    errors::{ReadError, UuidError, UuidField},
    wire,
};

/// Event UUID as carried on the wire (16 bytes, Big Endian integers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid {
    time_low: u32,
    time_mid: u16,
    time_hi_and_version: u16,
    clock_seq_hi_and_res: u8,
    clock_seq_low: u8,
    node: [u8; 6],
}

impl Uuid {
    /// Size of the encoded UUID
    pub const SIZE: usize = 16;

    /// Length of the canonical string form
    pub const STRING_LEN: usize = 36;

    /// Build a UUID from its individual fields.
    pub const fn from_fields(
        time_low: u32,
        time_mid: u16,
        time_hi_and_version: u16,
        clock_seq_hi_and_res: u8,
        clock_seq_low: u8,
        node: [u8; 6],
    ) -> Self {
        Self { time_low, time_mid, time_hi_and_version, clock_seq_hi_and_res, clock_seq_low, node }
    }

    /// Build a UUID from its 16 wire bytes.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        let mut src = &bytes[..];
        let time_low = src.get_u32();
        let time_mid = src.get_u16();
        let time_hi_and_version = src.get_u16();
        let clock_seq_hi_and_res = src.get_u8();
        let clock_seq_low = src.get_u8();
        let mut node = [0u8; 6];
        src.copy_to_slice(&mut node);

        Self { time_low, time_mid, time_hi_and_version, clock_seq_hi_and_res, clock_seq_low, node }
    }

    /// Decode a UUID, returning the number of bytes consumed (always 16).
    ///
    /// # Errors
    ///
    /// Returns [`UuidError`] naming the first field the source could not
    /// satisfy. Integer fields fail with `unexpected EOF` (or `EOF` when the
    /// source is already empty); the node reports a short count.
    pub fn decode(src: &mut impl Buf) -> Result<(Self, usize), UuidError> {
        let time_low = wire::read_u32(src).map_err(at(UuidField::TimeLow))?;
        let time_mid = wire::read_u16(src).map_err(at(UuidField::TimeMid))?;
        let time_hi_and_version = wire::read_u16(src).map_err(at(UuidField::TimeHiAndVersion))?;
        let clock_seq_hi_and_res = wire::read_u8(src).map_err(at(UuidField::ClockSeqHiAndRes))?;
        let clock_seq_low = wire::read_u8(src).map_err(at(UuidField::ClockSeqLow))?;

        let node_bytes = wire::read_bytes(src, 6).map_err(at(UuidField::Node))?;
        let mut node = [0u8; 6];
        node.copy_from_slice(&node_bytes);

        let uuid = Self {
            time_low,
            time_mid,
            time_hi_and_version,
            clock_seq_hi_and_res,
            clock_seq_low,
            node,
        };
        Ok((uuid, Self::SIZE))
    }

    /// Encode into buffer.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.time_low);
        dst.put_u16(self.time_mid);
        dst.put_u16(self.time_hi_and_version);
        dst.put_u8(self.clock_seq_hi_and_res);
        dst.put_u8(self.clock_seq_low);
        dst.put_slice(&self.node);
    }

    /// The 16 wire bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        self.encode(&mut &mut bytes[..]);
        bytes
    }

    /// Get `time_low`
    pub fn time_low(&self) -> u32 {
        self.time_low
    }

    /// Get `time_mid`
    pub fn time_mid(&self) -> u16 {
        self.time_mid
    }

    /// Get `time_hi_and_version`
    pub fn time_hi_and_version(&self) -> u16 {
        self.time_hi_and_version
    }

    /// Get `clock_seq_hi_and_res`
    pub fn clock_seq_hi_and_res(&self) -> u8 {
        self.clock_seq_hi_and_res
    }

    /// Get `clock_seq_low`
    pub fn clock_seq_low(&self) -> u8 {
        self.clock_seq_low
    }

    /// Get `node`
    pub fn node(&self) -> [u8; 6] {
        self.node
    }
}

fn at(field: UuidField) -> impl Fn(ReadError) -> UuidError {
    move |error| UuidError { field, error }
}

/// Canonical `8-4-4-2-2-6`-grouped form, e.g.
/// `35616265-3835-3232-2d34-6636302d3131`.
impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(
            f,
            "{}-{}-{}-{}{}-{}",
            hex::encode(&bytes[0..4]),
            hex::encode(&bytes[4..6]),
            hex::encode(&bytes[6..8]),
            hex::encode(&bytes[8..9]),
            hex::encode(&bytes[9..10]),
            hex::encode(&bytes[10..16]),
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const UUID: Uuid = Uuid::from_fields(
        0x3563_3061,
        0x6663,
        0x3630,
        0x2d,
        0x34,
        [0x66, 0x35, 0x38, 0x2d, 0x31, 0x31],
    );

    impl Arbitrary for Uuid {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            any::<[u8; 16]>().prop_map(Uuid::from_bytes).boxed()
        }
    }

    proptest! {
        #[test]
        fn uuid_round_trip(uuid in any::<Uuid>()) {
            let bytes = uuid.to_bytes();
            let (decoded, n) = Uuid::decode(&mut &bytes[..]).expect("should decode");
            prop_assert_eq!(n, Uuid::SIZE);
            prop_assert_eq!(decoded, uuid);
        }

        #[test]
        fn string_form_is_canonical(uuid in any::<Uuid>()) {
            let s = uuid.to_string();
            prop_assert_eq!(s.len(), Uuid::STRING_LEN);
            let groups: Vec<usize> = s.split('-').map(str::len).collect();
            prop_assert_eq!(groups, vec![8, 4, 4, 4, 12]);
            prop_assert!(
                s.chars().all(|c| c == '-' || c.is_ascii_digit() || ('a'..='f').contains(&c))
            );
        }
    }

    #[test]
    fn decode_known_uuid() {
        let bytes = UUID.to_bytes();
        let (decoded, n) = Uuid::decode(&mut &bytes[..]).expect("should decode");
        assert_eq!(n, 16);
        assert_eq!(decoded, UUID);
    }

    #[test]
    fn renders_lowercase_hex_groups() {
        assert_eq!(UUID.to_string(), "35633061-6663-3630-2d34-6635382d3131");
    }

    #[test]
    fn short_node_reports_bytes_read() {
        let bytes = UUID.to_bytes();
        let err = Uuid::decode(&mut &bytes[..14]).expect_err("should fail");
        assert_eq!(err, UuidError {
            field: UuidField::Node,
            error: ReadError::Short { read: 4, expected: 6 }
        });
        assert_eq!(err.to_string(), "reading node: read 4 of 6 bytes");
    }

    #[test]
    fn missing_node_is_plain_eof() {
        let bytes = UUID.to_bytes();
        let err = Uuid::decode(&mut &bytes[..10]).expect_err("should fail");
        assert_eq!(err.to_string(), "reading node: EOF");
    }

    #[test]
    fn truncated_integer_fields() {
        let bytes = UUID.to_bytes();
        let cases = [
            (0, "reading time low: EOF"),
            (2, "reading time low: unexpected EOF"),
            (5, "reading time mid: unexpected EOF"),
            (7, "reading time hi and version: unexpected EOF"),
            (8, "reading clock seq hi and res: EOF"),
            (9, "reading clock seq low: EOF"),
        ];
        for (len, expected) in cases {
            let err = Uuid::decode(&mut &bytes[..len]).expect_err("should fail");
            assert_eq!(err.to_string(), expected, "truncated to {len} bytes");
        }
    }
}
