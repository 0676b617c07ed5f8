//! Event frame codec.
//!
//! Layout on the wire (all integers Big Endian):
//!
//! ```text
//! ┌─────────┬───────────┬──────────────┬──────┬─────────┬──────────┬───────────┬──────────┐
//! │ node_id │ timestamp │ payload_size │ uuid │ payload │ protocol │ submitter │ checksum │
//! │    2    │     4     │      2       │  16  │  size   │    2     │     4     │    4     │
//! └─────────┴───────────┴──────────────┴──────┴─────────┴──────────┴───────────┴──────────┘
//! ```
//!
//! The checksum is CRC-32 (IEEE) over every preceding byte of the frame.
//! Decoding only checks framing; integrity is a separate [`Event::validate`]
//! call, and callers must drop events that fail it.

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    Protocol, Uuid,
    errors::{DecodeError, EventField, ProtocolError, Result},
    payload::{self, DecodedPayload},
    wire,
};

/// A decoded event.
///
/// # Invariants
///
/// - `payload.len() == payload_size`. Enforced by [`Event::new`] and by
///   [`Event::decode`].
/// - The decoded payload is always `payload::parse(payload)`. It is a cache
///   of the raw bytes, never independent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    node_id: u16,
    timestamp: u32,
    payload_size: u16,
    uuid: Uuid,
    payload: Bytes,
    decoded: DecodedPayload,
    protocol: Protocol,
    submitter: u32,
    checksum: u32,
}

impl Event {
    /// Encoded size of every field except the payload
    pub const FIXED_SIZE: usize = 2 + 4 + 2 + Uuid::SIZE + 2 + 4 + 4;

    /// Largest payload the 16-bit size field can describe
    pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

    /// Create an event with a correct checksum.
    ///
    /// `payload_size` is derived from the payload, so header and payload can
    /// never disagree.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::PayloadTooLarge`] if the payload exceeds
    /// [`Self::MAX_PAYLOAD_SIZE`].
    pub fn new(
        node_id: u16,
        timestamp: u32,
        uuid: Uuid,
        payload: impl Into<Bytes>,
        protocol: Protocol,
        submitter: u32,
    ) -> Result<Self> {
        let payload = payload.into();
        let payload_size = u16::try_from(payload.len()).map_err(|_| {
            ProtocolError::PayloadTooLarge { size: payload.len(), max: Self::MAX_PAYLOAD_SIZE }
        })?;

        let mut event = Self {
            node_id,
            timestamp,
            payload_size,
            uuid,
            decoded: payload::parse(&payload),
            payload,
            protocol: protocol.canonical(),
            submitter,
            checksum: 0,
        };
        event.checksum = event.compute_checksum();
        Ok(event)
    }

    /// Replace the stored checksum, leaving every other field alone.
    #[must_use]
    pub fn with_checksum(mut self, checksum: u32) -> Self {
        self.checksum = checksum;
        self
    }

    /// Decode one event from the front of `src`.
    ///
    /// Fields are read in wire order and the first failure aborts the decode;
    /// no partially populated event is ever returned. On success, returns the
    /// event and the number of bytes consumed. Trailing bytes are left in
    /// `src`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] carrying the field-labelled failure and the
    /// bytes consumed by the fields before it.
    pub fn decode(src: &mut impl Buf) -> std::result::Result<(Self, usize), DecodeError> {
        let mut reader = FieldReader { src, consumed: 0 };

        let node_id = reader.u16(EventField::NodeId)?;
        let timestamp = reader.u32(EventField::Timestamp)?;
        let payload_size = reader.u16(EventField::Size)?;
        let uuid = reader.uuid()?;
        let payload = reader.bytes(EventField::Payload, usize::from(payload_size))?;
        let decoded = payload::parse(&payload);
        let protocol = Protocol::from_u16(reader.u16(EventField::Protocol)?);
        let submitter = reader.u32(EventField::Submitter)?;
        let checksum = reader.u32(EventField::Checksum)?;

        let event = Self {
            node_id,
            timestamp,
            payload_size,
            uuid,
            payload,
            decoded,
            protocol,
            submitter,
            checksum,
        };
        Ok((event, reader.consumed))
    }

    /// Encode into buffer, stored checksum last.
    ///
    /// The checksum is written as stored, not recomputed, so a tampered event
    /// encodes as tampered.
    pub fn encode(&self, dst: &mut impl BufMut) {
        self.encode_body(dst);
        dst.put_u32(self.checksum);
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Size of the encoded frame
    pub fn encoded_len(&self) -> usize {
        Self::FIXED_SIZE + self.payload.len()
    }

    /// Every field except the checksum, in wire order.
    fn encode_body(&self, dst: &mut impl BufMut) {
        dst.put_u16(self.node_id);
        dst.put_u32(self.timestamp);
        dst.put_u16(self.payload_size);
        self.uuid.encode(dst);
        dst.put_slice(&self.payload);
        dst.put_u16(self.protocol.to_u16());
        dst.put_u32(self.submitter);
    }

    /// CRC-32 (IEEE) over the encoded body.
    pub fn compute_checksum(&self) -> u32 {
        let mut body = BytesMut::with_capacity(self.encoded_len());
        self.encode_body(&mut body);
        crc32fast::hash(&body)
    }

    /// Whether the stored checksum matches the other fields.
    pub fn validate(&self) -> bool {
        self.compute_checksum() == self.checksum
    }

    /// Get the node ID
    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    /// Get the timestamp (seconds since the Unix epoch)
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Get the payload size
    pub fn payload_size(&self) -> u16 {
        self.payload_size
    }

    /// Get the event UUID
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Get the raw payload bytes
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Get the parsed payload
    pub fn decoded_payload(&self) -> &DecodedPayload {
        &self.decoded
    }

    /// Get the originating protocol
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Get the raw submitter value
    pub fn submitter(&self) -> u32 {
        self.submitter
    }

    /// Submitter reinterpreted as a Big Endian IPv4 address
    pub fn submitter_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.submitter)
    }

    /// Get the stored checksum
    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

/// Reads event fields while tracking how many bytes succeeded.
struct FieldReader<'a, B> {
    src: &'a mut B,
    consumed: usize,
}

impl<B: Buf> FieldReader<'_, B> {
    fn fail(&self, error: ProtocolError) -> DecodeError {
        DecodeError { consumed: self.consumed, error }
    }

    fn u16(&mut self, field: EventField) -> std::result::Result<u16, DecodeError> {
        let value = wire::read_u16(&mut *self.src)
            .map_err(|e| self.fail(ProtocolError::field(field, e)))?;
        self.consumed += 2;
        Ok(value)
    }

    fn u32(&mut self, field: EventField) -> std::result::Result<u32, DecodeError> {
        let value = wire::read_u32(&mut *self.src)
            .map_err(|e| self.fail(ProtocolError::field(field, e)))?;
        self.consumed += 4;
        Ok(value)
    }

    fn bytes(&mut self, field: EventField, len: usize) -> std::result::Result<Bytes, DecodeError> {
        let value = wire::read_bytes(&mut *self.src, len)
            .map_err(|e| self.fail(ProtocolError::field(field, e)))?;
        self.consumed += value.len();
        Ok(value)
    }

    fn uuid(&mut self) -> std::result::Result<Uuid, DecodeError> {
        let (uuid, n) =
            Uuid::decode(&mut *self.src).map_err(|e| self.fail(ProtocolError::Uuid(e)))?;
        self.consumed += n;
        Ok(uuid)
    }
}
