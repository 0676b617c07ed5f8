//! Error types for event decoding.
//!
//! Every fixed-width read that cannot be satisfied reports which field it was
//! reading and how far it got. Messages follow the `reading <field>: <cause>`
//! shape so a failure can be located in a frame without a debugger.

use std::fmt;

use thiserror::Error;

/// Why a single field read failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The source was exhausted before any byte of the field was read
    #[error("EOF")]
    Eof,

    /// The source ended part way through a fixed-width integer
    #[error("unexpected EOF")]
    UnexpectedEof,

    /// A variable-length read returned fewer bytes than requested
    #[error("read {read} of {expected} bytes")]
    Short {
        /// Bytes actually available
        read: usize,
        /// Bytes requested
        expected: usize,
    },
}

/// Fields of the UUID, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UuidField {
    /// `time_low` (4 bytes)
    TimeLow,
    /// `time_mid` (2 bytes)
    TimeMid,
    /// `time_hi_and_version` (2 bytes)
    TimeHiAndVersion,
    /// `clock_seq_hi_and_res` (1 byte)
    ClockSeqHiAndRes,
    /// `clock_seq_low` (1 byte)
    ClockSeqLow,
    /// `node` (6 bytes)
    Node,
}

impl fmt::Display for UuidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TimeLow => "time low",
            Self::TimeMid => "time mid",
            Self::TimeHiAndVersion => "time hi and version",
            Self::ClockSeqHiAndRes => "clock seq hi and res",
            Self::ClockSeqLow => "clock seq low",
            Self::Node => "node",
        })
    }
}

/// Fields of the event frame, in wire order. The UUID has its own error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    /// `node_id` (2 bytes)
    NodeId,
    /// `timestamp` (4 bytes)
    Timestamp,
    /// `payload_size` (2 bytes)
    Size,
    /// `payload` (`payload_size` bytes)
    Payload,
    /// `protocol` (2 bytes)
    Protocol,
    /// `submitter` (4 bytes)
    Submitter,
    /// `checksum` (4 bytes)
    Checksum,
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NodeId => "node ID",
            Self::Timestamp => "time stamp",
            Self::Size => "size",
            Self::Payload => "payload",
            Self::Protocol => "protocol",
            Self::Submitter => "submitter",
            Self::Checksum => "checksum",
        })
    }
}

/// Failure decoding a UUID.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("reading {field}: {error}")]
pub struct UuidError {
    /// Field being read when the source ran dry
    pub field: UuidField,
    /// What went wrong
    pub error: ReadError,
}

/// Protocol-level errors raised while decoding or building events.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// A frame field could not be read
    #[error("reading {field}: {error}")]
    Field {
        /// Field being read when the source ran dry
        field: EventField,
        /// What went wrong
        error: ReadError,
    },

    /// The embedded UUID could not be read
    #[error("reading UUID: {0}")]
    Uuid(UuidError),

    /// Payload does not fit the 16-bit size field
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual payload size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },
}

impl ProtocolError {
    pub(crate) const fn field(field: EventField, error: ReadError) -> Self {
        Self::Field { field, error }
    }
}

impl From<UuidError> for ProtocolError {
    fn from(err: UuidError) -> Self {
        Self::Uuid(err)
    }
}

/// A failed decode, with the number of bytes consumed before the failing field.
///
/// The byte count is informational. Any `DecodeError` means the event is
/// unusable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{error}")]
pub struct DecodeError {
    /// Bytes consumed by the fields that decoded successfully
    pub consumed: usize,
    /// The failure itself
    pub error: ProtocolError,
}

/// Convenient Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
