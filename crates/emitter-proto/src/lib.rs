//! Wire format for event emitter datagrams.
//!
//! Each datagram carries exactly one frame: a fixed-width Big Endian header,
//! a variable-length `key:value[,key:value...]` text payload, a protocol tag,
//! the submitter's IPv4 address, and a CRC-32 checksum over everything before
//! it.
//!
//! Decoding reports the exact field that ran out of bytes, and integrity is
//! checked separately with [`Event::validate`]. Frames are fixed and
//! versionless; this is not a general-purpose serialization library.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod event;
pub mod lexer;
pub mod payload;
pub mod protocol;
pub mod uuid;
mod wire;

pub use errors::{DecodeError, EventField, ProtocolError, ReadError, Result, UuidError, UuidField};
pub use event::Event;
pub use lexer::{Lexer, Token, TokenKind};
pub use payload::DecodedPayload;
pub use protocol::Protocol;
pub use uuid::Uuid;
