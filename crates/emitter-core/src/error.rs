//! Error types for ingestion and reporting.
//!
//! Only hard errors live here. Soft conditions (invalid checksums, unknown
//! payload keys, out-of-range configuration) are logged and skipped.

use std::io;

use emitter_proto::{DecodeError, Protocol};
use thiserror::Error;

use crate::findings::Category;

/// Errors that abort an ingestion session.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Zero datagrams were requested
    #[error("no datagrams read from the server")]
    NoDatagrams,

    /// The introduction datagram could not be sent
    #[error("writing introduction: {0}")]
    Handshake(io::Error),

    /// A received datagram was not a well-formed frame
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors raised when a ranking is requested for data that was never seen.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// No event carried this protocol
    #[error("no {0} events")]
    NoEvents(Protocol),

    /// Events of this protocol exist, but none carried the category
    #[error("no {protocol} {category}")]
    NoObservations {
        /// Category that was requested
        category: Category,
        /// Protocol that was requested
        protocol: Protocol,
    },
}
