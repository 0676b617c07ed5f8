//! Ingestion and aggregation for event emitter clients.
//!
//! [`collect_events`] pulls datagrams off a [`DatagramConnection`] through a
//! bounded queue, decodes them with [`emitter_proto::Event::decode`], and
//! keeps only those that validate. [`Findings`] then tallies the survivors
//! into ranked [`OccurrenceTable`]s.
//!
//! The crate has no opinion on presentation; rendering a report from
//! [`Findings`] is left to the caller.

pub mod error;
pub mod findings;
pub mod ingest;
pub mod transport;

pub use error::{IngestError, ReportError};
pub use findings::{Category, Findings, Occurrence, OccurrenceTable};
pub use ingest::{
    DEFAULT_CACHE_BYTES, DEFAULT_DATAGRAMS, HANDSHAKE, IngestConfig, MAX_DATAGRAM_BYTES,
    MIN_DATAGRAM_BYTES, collect_events, read_datagrams,
};
pub use transport::DatagramConnection;
