//! Datagram ingestion pipeline.
//!
//! A reader task moves raw datagrams from a [`DatagramConnection`] into a
//! bounded queue; the caller's task pops them, decodes, and validates. The
//! queue is the only state the two share. When it fills, the reader blocks
//! instead of dropping datagrams, so memory stays proportional to the
//! configured cache rather than to the datagram rate.
//!
//! Cancellation is cooperative: the token is checked before every queue
//! handoff and before every pop. An in-flight receive or decode always runs
//! to completion.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use emitter_proto::Event;
use tokio::sync::mpsc;
use tokio_util::{sync::CancellationToken, task::AbortOnDropHandle};
use tracing::{debug, error, trace, warn};

use crate::{error::IngestError, transport::DatagramConnection};

/// Smallest accepted maximum datagram size
pub const MIN_DATAGRAM_BYTES: usize = 512;

/// Largest accepted maximum datagram size
pub const MAX_DATAGRAM_BYTES: usize = 65_535;

/// Default buffering budget (20 MiB)
pub const DEFAULT_CACHE_BYTES: usize = 20 << 20;

/// Default number of datagrams to read
pub const DEFAULT_DATAGRAMS: usize = 37_529;

/// Introduction sent so a connectionless server learns where to emit events.
pub const HANDSHAKE: &[u8] = b"Feed me, Seymour!";

/// Ingestion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Maximum size of a single datagram. Clamped into
    /// [`MIN_DATAGRAM_BYTES`]..=[`MAX_DATAGRAM_BYTES`] on use.
    pub datagram_size: usize,
    /// Byte budget for datagrams waiting to be decoded
    pub cache_bytes: usize,
    /// Number of datagrams to consume before stopping
    pub datagrams: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            datagram_size: MIN_DATAGRAM_BYTES,
            cache_bytes: DEFAULT_CACHE_BYTES,
            datagrams: DEFAULT_DATAGRAMS,
        }
    }
}

impl IngestConfig {
    /// Datagram size clamped into the accepted range.
    ///
    /// Out-of-range values are not an error; they are logged and replaced by
    /// the nearest bound.
    pub fn clamped_datagram_size(&self) -> usize {
        let size = self.datagram_size.clamp(MIN_DATAGRAM_BYTES, MAX_DATAGRAM_BYTES);
        if size != self.datagram_size {
            warn!(configured = self.datagram_size, clamped = size, "datagram size out of range");
        }
        size
    }

    /// Queue slots: `max(1, cache_bytes / clamped datagram size)`.
    pub fn queue_capacity(&self) -> usize {
        let size = self.datagram_size.clamp(MIN_DATAGRAM_BYTES, MAX_DATAGRAM_BYTES);
        (self.cache_bytes / size).max(1)
    }
}

/// Receive datagrams of at most `size` bytes and push them onto `tx`.
///
/// Returns when the connection reports closed, when `cancel` fires before a
/// handoff, or when the receiving side of the queue is gone. Receive errors
/// are logged and the next datagram is awaited. Dropping `tx` on return
/// closes the queue.
pub async fn read_datagrams<C>(
    conn: Arc<C>,
    tx: mpsc::Sender<Bytes>,
    size: usize,
    cancel: CancellationToken,
) where
    C: DatagramConnection + ?Sized,
{
    debug!("reading datagrams from the server");

    loop {
        let mut buf = BytesMut::zeroed(size);
        let n = match conn.recv(&mut buf).await {
            Ok(Some(n)) => n,
            Ok(None) => {
                debug!("connection closed");
                return;
            },
            Err(err) => {
                error!(size, err = %err, "reading datagram from socket");
                if cancel.is_cancelled() || tx.is_closed() {
                    return;
                }
                tokio::task::yield_now().await;
                continue;
            },
        };
        buf.truncate(n);

        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            sent = tx.send(buf.freeze()) => {
                if sent.is_err() {
                    return;
                }
            },
        }
    }
}

/// Collect up to `config.datagrams` valid events from `conn`.
///
/// Spawns [`read_datagrams`], writes [`HANDSHAKE`], then pops one datagram
/// per iteration. Events failing checksum validation are logged and
/// discarded but still use up an iteration. Cancellation or a closed queue
/// ends collection early with whatever was gathered. The reader task is
/// aborted on return.
///
/// # Errors
///
/// - [`IngestError::NoDatagrams`] if `config.datagrams` is zero
/// - [`IngestError::Handshake`] if the introduction cannot be sent
/// - [`IngestError::Decode`] on the first malformed datagram; events
///   collected before it are dropped
pub async fn collect_events<C>(
    conn: Arc<C>,
    config: &IngestConfig,
    cancel: CancellationToken,
) -> Result<Vec<Event>, IngestError>
where
    C: DatagramConnection + ?Sized,
{
    if config.datagrams == 0 {
        return Err(IngestError::NoDatagrams);
    }

    let size = config.clamped_datagram_size();
    let (tx, mut rx) = mpsc::channel(config.queue_capacity());
    let _reader = AbortOnDropHandle::new(tokio::spawn(read_datagrams(
        Arc::clone(&conn),
        tx,
        size,
        cancel.clone(),
    )));

    // Reader is already listening, so the first reply cannot be missed.
    let n = conn.send(HANDSHAKE).await.map_err(IngestError::Handshake)?;
    debug!(bytes = n, "wrote introduction to the server");

    let mut events = Vec::new();
    for step in 1..=config.datagrams {
        let mut datagram = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            datagram = rx.recv() => match datagram {
                Some(datagram) => datagram,
                None => {
                    debug!("datagram channel closed");
                    break;
                },
            },
        };
        trace!(step, total = config.datagrams, "received datagram");

        let (event, _) = Event::decode(&mut datagram)?;
        if !event.validate() {
            warn!(uuid = %event.uuid(), "event is invalid; discarding it");
            continue;
        }

        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(datagram_size: usize, cache_bytes: usize) -> IngestConfig {
        IngestConfig { datagram_size, cache_bytes, ..IngestConfig::default() }
    }

    #[test]
    fn defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.datagram_size, 512);
        assert_eq!(config.cache_bytes, 20 * 1024 * 1024);
        assert_eq!(config.datagrams, 37_529);
        assert_eq!(config.queue_capacity(), 40_960);
    }

    #[test]
    fn datagram_size_is_clamped() {
        assert_eq!(config(0, 0).clamped_datagram_size(), MIN_DATAGRAM_BYTES);
        assert_eq!(config(511, 0).clamped_datagram_size(), MIN_DATAGRAM_BYTES);
        assert_eq!(config(1500, 0).clamped_datagram_size(), 1500);
        assert_eq!(config(70_000, 0).clamped_datagram_size(), MAX_DATAGRAM_BYTES);
    }

    #[test]
    fn queue_capacity_uses_clamped_size() {
        assert_eq!(config(100, 1 << 20).queue_capacity(), (1 << 20) / 512);
        assert_eq!(config(1 << 20, 1 << 20).queue_capacity(), (1 << 20) / 65_535);
    }

    #[test]
    fn queue_capacity_is_at_least_one() {
        assert_eq!(config(512, 0).queue_capacity(), 1);
        assert_eq!(config(65_535, 1 << 10).queue_capacity(), 1);
    }
}
