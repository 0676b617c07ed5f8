//! One client session: dial, collect, report.

use std::{
    io::{self, Write},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    sync::Arc,
};

use emitter_core::{Findings, IngestError, ReportError, collect_events};
use thiserror::Error;
use tokio::net::{UdpSocket, lookup_host};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{cli::Args, report};

/// Failures that end a client session.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No server address was given
    #[error("server address is required")]
    MissingAddress,

    /// The server address could not be resolved or connected to
    #[error("dialing {address:?}: {source}")]
    Dial {
        /// Address as given on the command line
        address: String,
        /// Underlying resolver or socket error
        source: io::Error,
    },

    /// The ingestion pipeline failed
    #[error("collecting events: {0}")]
    Collect(#[source] IngestError),

    /// The collected events could not answer every report question
    #[error("generating report: {0}")]
    Report(#[source] ReportError),

    /// The report could not be written out
    #[error("writing report: {0}")]
    Output(#[from] io::Error),
}

/// Bind an ephemeral UDP socket and connect it to the first resolved
/// address.
async fn dial(address: &str) -> Result<UdpSocket, ClientError> {
    let dial_err = |source| ClientError::Dial { address: address.to_owned(), source };

    let peer = lookup_host(address).await.map_err(dial_err)?.next().ok_or_else(|| {
        dial_err(io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"))
    })?;
    let local: SocketAddr = match peer {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };

    let socket = UdpSocket::bind(local).await.map_err(dial_err)?;
    socket.connect(peer).await.map_err(dial_err)?;
    Ok(socket)
}

/// Collect events from `args.address` and write the report to `out`.
///
/// Cancelling `cancel` stops collection early; the report is still built
/// from whatever arrived.
pub async fn run<W: Write>(
    args: &Args,
    cancel: CancellationToken,
    out: &mut W,
) -> Result<(), ClientError> {
    if args.address.is_empty() {
        return Err(ClientError::MissingAddress);
    }
    let detail = args.detail_addr();

    let conn = Arc::new(dial(&args.address).await?);

    info!(address = %args.address, "collecting events");
    let events = collect_events(conn, &args.ingest_config(), cancel)
        .await
        .map_err(ClientError::Collect)?;
    info!(count = events.len(), "received events");

    let findings = Findings::from_events(events);
    let report = report::render(&findings, detail).map_err(ClientError::Report)?;

    write!(out, "\n\n{report}\n\n")?;
    out.flush()?;
    Ok(())
}
