//! Command-line arguments.

use std::net::Ipv4Addr;

use clap::Parser;
use emitter_core::{DEFAULT_DATAGRAMS, IngestConfig, MIN_DATAGRAM_BYTES};
use tracing::warn;

const ABOUT: &str = "\
This client initiates communication with an event emitter server and parses a
finite number of events. After parsing all events, the client prints a report of
findings answering the following questions:

    * What are the top 5 SSH passwords?
    * What are the top 5 SSH usernames?
    * What are the top 5 TELNET passwords?
    * What are the top 5 TELNET usernames?
    * What are the top 30 user-agents in HTTP events?
    * What are the top 20 emails in SMTP?
    * Who are the top 15 submitters?
    * What events did <ip-detail> submit?";

/// Default buffering budget in MiB
pub const DEFAULT_CACHE_MIB: usize = 20;

/// Event emitter client
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "emitter-client",
    version,
    about = "Collect and report on event emitter datagrams"
)]
#[command(long_about = ABOUT)]
pub struct Args {
    /// Event server host:port
    #[arg(long, default_value = "localhost:1035")]
    pub address: String,

    /// MiB of RAM to use for caching datagrams (min 1)
    #[arg(long, default_value_t = DEFAULT_CACHE_MIB)]
    pub cache: usize,

    /// Datagrams to read from the event server
    #[arg(long, default_value_t = DEFAULT_DATAGRAMS)]
    pub datagrams: usize,

    /// Maximum UDP datagram size (min 512; max 65535)
    #[arg(long, default_value_t = MIN_DATAGRAM_BYTES)]
    pub datagram_size: usize,

    /// Detail events submitted by a given IPv4 address
    #[arg(long, default_value = "1.2.3.4")]
    pub ip_detail: String,

    /// Enable verbose (debug) output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Pipeline settings for these arguments. The cache is raised to 1 MiB
    /// if smaller.
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            datagram_size: self.datagram_size,
            cache_bytes: self.cache.max(1).saturating_mul(1 << 20),
            datagrams: self.datagrams,
        }
    }

    /// Address to drill down on, or `None` (with a warning) if unparsable.
    pub fn detail_addr(&self) -> Option<Ipv4Addr> {
        match self.ip_detail.parse() {
            Ok(addr) => Some(addr),
            Err(err) => {
                warn!(ip_detail = %self.ip_detail, err = %err, "parsing detail IP");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("emitter-client").chain(argv.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.address, "localhost:1035");
        assert_eq!(args.cache, 20);
        assert_eq!(args.datagrams, 37_529);
        assert_eq!(args.datagram_size, 512);
        assert_eq!(args.ip_detail, "1.2.3.4");
        assert!(!args.verbose);
        assert_eq!(args.ingest_config(), IngestConfig::default());
    }

    #[test]
    fn flags_map_onto_ingest_config() {
        let args = parse(&["--cache", "2", "--datagrams", "10", "--datagram-size", "1500", "-v"]);
        assert!(args.verbose);
        assert_eq!(args.ingest_config(), IngestConfig {
            datagram_size: 1500,
            cache_bytes: 2 << 20,
            datagrams: 10
        });
    }

    #[test]
    fn cache_has_a_floor() {
        let args = parse(&["--cache", "0"]);
        assert_eq!(args.ingest_config().cache_bytes, 1 << 20);
    }

    #[test]
    fn detail_addr() {
        assert_eq!(parse(&[]).detail_addr(), Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(parse(&["--ip-detail", "not-an-ip"]).detail_addr(), None);
        assert_eq!(parse(&["--ip-detail", "::1"]).detail_addr(), None);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let result = Args::try_parse_from(["emitter-client", "--datagrams", "-1"]);
        assert!(result.is_err());
    }
}
