//! Originating application protocol of an event.
//!
//! Only four tags are known. Anything else is still a legal value: it
//! round-trips unchanged and renders as `UNKNOWN`.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// Application protocol tag (Big Endian `u16` on the wire)
///
/// Equality, ordering and hashing go through the wire tag, so
/// `Unknown(Protocol::SSH_TAG)` and `SSH` are the same protocol.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub enum Protocol {
    /// HTTP
    HTTP,
    /// SMTP
    SMTP,
    /// SSH
    SSH,
    /// Teletype Network
    TELNET,
    /// Any other tag, carried through untouched. A known tag wrapped here
    /// still compares equal to its named variant; [`Protocol::canonical`]
    /// rewrites it.
    Unknown(u16),
}

impl Protocol {
    /// Wire tag for HTTP
    pub const HTTP_TAG: u16 = 0x0A;
    /// Wire tag for SMTP
    pub const SMTP_TAG: u16 = 0x11;
    /// Wire tag for SSH
    pub const SSH_TAG: u16 = 0x31;
    /// Wire tag for TELNET
    pub const TELNET_TAG: u16 = 0x23;

    /// Label for every unrecognized tag
    pub const UNKNOWN_LABEL: &'static str = "UNKNOWN";

    /// Convert from the wire tag. Total: unknown tags map to [`Self::Unknown`].
    pub const fn from_u16(tag: u16) -> Self {
        match tag {
            Self::HTTP_TAG => Self::HTTP,
            Self::SMTP_TAG => Self::SMTP,
            Self::SSH_TAG => Self::SSH,
            Self::TELNET_TAG => Self::TELNET,
            other => Self::Unknown(other),
        }
    }

    /// Convert to the wire tag
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::HTTP => Self::HTTP_TAG,
            Self::SMTP => Self::SMTP_TAG,
            Self::SSH => Self::SSH_TAG,
            Self::TELNET => Self::TELNET_TAG,
            Self::Unknown(tag) => tag,
        }
    }

    /// Same protocol with known tags always in their named variant
    #[must_use]
    pub const fn canonical(self) -> Self {
        Self::from_u16(self.to_u16())
    }

    /// Human-readable name. Never empty.
    pub const fn label(self) -> &'static str {
        match self.canonical() {
            Self::HTTP => "HTTP",
            Self::SMTP => "SMTP",
            Self::SSH => "SSH",
            Self::TELNET => "TELNET",
            Self::Unknown(_) => Self::UNKNOWN_LABEL,
        }
    }
}

impl PartialEq for Protocol {
    fn eq(&self, other: &Self) -> bool {
        self.to_u16() == other.to_u16()
    }
}

impl Eq for Protocol {}

impl Hash for Protocol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_u16().hash(state);
    }
}

impl PartialOrd for Protocol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Protocol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_u16().cmp(&other.to_u16())
    }
}

impl From<u16> for Protocol {
    fn from(tag: u16) -> Self {
        Self::from_u16(tag)
    }
}

impl From<Protocol> for u16 {
    fn from(protocol: Protocol) -> Self {
        protocol.to_u16()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn every_tag_round_trips(tag in any::<u16>()) {
            prop_assert_eq!(Protocol::from_u16(tag).to_u16(), tag);
        }

        #[test]
        fn equality_follows_the_wire_tag(a in any::<u16>(), b in any::<u16>()) {
            prop_assert_eq!(Protocol::Unknown(a) == Protocol::from_u16(b), a == b);
            prop_assert_eq!(Protocol::Unknown(a).cmp(&Protocol::from_u16(b)), a.cmp(&b));
        }

        #[test]
        fn every_tag_has_a_label(tag in any::<u16>()) {
            let protocol = Protocol::from_u16(tag);
            prop_assert!(!protocol.label().is_empty());
            let known =
                [Protocol::HTTP_TAG, Protocol::SMTP_TAG, Protocol::SSH_TAG, Protocol::TELNET_TAG];
            if !known.contains(&tag) {
                prop_assert_eq!(protocol.label(), Protocol::UNKNOWN_LABEL);
            }
        }
    }

    #[test]
    fn known_labels() {
        assert_eq!(Protocol::from_u16(0x0A).to_string(), "HTTP");
        assert_eq!(Protocol::from_u16(0x11).to_string(), "SMTP");
        assert_eq!(Protocol::from_u16(0x31).to_string(), "SSH");
        assert_eq!(Protocol::from_u16(0x23).to_string(), "TELNET");
    }

    #[test]
    fn wrapped_known_tag_is_the_named_protocol() {
        let wrapped = Protocol::Unknown(Protocol::SSH_TAG);
        assert_eq!(wrapped, Protocol::SSH);
        assert_eq!(wrapped.label(), "SSH");
        assert!(matches!(wrapped.canonical(), Protocol::SSH));

        let set: HashSet<Protocol> = [wrapped, Protocol::SSH].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_ne!(Protocol::Unknown(0x99), Protocol::Unknown(0x98));
    }

    #[test]
    fn orders_by_wire_tag() {
        let mut protocols =
            vec![Protocol::SSH, Protocol::Unknown(0x01), Protocol::HTTP, Protocol::TELNET];
        protocols.sort();
        assert_eq!(protocols, [
            Protocol::Unknown(0x01),
            Protocol::HTTP,
            Protocol::TELNET,
            Protocol::SSH
        ]);
    }

    #[test]
    fn unknown_label() {
        assert_eq!(Protocol::from_u16(0).to_string(), "UNKNOWN");
        assert_eq!(Protocol::Unknown(0xFFFF).label(), "UNKNOWN");
    }
}
