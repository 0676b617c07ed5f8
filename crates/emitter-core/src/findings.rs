//! Occurrence aggregation over validated events.
//!
//! [`Findings`] tallies every tracked payload value per protocol and every
//! submitter address. Rankings come from [`OccurrenceTable::top`], which sorts
//! by count descending, breaks ties by label ascending, and pads short
//! results with empty placeholders.

use std::{collections::HashMap, fmt, net::Ipv4Addr};

use emitter_proto::{Event, Protocol};
use tracing::warn;

use crate::error::ReportError;

/// Shared empty entry returned when a ranking asks for more rows than exist.
static PLACEHOLDER: Occurrence = Occurrence { label: String::new(), count: 0, events: Vec::new() };

/// Payload field tracked per protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// `email`
    Email,
    /// `password`
    Password,
    /// `username`
    Username,
    /// `user-agent`
    UserAgent,
}

impl Category {
    /// Every tracked category
    pub const ALL: [Self; 4] = [Self::Email, Self::Password, Self::Username, Self::UserAgent];

    /// Payload key this category is read from
    pub const fn key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Username => "username",
            Self::UserAgent => "user-agent",
        }
    }

    /// Look up the category for a payload key. Keys are case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }
}

/// Rendered as the plural noun used in reports (`passwords`, `users`).
impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Email => "emails",
            Self::Password => "passwords",
            Self::Username => "users",
            Self::UserAgent => "user-agents",
        })
    }
}

/// One observed label and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Occurrence {
    label: String,
    count: usize,
    events: Vec<Event>,
}

impl Occurrence {
    fn new(label: &str) -> Self {
        Self { label: label.to_owned(), count: 0, events: Vec::new() }
    }

    /// Observed value. Empty for placeholders.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of observations. Zero for placeholders.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Events attributed to this label, in arrival order.
    ///
    /// Only submitter entries retain events; payload value entries only count.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether this entry pads a ranking rather than reflecting an observation
    pub fn is_placeholder(&self) -> bool {
        self.count == 0 && self.label.is_empty()
    }
}

/// Label to [`Occurrence`] mapping with a top-N ranking.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceTable {
    entries: HashMap<String, Occurrence>,
}

impl OccurrenceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one observation of `label` and return its entry.
    pub fn record(&mut self, label: &str) -> &mut Occurrence {
        let entry = self.entries.entry(label.to_owned()).or_insert_with(|| Occurrence::new(label));
        entry.count += 1;
        entry
    }

    /// Entry for `label`, if it was ever observed
    pub fn get(&self, label: &str) -> Option<&Occurrence> {
        self.entries.get(label)
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was observed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every entry's count
    pub fn total(&self) -> usize {
        self.entries.values().map(Occurrence::count).sum()
    }

    /// Exactly `n` entries: count descending, ties by label ascending.
    ///
    /// When fewer than `n` labels exist the tail is filled with empty
    /// placeholders (see [`Occurrence::is_placeholder`]).
    pub fn top(&self, n: usize) -> Vec<&Occurrence> {
        let mut ranked: Vec<&Occurrence> = self.entries.values().collect();
        ranked.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        ranked.truncate(n);
        ranked.resize(n, &PLACEHOLDER);
        ranked
    }
}

/// Accounting of a batch of validated events.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    total_events: usize,
    by_protocol: HashMap<Protocol, usize>,
    tables: HashMap<(Category, Protocol), OccurrenceTable>,
    submitters: OccurrenceTable,
}

impl Findings {
    /// Create empty findings
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every event in order.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut findings = Self::new();
        for event in events {
            findings.record(event);
        }
        findings
    }

    /// Tally one event.
    ///
    /// Tracked payload keys are counted under the event's protocol. Any other
    /// key is logged and ignored. The event itself is kept under its
    /// submitter address.
    pub fn record(&mut self, event: Event) {
        self.total_events += 1;
        *self.by_protocol.entry(event.protocol()).or_default() += 1;

        for (key, value) in event.decoded_payload() {
            let Some(category) = Category::from_key(key) else {
                warn!(uuid = %event.uuid(), key = %key, "unknown event payload key");
                continue;
            };
            self.tables.entry((category, event.protocol())).or_default().record(value);
        }

        let label = event.submitter_addr().to_string();
        self.submitters.record(&label).events.push(event);
    }

    /// Number of events recorded
    pub fn total_events(&self) -> usize {
        self.total_events
    }

    /// Number of events recorded for `protocol`
    pub fn protocol_total(&self, protocol: Protocol) -> usize {
        self.by_protocol.get(&protocol).copied().unwrap_or(0)
    }

    /// Per-protocol table for a tracked category, if any value was observed
    pub fn table(&self, category: Category, protocol: Protocol) -> Option<&OccurrenceTable> {
        self.tables.get(&(category, protocol))
    }

    /// Submitter addresses with the events each one sent
    pub fn submitters(&self) -> &OccurrenceTable {
        &self.submitters
    }

    /// Entry for a single submitter address
    pub fn submitter(&self, addr: Ipv4Addr) -> Option<&Occurrence> {
        self.submitters.get(&addr.to_string())
    }

    /// Top `n` values of `category` observed under `protocol`.
    ///
    /// # Errors
    ///
    /// - [`ReportError::NoEvents`] if no event carried `protocol`
    /// - [`ReportError::NoObservations`] if events exist but none carried
    ///   `category`
    pub fn ranked(
        &self,
        category: Category,
        protocol: Protocol,
        n: usize,
    ) -> Result<Vec<&Occurrence>, ReportError> {
        if self.protocol_total(protocol) == 0 {
            return Err(ReportError::NoEvents(protocol));
        }

        self.table(category, protocol)
            .map(|table| table.top(n))
            .ok_or(ReportError::NoObservations { category, protocol })
    }
}
