//! Plain-text findings report.
//!
//! Every ranked table is padded to its full length, so a short batch still
//! renders the same shape with empty rows at the bottom.

use std::net::Ipv4Addr;

use emitter_core::{Category, Findings, Occurrence, ReportError};
use emitter_proto::Protocol;
use time::OffsetDateTime;

/// Rows in each password/username table
pub const TOP_CREDENTIALS: usize = 5;
/// Rows in the HTTP user-agent table
pub const TOP_USER_AGENTS: usize = 30;
/// Rows in the SMTP email table
pub const TOP_EMAILS: usize = 20;
/// Rows in the submitter table
pub const TOP_SUBMITTERS: usize = 15;

const COLUMN_GAP: &str = "  ";

/// Left-aligned text table; the first row is the header.
struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(header: &[&str]) -> Self {
        Self { rows: vec![header.iter().map(|cell| (*cell).to_owned()).collect()] }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn render(&self, out: &mut String) {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for row in &self.rows {
            let mut line = String::new();
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    line.push_str(COLUMN_GAP);
                }
                line.push_str(&format!("{cell:<width$}", width = widths[col]));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
}

/// Render the full report.
///
/// Sections appear in a fixed order: SSH and TELNET credentials, HTTP
/// user-agents, SMTP emails, submitters, and finally the events sent by
/// `detail` when an address is given.
///
/// # Errors
///
/// Fails on the first section whose protocol has no events or whose
/// category was never observed.
pub fn render(findings: &Findings, detail: Option<Ipv4Addr>) -> Result<String, ReportError> {
    let mut sections = vec![
        credentials(findings, Protocol::SSH)?,
        credentials(findings, Protocol::TELNET)?,
        ranked(findings, Category::UserAgent, Protocol::HTTP, TOP_USER_AGENTS, "User-Agents")?,
        ranked(findings, Category::Email, Protocol::SMTP, TOP_EMAILS, "Email")?,
        submitters(findings),
    ];
    if let Some(addr) = detail {
        sections.push(submitter_detail(findings, addr));
    }

    Ok(sections.join("\n\n"))
}

fn section(heading: &str, table: &Table) -> String {
    let mut out = format!("{heading}\n\n");
    table.render(&mut out);
    out
}

fn ranked_cells(rank: usize, entry: &Occurrence) -> [String; 3] {
    [rank.to_string(), entry.label().to_owned(), entry.count().to_string()]
}

fn credentials(findings: &Findings, protocol: Protocol) -> Result<String, ReportError> {
    let passwords = findings.ranked(Category::Password, protocol, TOP_CREDENTIALS)?;
    let users = findings.ranked(Category::Username, protocol, TOP_CREDENTIALS)?;

    let mut table = Table::new(&["#", "Passwords", "Count", "", "Users", "Count"]);
    for (i, (password, user)) in passwords.iter().zip(&users).enumerate() {
        let [rank, label, count] = ranked_cells(i + 1, password);
        table.row(vec![
            rank,
            label,
            count,
            String::new(),
            user.label().to_owned(),
            user.count().to_string(),
        ]);
    }
    table.row(vec![
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        format!("TOTAL {protocol} EVENTS"),
        findings.protocol_total(protocol).to_string(),
    ]);

    Ok(section(
        &format!("What are the top {TOP_CREDENTIALS} {protocol} passwords and users?"),
        &table,
    ))
}

fn ranked(
    findings: &Findings,
    category: Category,
    protocol: Protocol,
    n: usize,
    column: &str,
) -> Result<String, ReportError> {
    let entries = findings.ranked(category, protocol, n)?;

    let mut table = Table::new(&["#", column, "Count"]);
    for (i, entry) in entries.iter().enumerate() {
        table.row(ranked_cells(i + 1, entry).to_vec());
    }
    table.row(vec![
        String::new(),
        format!("TOTAL {protocol} EVENTS"),
        findings.protocol_total(protocol).to_string(),
    ]);

    Ok(section(&format!("What are the top {n} {protocol} {category}?"), &table))
}

fn submitters(findings: &Findings) -> String {
    let mut table = Table::new(&["#", "IP Address", "Count"]);
    for (i, entry) in findings.submitters().top(TOP_SUBMITTERS).iter().enumerate() {
        table.row(ranked_cells(i + 1, entry).to_vec());
    }
    table.row(vec![String::new(), "TOTAL EVENTS".to_owned(), findings.total_events().to_string()]);

    section(&format!("Who are the top {TOP_SUBMITTERS} submitters?"), &table)
}

fn submitter_detail(findings: &Findings, addr: Ipv4Addr) -> String {
    let mut table = Table::new(&["#", "Event UUID", "Protocol", "Timestamp"]);
    match findings.submitter(addr) {
        Some(entry) => {
            for (i, event) in entry.events().iter().enumerate() {
                table.row(vec![
                    (i + 1).to_string(),
                    event.uuid().to_string(),
                    event.protocol().to_string(),
                    date(event.timestamp()),
                ]);
            }
        },
        None => table.row(vec![
            String::new(),
            "NO".to_owned(),
            "EVENTS".to_owned(),
            "FOUND".to_owned(),
        ]),
    }

    section(&format!("What events did {addr} submit?"), &table)
}

/// `YYYY-MM-DD` in UTC
fn date(timestamp: u32) -> String {
    match OffsetDateTime::from_unix_timestamp(i64::from(timestamp)) {
        Ok(dt) => format!("{:04}-{:02}-{:02}", dt.year(), u8::from(dt.month()), dt.day()),
        Err(_) => timestamp.to_string(),
    }
}
