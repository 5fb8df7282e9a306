//! Parsing of `chronyc clients` output.
//!
//! ```text
//! Hostname                      NTP   Drop Int IntL Last     Cmd   Drop Int  Last
//! ===============================================================================
//! ntp-client.lan                 12      0   6   6    3m       1      0   -     -
//! 10.0.0.2                        3      1   6   -     5s      0      0   -     -
//! ```
//!
//! The first two non-blank lines are header metadata. Every following
//! line is a client row whose first token is the address.

use std::net::Ipv4Addr;

use chronywatch_types::{ClientList, ClientRecord};
use tracing::{debug, trace};

use super::address::{compare_hostnames, compare_ipv4, compare_ipv6, looks_like_ip, ClassifiedAddress};

/// Lines before the first client row (column header and separator).
pub const HEADER_LINES: usize = 2;

/// Fewer non-blank lines than this means no client rows.
pub const MIN_LINES: usize = HEADER_LINES + 1;

/// Body rows bucketed by address class, in input order until sorted.
#[derive(Debug, Default)]
struct Groups<'a> {
    hostnames: Vec<(&'a str, &'a str)>,
    ipv4: Vec<(Ipv4Addr, &'a str)>,
    ipv6: Vec<(&'a str, &'a str)>,
}

impl<'a> Groups<'a> {
    fn push(&mut self, line: &'a str) {
        let Some(address) = line.split_whitespace().next() else {
            return;
        };

        match ClassifiedAddress::parse(address) {
            ClassifiedAddress::Hostname(name) => {
                if looks_like_ip(name) {
                    trace!(address = name, "address is not a valid IP literal, grouping as hostname");
                }
                self.hostnames.push((name, line));
            }
            ClassifiedAddress::Ipv4(v4) => self.ipv4.push((v4, line)),
            ClassifiedAddress::Ipv6(v6) => self.ipv6.push((v6, line)),
        }
    }

    /// Sort each group (stable) and yield lines in display order.
    fn into_sorted_lines(mut self) -> impl Iterator<Item = &'a str> {
        self.hostnames.sort_by(|a, b| compare_hostnames(a.0, b.0));
        self.ipv4.sort_by(|a, b| compare_ipv4(&a.0, &b.0));
        self.ipv6.sort_by(|a, b| compare_ipv6(a.0, b.0));

        self.hostnames
            .into_iter()
            .map(|(_, line)| line)
            .chain(self.ipv4.into_iter().map(|(_, line)| line))
            .chain(self.ipv6.into_iter().map(|(_, line)| line))
    }
}

/// Split raw output into trimmed, non-blank lines.
pub fn significant_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse raw `chronyc clients` output into records in display order.
///
/// Never fails: short output yields an empty list, and rows whose
/// address does not parse as IP are grouped with hostnames.
pub fn parse_clients(raw: &str) -> ClientList {
    let lines = significant_lines(raw);
    if lines.len() < MIN_LINES {
        debug!(lines = lines.len(), "output has no client rows");
        return ClientList::default();
    }

    let mut groups = Groups::default();
    for line in &lines[HEADER_LINES..] {
        groups.push(line);
    }

    let records: Vec<ClientRecord> = groups
        .into_sorted_lines()
        .filter_map(ClientRecord::from_line)
        .collect();

    debug!(count = records.len(), "parsed client rows");
    ClientList::new(records)
}
