//! Address classification and per-class ordering.
//!
//! The leading token of a client row is either a resolved hostname or an
//! IP literal, depending on whether chronyd does reverse lookups. Rows are
//! grouped by class so the dashboard shows names, then IPv4, then IPv6.

use std::cmp::Ordering;
use std::net::{Ipv4Addr, Ipv6Addr};

use chronywatch_types::AddressKind;

/// A client address with its class and whatever the class sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedAddress<'a> {
    Hostname(&'a str),
    Ipv4(Ipv4Addr),
    Ipv6(&'a str),
}

impl<'a> ClassifiedAddress<'a> {
    /// Classify an address token.
    ///
    /// IPv4 requires a strict dotted quad (four octets in 0..=255, no
    /// leading zeros). IPv6 accepts compressed, expanded and
    /// embedded-IPv4 forms. Everything else, including numeric-looking
    /// strings like `999.1.1.1`, is a hostname.
    pub fn parse(address: &'a str) -> Self {
        if let Ok(v4) = address.parse::<Ipv4Addr>() {
            ClassifiedAddress::Ipv4(v4)
        } else if address.parse::<Ipv6Addr>().is_ok() {
            ClassifiedAddress::Ipv6(address)
        } else {
            ClassifiedAddress::Hostname(address)
        }
    }

    pub fn kind(&self) -> AddressKind {
        match self {
            ClassifiedAddress::Hostname(_) => AddressKind::Hostname,
            ClassifiedAddress::Ipv4(_) => AddressKind::Ipv4,
            ClassifiedAddress::Ipv6(_) => AddressKind::Ipv6,
        }
    }
}

/// Classify an address token.
pub fn classify(address: &str) -> AddressKind {
    ClassifiedAddress::parse(address).kind()
}

/// True for tokens that look like an IP literal but failed to parse.
///
/// Such rows still land in the hostname group; this only drives logging.
pub fn looks_like_ip(address: &str) -> bool {
    address.contains(':')
        || (address.contains('.') && address.chars().all(|c| c.is_ascii_digit() || c == '.'))
}

/// Case-insensitive ordering for hostnames.
pub fn compare_hostnames(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Numeric octet-wise ordering for IPv4.
pub fn compare_ipv4(a: &Ipv4Addr, b: &Ipv4Addr) -> Ordering {
    a.octets().cmp(&b.octets())
}

/// Plain lexicographic ordering on the literal text. No normalisation, so
/// `::1` and `0:0:0:0:0:0:0:1` sort as different strings.
pub fn compare_ipv6(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}
