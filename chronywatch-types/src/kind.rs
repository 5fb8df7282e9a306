//! Address classes used to group client rows.

use core::fmt;

/// The class of a client address.
///
/// The declaration order is the dashboard group order: hostnames first,
/// then IPv4, then IPv6. `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AddressKind {
    /// Anything that is not a valid IP literal.
    Hostname,
    /// Strict dotted-quad IPv4.
    Ipv4,
    /// Compressed or expanded IPv6 literal.
    Ipv6,
}

impl AddressKind {
    /// All kinds, in group order.
    pub const ALL: [AddressKind; 3] = [AddressKind::Hostname, AddressKind::Ipv4, AddressKind::Ipv6];

    /// Short lowercase label, also used as the Prometheus `kind` label.
    pub fn label(&self) -> &'static str {
        match self {
            AddressKind::Hostname => "hostname",
            AddressKind::Ipv4 => "ipv4",
            AddressKind::Ipv6 => "ipv6",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_order_is_hostname_ipv4_ipv6() {
        let mut kinds = vec![AddressKind::Ipv6, AddressKind::Hostname, AddressKind::Ipv4];
        kinds.sort();
        assert_eq!(kinds, AddressKind::ALL.to_vec());
    }

    #[test]
    fn test_labels() {
        assert_eq!(AddressKind::Hostname.to_string(), "hostname");
        assert_eq!(AddressKind::Ipv4.label(), "ipv4");
        assert_eq!(AddressKind::Ipv6.label(), "ipv6");
    }
}
