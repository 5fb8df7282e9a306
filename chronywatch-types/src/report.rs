//! Parsed client lists and the dashboard report built from them.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::ClientRecord;

/// The ordered result of one parse cycle.
///
/// Order is display order: hostnames, then IPv4, then IPv6, each group
/// sorted by its own rule. An empty list means the daemon reported no
/// clients; it is never used to signal a failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClientList {
    records: Vec<ClientRecord>,
}

impl ClientList {
    /// Wrap records that are already in display order.
    pub fn new(records: Vec<ClientRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Check if the daemon reported no clients.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records in display order.
    pub fn records(&self) -> &[ClientRecord] {
        &self.records
    }

    /// Iterate over the records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ClientRecord> {
        self.records.iter()
    }

    /// Get a record by address (first match).
    pub fn get(&self, address: &str) -> Option<&ClientRecord> {
        self.records.iter().find(|r| r.address == address)
    }

    /// Addresses in display order.
    pub fn addresses(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.address.as_str()).collect()
    }

    /// Consume the list, returning the records.
    pub fn into_records(self) -> Vec<ClientRecord> {
        self.records
    }
}

impl IntoIterator for ClientList {
    type Item = ClientRecord;
    type IntoIter = std::vec::IntoIter<ClientRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClientList {
    type Item = &'a ClientRecord;
    type IntoIter = std::slice::Iter<'a, ClientRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Payload served to the dashboard on every poll.
///
/// A failed invocation yields an empty `clients`, `count == 0` and
/// `error` set. A successful one always has `error == None`, even when
/// there are no clients.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientReport {
    /// Local time the report was collected, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,

    /// Number of entries in `clients`.
    pub count: usize,

    /// Records in display order.
    pub clients: Vec<ClientRecord>,

    /// Human-readable invocation failure, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub error: Option<String>,

    /// Digest of `clients` and `error`. Viewers send it back to learn
    /// whether anything changed since their last render.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fingerprint: String,

    /// Whether the content differs from what the requesting viewer last
    /// saw. Set by the serving layer.
    #[cfg_attr(feature = "serde", serde(default))]
    pub changed: bool,
}

impl ClientReport {
    /// Report for a successful parse cycle.
    pub fn success(list: ClientList, timestamp: impl Into<String>) -> Self {
        let clients = list.into_records();
        Self {
            timestamp: timestamp.into(),
            count: clients.len(),
            fingerprint: fingerprint(&clients, None),
            clients,
            error: None,
            changed: false,
        }
    }

    /// Report for a failed invocation.
    pub fn failure(message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            timestamp: timestamp.into(),
            count: 0,
            fingerprint: fingerprint(&[], Some(message.as_str())),
            clients: Vec::new(),
            error: Some(message),
            changed: false,
        }
    }

    /// Check if the invocation behind this report failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Compare what the dashboard would show, ignoring `timestamp` and
    /// `changed`.
    pub fn same_content(&self, other: &ClientReport) -> bool {
        self.clients == other.clients && self.error == other.error
    }
}

/// Hex digest over the displayed content. Stable within one build of
/// the server, which is all a polling page needs.
fn fingerprint(clients: &[ClientRecord], error: Option<&str>) -> String {
    let mut hasher = DefaultHasher::new();
    clients.hash(&mut hasher);
    error.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
