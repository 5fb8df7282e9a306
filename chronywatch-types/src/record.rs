//! A single client row from `chronyc clients`.

/// Payload names of the positional columns following the address.
///
/// Token `n` after the address always lands in `RECORD_FIELDS[n - 1]`,
/// whatever the daemon prints there. Missing tokens become empty strings
/// and tokens past the sixth are ignored.
pub const RECORD_FIELDS: [&str; 6] = [
    "ntpCount",
    "dropCount",
    "interval",
    "intervalLast",
    "lastSeen",
    "cmdCount",
];

/// One parsed line of client-registry output.
///
/// All columns stay as the daemon printed them. Values such as `-` or
/// `3m` are meaningful to a reader of the dashboard and are not
/// normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ClientRecord {
    /// Hostname, dotted-quad IPv4 or IPv6 literal.
    pub address: String,
    /// NTP packets received from the client.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ntp_count: String,
    /// NTP packets dropped by rate limiting.
    #[cfg_attr(feature = "serde", serde(default))]
    pub drop_count: String,
    /// Average interval between NTP packets (log2 seconds).
    #[cfg_attr(feature = "serde", serde(default))]
    pub interval: String,
    /// Interval between the last two NTP packets (log2 seconds).
    #[cfg_attr(feature = "serde", serde(default))]
    pub interval_last: String,
    /// Time since the last NTP packet.
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_seen: String,
    /// Command packets received from the client.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cmd_count: String,
}

impl ClientRecord {
    /// Create a record with only an address set.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Build a record from whitespace-delimited tokens.
    ///
    /// The first token is the address. Returns `None` only when there are
    /// no tokens at all.
    pub fn from_tokens<'a, I>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tokens = tokens.into_iter();
        let address = tokens.next()?;
        let rest: Vec<&str> = tokens.take(RECORD_FIELDS.len()).collect();

        Some(Self {
            address: address.to_string(),
            ntp_count: field_or_empty(&rest, 0),
            drop_count: field_or_empty(&rest, 1),
            interval: field_or_empty(&rest, 2),
            interval_last: field_or_empty(&rest, 3),
            last_seen: field_or_empty(&rest, 4),
            cmd_count: field_or_empty(&rest, 5),
        })
    }

    /// Split a line on whitespace and build a record from it.
    pub fn from_line(line: &str) -> Option<Self> {
        Self::from_tokens(line.split_whitespace())
    }

    /// Look up a positional column by its payload name.
    ///
    /// ```rust
    /// use chronywatch_types::ClientRecord;
    ///
    /// let r = ClientRecord::from_line("10.0.0.2 3 1").unwrap();
    /// assert_eq!(r.field("dropCount"), Some("1"));
    /// assert_eq!(r.field("cmdCount"), Some(""));
    /// assert_eq!(r.field("bogus"), None);
    /// ```
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "address" => &self.address,
            "ntpCount" => &self.ntp_count,
            "dropCount" => &self.drop_count,
            "interval" => &self.interval,
            "intervalLast" => &self.interval_last,
            "lastSeen" => &self.last_seen,
            "cmdCount" => &self.cmd_count,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// The six positional columns in `RECORD_FIELDS` order.
    pub fn columns(&self) -> [&str; 6] {
        [
            &self.ntp_count,
            &self.drop_count,
            &self.interval,
            &self.interval_last,
            &self.last_seen,
            &self.cmd_count,
        ]
    }
}

fn field_or_empty(tokens: &[&str], index: usize) -> String {
    tokens.get(index).map(|t| t.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line_maps_all_columns() {
        let r = ClientRecord::from_line("myhost.local 12 0 64 64 3m 1").unwrap();
        assert_eq!(r.address, "myhost.local");
        assert_eq!(r.ntp_count, "12");
        assert_eq!(r.drop_count, "0");
        assert_eq!(r.interval, "64");
        assert_eq!(r.interval_last, "64");
        assert_eq!(r.last_seen, "3m");
        assert_eq!(r.cmd_count, "1");
    }

    #[test]
    fn test_from_line_address_only_defaults_to_empty() {
        let r = ClientRecord::from_line("lonely.example").unwrap();
        assert_eq!(r, ClientRecord::new("lonely.example"));
        assert!(r.columns().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_from_line_ignores_extra_columns() {
        // chronyc prints Drop/Int/Last for command packets after Cmd
        let r = ClientRecord::from_line("10.1.1.1 5 0 6 - 31 2 0 - -").unwrap();
        assert_eq!(r.cmd_count, "2");
        assert_eq!(r.columns().len(), RECORD_FIELDS.len());
    }

    #[test]
    fn test_from_line_blank_is_none() {
        assert!(ClientRecord::from_line("   ").is_none());
        assert!(ClientRecord::from_tokens(Vec::<&str>::new()).is_none());
    }

    #[test]
    fn test_field_names_match_columns() {
        let r = ClientRecord::from_line("h 1 2 3 4 5 6").unwrap();
        for (name, value) in RECORD_FIELDS.iter().zip(r.columns()) {
            assert_eq!(r.field(name), Some(value));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_with_payload_names() {
        let r = ClientRecord::from_line("myhost.local 12 0 64 64 3m 1").unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["address"], "myhost.local");
        assert_eq!(json["ntpCount"], "12");
        assert_eq!(json["intervalLast"], "64");
        assert_eq!(json["lastSeen"], "3m");
        assert_eq!(json["cmdCount"], "1");
        assert_eq!(json.as_object().unwrap().len(), 7);
    }
}
