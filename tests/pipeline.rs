//! End-to-end behaviour of the parse-classify-sort pipeline.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

use chronywatch::{
    classify, collect, parse_clients, AddressKind, ClientRecord, Collector, CommandSource, FileSource,
    ReportCache,
};
use proptest::prelude::*;

const HEADER: &str = "Hostname                      NTP   Drop Int IntL Last     Cmd   Drop Int  Last\n\
    ===============================================================================\n";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn with_header(rows: &[&str]) -> String {
    let mut out = HEADER.to_string();
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

fn ipv4_address() -> impl Strategy<Value = String> {
    any::<[u8; 4]>().prop_map(|o| Ipv4Addr::from(o).to_string())
}

fn ipv6_address() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<u16>().prop_map(|g| format!("2001:db8::{:x}", g)),
        any::<[u8; 4]>().prop_map(|o| format!("::ffff:{}", Ipv4Addr::from(o))),
        any::<u128>().prop_map(|v| std::net::Ipv6Addr::from(v).to_string()),
    ]
}

fn hostname() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9-]{0,12}(\\.[a-z]{2,5})?",
        // dotted quads out of range stay hostnames
        (256u16..1000, any::<u8>()).prop_map(|(a, b)| format!("{}.{}.1.1", a, b)),
    ]
}

fn address() -> impl Strategy<Value = String> {
    prop_oneof![ipv4_address(), ipv6_address(), hostname()]
}

/// One body row: an address followed by up to eight columns.
fn row() -> impl Strategy<Value = String> {
    (address(), prop::collection::vec("[0-9]{1,4}|-|[0-9]{1,2}[smh]", 0..8))
        .prop_map(|(address, columns)| {
            let mut row = address;
            for column in columns {
                row.push_str("  ");
                row.push_str(&column);
            }
            row
        })
}

/// Raw output plus its number of body rows. Each row may be followed by
/// a whitespace-only line and may carry trailing whitespace.
fn output() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec((row(), "[ \t]{0,3}", any::<bool>()), 0..40).prop_map(|rows| {
        let mut out = HEADER.to_string();
        for (row, trailing, blank_after) in &rows {
            out.push_str(row);
            out.push_str(trailing);
            out.push('\n');
            if *blank_after {
                out.push_str("   \n");
            }
        }
        (out, rows.len())
    })
}

#[test]
fn scenario_ipv4_rows_sorted_numerically() {
    let list = parse_clients(&with_header(&[
        "192.168.1.10 5 0 64 - 10s 0",
        "10.0.0.2 3 1 64 - 5s 0",
    ]));
    assert_eq!(list.addresses(), vec!["10.0.0.2", "192.168.1.10"]);
}

#[test]
fn scenario_two_lines_is_empty_without_error() {
    let list = parse_clients(HEADER);
    assert_eq!(list.count(), 0);
    assert!(list.is_empty());
}

#[tokio::test]
async fn scenario_failed_invocation_reports_error() {
    let source = CommandSource::new("sh", ["-c", "exit 1"]);
    let report = collect(&source).await;
    assert!(report.clients.is_empty());
    assert_eq!(report.count, 0);
    assert!(!report.error.unwrap().is_empty());
}

#[test]
fn scenario_full_row_mapping() {
    let list = parse_clients(&with_header(&["myhost.local 12 0 64 64 3m 1"]));
    assert_eq!(
        list.records(),
        &[ClientRecord {
            address: "myhost.local".to_string(),
            ntp_count: "12".to_string(),
            drop_count: "0".to_string(),
            interval: "64".to_string(),
            interval_last: "64".to_string(),
            last_seen: "3m".to_string(),
            cmd_count: "1".to_string(),
        }]
    );
}

#[test]
fn scenario_address_only_row() {
    let list = parse_clients(&with_header(&["lonely.example"]));
    assert_eq!(list.records(), &[ClientRecord::new("lonely.example")]);
}

#[test]
fn hostnames_sort_case_insensitively() {
    let list = parse_clients(&with_header(&["Zeta", "alpha"]));
    assert_eq!(list.addresses(), vec!["alpha", "Zeta"]);
}

#[test]
fn ipv6_with_embedded_ipv4_stays_in_ipv6_group() {
    let list = parse_clients(&with_header(&["::ffff:192.168.1.10 1", "10.0.0.1 1", "host 1"]));
    assert_eq!(list.addresses(), vec!["host", "10.0.0.1", "::ffff:192.168.1.10"]);
    assert_eq!(classify("::ffff:192.168.1.10"), AddressKind::Ipv6);
}

#[test]
fn fixture_file_parses_in_display_order() {
    let raw = std::fs::read_to_string(fixture("clients.txt")).unwrap();
    let list = parse_clients(&raw);
    assert_eq!(
        list.addresses(),
        vec![
            "999.1.1.1",
            "alpha.lan",
            "printer.lan",
            "Workstation-07.lan",
            "9.9.9.9",
            "10.0.0.2",
            "192.168.1.10",
            "::ffff:10.0.0.77",
            "fe80::1c2d:3eff:fe4f:5a6b",
        ]
    );
    assert_eq!(list.get("printer.lan").unwrap().interval, "10");
    assert_eq!(list.get("alpha.lan").unwrap().ntp_count, "");
}

#[tokio::test]
async fn fixture_file_through_collector() {
    let collector = Collector::new(Arc::new(FileSource::new(fixture("clients.txt"))));
    let report = collector.refresh(&mut ReportCache::new()).await;
    assert_eq!(report.count, 9);
    assert!(report.changed);
    assert!(report.error.is_none());
}

proptest! {
    #[test]
    fn prop_count_matches_body_rows((raw, rows) in output()) {
        prop_assert_eq!(parse_clients(&raw).count(), rows);
    }

    #[test]
    fn prop_groups_in_order_and_each_sorted((raw, _) in output()) {
        let list = parse_clients(&raw);

        let kinds: Vec<AddressKind> = list.iter().map(|r| classify(&r.address)).collect();
        prop_assert!(kinds.windows(2).all(|w| w[0] <= w[1]), "{:?}", kinds);

        let v4: Vec<Ipv4Addr> = list.iter().filter_map(|r| r.address.parse().ok()).collect();
        prop_assert!(v4.windows(2).all(|w| w[0].octets() <= w[1].octets()));

        let names: Vec<String> = list
            .iter()
            .filter(|r| classify(&r.address) == AddressKind::Hostname)
            .map(|r| r.address.to_lowercase())
            .collect();
        prop_assert!(names.windows(2).all(|w| w[0] <= w[1]));

        let v6: Vec<&str> = list
            .iter()
            .filter(|r| classify(&r.address) == AddressKind::Ipv6)
            .map(|r| r.address.as_str())
            .collect();
        prop_assert!(v6.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_parse_is_idempotent((raw, _) in output()) {
        prop_assert_eq!(parse_clients(&raw), parse_clients(&raw));
    }

    #[test]
    fn prop_every_row_is_kept((raw, _) in output()) {
        let list = parse_clients(&raw);
        for line in raw.lines().skip(2).map(str::trim_end).filter(|l| !l.is_empty()) {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let record = list.get(tokens[0]);
            prop_assert!(record.is_some(), "row {:?} missing", line);
        }
    }
}
