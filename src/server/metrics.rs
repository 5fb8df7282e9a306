//! Prometheus exposition format for client reports.
//!
//! Served at `/metrics` so the same host can be scraped instead of
//! watched in a browser.

use std::fmt::Write;

use chronywatch_types::{AddressKind, ClientReport};

use crate::data::classify;

/// Format a report in the Prometheus text exposition format.
///
/// Per-client series are only emitted for columns that parse as integers;
/// `-` and other placeholders are skipped.
pub fn format_prometheus(report: &ClientReport, namespace: Option<&str>) -> String {
    let mut output = String::new();
    let prefix = namespace.map(|n| format!("{}_", n)).unwrap_or_default();

    push_family(
        &mut output,
        &prefix,
        "chronywatch_up",
        "gauge",
        "Whether the last chronyc invocation succeeded",
    );
    let _ = writeln!(output, "{}chronywatch_up {}", prefix, u8::from(!report.is_error()));

    push_family(
        &mut output,
        &prefix,
        "chronywatch_clients",
        "gauge",
        "Number of clients known to chronyd, by address kind",
    );
    for kind in AddressKind::ALL {
        let count = report
            .clients
            .iter()
            .filter(|r| classify(&r.address) == kind)
            .count();
        let _ = writeln!(
            output,
            "{}chronywatch_clients{{kind=\"{}\"}} {}",
            prefix,
            kind.label(),
            count
        );
    }

    let counters = [
        (
            "chronywatch_client_ntp_packets",
            "NTP packets received from the client",
            "ntpCount",
        ),
        (
            "chronywatch_client_dropped_packets",
            "NTP packets from the client dropped by rate limiting",
            "dropCount",
        ),
        (
            "chronywatch_client_command_packets",
            "Command packets received from the client",
            "cmdCount",
        ),
    ];

    for (name, help, column) in counters {
        push_family(&mut output, &prefix, name, "counter", help);
        for record in &report.clients {
            if let Some(value) = record.field(column).and_then(|v| v.parse::<u64>().ok()) {
                let _ = writeln!(
                    output,
                    "{}{}{{address=\"{}\"}} {}",
                    prefix,
                    name,
                    escape_label_value(&record.address),
                    value
                );
            }
        }
    }

    output
}

fn push_family(output: &mut String, prefix: &str, name: &str, kind: &str, help: &str) {
    let _ = writeln!(output, "# HELP {}{} {}", prefix, name, help);
    let _ = writeln!(output, "# TYPE {}{} {}", prefix, name, kind);
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
