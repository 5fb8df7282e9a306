//! # chronywatch
//!
//! A web dashboard for the clients of a chrony NTP server.
//!
//! Every poll runs `chronyc clients` once, parses the table, groups rows
//! into hostnames, IPv4 and IPv6 (each sorted its own way), and serves
//! the result as JSON to a small self-refreshing page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ┌─────────┐    ┌──────────┐    ┌───────────┐    ┌────────┐ │
//! │  │ source  │───▶│   data   │───▶│ collector │───▶│ server │ │
//! │  │ (input) │    │ (parse)  │    │ (report)  │    │ (HTTP) │ │
//! │  └─────────┘    └──────────┘    └───────────┘    └────────┘ │
//! │       ▲                                                      │
//! │  CommandSource | FileSource                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: [`ClientSource`] trait with implementations for running
//!   the command and for reading captured output
//! - **[`data`]**: The parse-classify-sort pipeline, report assembly and
//!   change detection
//! - **[`collector`]**: One fetch-parse-report cycle per call
//! - **[`server`]**: hyper-based dashboard, JSON, Prometheus and health endpoints
//! - **[`config`]**: Layered settings (defaults, TOML file, environment)
//!
//! ## Usage
//!
//! ### Parsing captured output
//!
//! ```
//! use chronywatch::parse_clients;
//!
//! let raw = "\
//! Hostname                      NTP   Drop Int IntL Last     Cmd   Drop Int  Last
//! ===============================================================================
//! 192.168.1.10                    5      0  64   -    10s      0      0   -     -
//! 10.0.0.2                        3      1  64   -     5s      0      0   -     -
//! ntp-client.lan                 12      0  64  64     3m      1      0   -     -
//! ";
//!
//! let clients = parse_clients(raw);
//! assert_eq!(clients.addresses(), vec!["ntp-client.lan", "10.0.0.2", "192.168.1.10"]);
//! ```
//!
//! ### Collecting a report
//!
//! ```no_run
//! use chronywatch::{collect, CommandSource};
//!
//! # tokio_test::block_on(async {
//! let report = collect(&CommandSource::chronyc()).await;
//! println!("{} clients at {}", report.count, report.timestamp);
//! # });
//! ```

pub mod collector;
pub mod config;
pub mod data;
pub mod logging;
pub mod server;
pub mod source;

// Re-export main types for convenience
pub use chronywatch_types::{AddressKind, ClientList, ClientRecord, ClientReport, RECORD_FIELDS};
pub use collector::{collect, Collector};
pub use config::Settings;
pub use data::{changed_since, classify, has_changed, parse_clients, ReportCache};
pub use source::{ClientSource, CommandSource, FileSource, InvocationError};
