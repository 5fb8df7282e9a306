//! Parsing, classification and report assembly for client listings.
//!
//! ## Submodules
//!
//! - [`address`]: Address classification (hostname, IPv4, IPv6) and per-class ordering
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "500ms")
//! - [`parser`]: Turns raw `chronyc clients` output into an ordered [`ClientList`]
//! - [`report`]: Builds [`ClientReport`] payloads and detects changes between them
//!
//! ## Data Flow
//!
//! ```text
//! raw stdout
//!        │
//!        ▼
//! parse_clients()  ── classify ── sort per class ── hostnames ▸ IPv4 ▸ IPv6
//!        │
//!        ▼
//! ClientList ──▶ build_report() ──▶ ClientReport ──▶ changed_since() / ReportCache::observe()
//! ```
//!
//! [`ClientList`]: chronywatch_types::ClientList
//! [`ClientReport`]: chronywatch_types::ClientReport

pub mod address;
pub mod duration;
pub mod parser;
pub mod report;

pub use address::{classify, ClassifiedAddress};
pub use parser::parse_clients;
pub use report::{build_report, changed_since, has_changed, local_timestamp, ReportCache};
