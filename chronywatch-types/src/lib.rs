//! # chronywatch-types
//!
//! Wire types shared between the chronywatch collector and anything that
//! consumes its reports (the bundled dashboard, scripts hitting `/data`,
//! tests).
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde. Field names follow the
//!   dashboard payload (`ntpCount`, `lastSeen`, ...).
//!
//! ## Example
//!
//! ```rust
//! use chronywatch_types::{ClientList, ClientRecord, ClientReport};
//!
//! let record = ClientRecord::from_line("myhost.local 12 0 64 64 3m 1").unwrap();
//! assert_eq!(record.last_seen, "3m");
//!
//! let list = ClientList::new(vec![record]);
//! let report = ClientReport::success(list, "2024-01-01 12:00:00");
//!
//! assert_eq!(report.count, 1);
//! assert!(report.error.is_none());
//! ```

mod kind;
mod record;
mod report;

pub use kind::*;
pub use record::*;
pub use report::*;
