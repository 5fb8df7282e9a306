//! Sources of raw client-listing output.
//!
//! This module provides a trait-based abstraction over where the text of
//! `chronyc clients` comes from: running the command, or reading output
//! captured earlier.

mod command;
mod error;
mod file;

pub use command::{CommandSource, DEFAULT_TIMEOUT};
pub use error::InvocationError;
pub use file::FileSource;

use std::fmt::Debug;

use async_trait::async_trait;

/// Trait for obtaining raw client-listing text.
///
/// Each call to [`fetch`](ClientSource::fetch) performs exactly one read
/// or invocation. Implementations do not retry and do not cache.
///
/// # Example
///
/// ```no_run
/// use chronywatch::{ClientSource, CommandSource};
///
/// # tokio_test::block_on(async {
/// let source = CommandSource::chronyc();
/// match source.fetch().await {
///     Ok(text) => println!("{} bytes from {}", text.len(), source.description()),
///     Err(e) => eprintln!("{}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait ClientSource: Send + Sync + Debug {
    /// Fetch the raw output.
    async fn fetch(&self) -> Result<String, InvocationError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used in logs.
    fn description(&self) -> &str;
}
