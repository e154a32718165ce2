// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the COSMIC Jetson flash utility
//!
//! This crate holds everything the flashing front-end decides without touching
//! the host: the device catalog, the cascading selection over it, the
//! parameters handed to the flash script and the rules for turning the
//! script's console output into progress and log entries.
//!
//! - **flash-sys**: loads catalogs from disk, spawns the script and feeds its
//!   output through [`RelayState`]
//! - **flash-app**: renders [`CascadingFilter`] options and a [`RollingLog`]

pub mod catalog;
pub mod error;
pub mod filter;
pub mod invocation;
pub mod log;
pub mod progress;
pub mod relay;

pub use catalog::{Catalog, CatalogRow, Column};
pub use error::{CatalogError, ProgressParseError};
pub use filter::{CascadingFilter, Selection, options_for};
pub use invocation::{Credential, FlashInvocation};
pub use log::{LogEntry, RollingLog, Severity};
pub use progress::{ProgressTracker, format_eta};
pub use relay::{
    DOWNLOAD_FINISHED_SENTINEL, FlashOutcome, LineOutcome, RelayState, parse_percent,
};
