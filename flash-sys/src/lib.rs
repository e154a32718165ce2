// SPDX-License-Identifier: GPL-3.0-only

//! Host-side operations for the Jetson flash utility
//!
//! This crate talks to the machine the utility runs on:
//! - Locating the device catalog and the flash script
//! - Resolving the invoking (non-root) user
//! - Spawning the flash script under `sudo` and relaying its output
//! - Spotting Jetson modules attached over USB in recovery mode

pub mod error;
pub mod launcher;
pub mod paths;
pub mod relay;
pub mod usb;
pub mod user;

pub use error::{Result, SysError};
pub use launcher::{LaunchOptions, flash_expression, render_command, stop_udisks};
pub use paths::{CatalogSource, LoadedCatalog, find_script, load_catalog, resolve_working_dir};
pub use relay::{FlashHandle, RelayEvent, run_flash};
pub use usb::{RecoveryDevice, scan_recovery_devices};
pub use user::invoking_user;
