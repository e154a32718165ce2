// SPDX-License-Identifier: GPL-3.0-only

use crate::config::Config;
use crate::state::ContextPage;
use flash_sys::{LoadedCatalog, RecoveryDevice, RelayEvent};
use flash_types::Column;
use std::path::PathBuf;

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    OpenRepositoryUrl,
    LaunchUrl(String),
    ToggleContextPage(ContextPage),
    UpdateConfig(Config),

    CatalogLoaded(Result<LoadedCatalog, String>),
    RecoveryDevicesScanned(Vec<RecoveryDevice>),
    CredentialChanged(String),
    KeepFilesToggled(bool),

    Selector(SelectorMessage),
    Batch(BatchMessage),

    /// An event from the flash session with the given id.
    Flash(u64, RelayEvent),
    CancelFlash,

    // Settings
    LogLevelChanged(usize),
    ToggleLogToDisk(bool),
    ToggleElevate(bool),
    ToggleStopUdisks(bool),
    LogCapacityChanged(String),
    ScriptPathChanged(String),
    CatalogPathChanged(String),
    ReloadCatalog,

    None,
}

#[derive(Debug, Clone)]
pub enum SelectorMessage {
    Select(Column, usize),
    Run,
}

#[derive(Debug, Clone)]
pub enum BatchMessage {
    OpenCatalog,
    CatalogPicked(Option<PathBuf>),
    ToggleRow(usize, bool),
    SelectAll,
    ClearSelection,
    Start,
}

impl From<SelectorMessage> for Message {
    fn from(message: SelectorMessage) -> Self {
        Self::Selector(message)
    }
}

impl From<BatchMessage> for Message {
    fn from(message: BatchMessage) -> Self {
        Self::Batch(message)
    }
}
