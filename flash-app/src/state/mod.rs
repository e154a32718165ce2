// SPDX-License-Identifier: GPL-3.0-only

//! App-level state types.

pub mod batch;
pub mod selector;

pub use batch::{BatchRow, BatchState, RowStatus};
pub use selector::SelectorState;

use crate::app::Variant;
use crate::config::Config;
use cosmic::app::Core;
use flash_sys::{FlashHandle, LaunchOptions, LoadedCatalog, RecoveryDevice, RelayEvent};
use flash_types::{Credential, FlashInvocation, RollingLog};

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    Settings,
}

/// A flash script run owned by the UI.
#[derive(Debug, Clone)]
pub struct ActiveFlash {
    pub id: u64,
    pub invocation: FlashInvocation,
    pub options: LaunchOptions,
    /// Set once the relay reports the process started.
    pub handle: Option<FlashHandle>,
    /// Cancel was pressed before the process started.
    pub cancel_requested: bool,
}

/// At most one flash runs at a time. Ids let late events from a finished
/// session be told apart from the current one.
#[derive(Debug, Default)]
pub struct FlashSessions {
    active: Option<ActiveFlash>,
    next_id: u64,
}

impl FlashSessions {
    pub fn active(&self) -> Option<&ActiveFlash> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == id)
    }

    pub fn begin(&mut self, invocation: FlashInvocation, options: LaunchOptions) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.active = Some(ActiveFlash {
            id,
            invocation,
            options,
            handle: None,
            cancel_requested: false,
        });
        id
    }

    pub fn attach(&mut self, id: u64, handle: FlashHandle) {
        if let Some(active) = self.active.as_mut().filter(|a| a.id == id) {
            if active.cancel_requested {
                handle.cancel();
            }
            active.handle = Some(handle);
        }
    }

    /// Forget the session `id`. Returns false if it was not the current one.
    pub fn end(&mut self, id: u64) -> bool {
        if self.is_current(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Signal the running script, or remember to once it has started.
    ///
    /// Returns false if nothing is running.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        match &active.handle {
            Some(handle) => handle.cancel(),
            None => active.cancel_requested = true,
        }
        true
    }
}

/// Append the textual part of a relay event to `log`.
pub(crate) fn record_event(log: &mut RollingLog, event: &RelayEvent) {
    match event {
        RelayEvent::Output(line) => log.push_output(line.clone()),
        RelayEvent::Notice(line) => log.push_notice(line.clone()),
        RelayEvent::Error(line) => log.push_error(line.clone()),
        RelayEvent::Started(_) | RelayEvent::Progress(_) | RelayEvent::Finished(_) => {}
    }
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub(crate) core: Core,
    /// Display a context drawer with the designated page if defined.
    pub(crate) context_page: ContextPage,
    // Configuration data that persists between application runs.
    pub(crate) config: Config,
    pub(crate) variant: Variant,

    pub(crate) username: String,
    pub(crate) credential: Credential,
    pub(crate) keep_files: bool,
    pub(crate) recovery_devices: Vec<RecoveryDevice>,

    pub(crate) selector: SelectorState,
    pub(crate) batch: BatchState,
    pub(crate) flashes: FlashSessions,
    /// A catalog that finished loading while a flash ran; applied once idle.
    pub(crate) pending_catalog: Option<LoadedCatalog>,
}

impl AppModel {
    /// Inputs are disabled while a flash runs.
    pub(crate) fn inputs_enabled(&self) -> bool {
        !self.flashes.is_running()
    }

    /// The log of the window being shown.
    pub(crate) fn log_mut(&mut self) -> &mut RollingLog {
        match self.variant {
            Variant::Selector => &mut self.selector.log,
            Variant::Batch => &mut self.batch.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn invocation() -> FlashInvocation {
        FlashInvocation {
            product: "AGX DevKit".into(),
            module: "AGX Orin".into(),
            jetpack: "6.2".into(),
            storage: "nvme".into(),
            keep_files: false,
            username: "jetson".into(),
            credential: Credential::new("pw"),
        }
    }

    fn options() -> LaunchOptions {
        LaunchOptions {
            script: PathBuf::from("/opt/flash/flash_cordatus.sh"),
            working_dir: PathBuf::from("/opt/flash"),
            elevate: true,
            stop_udisks: false,
        }
    }

    #[test]
    fn ending_a_session_re_enables_runs() {
        let mut sessions = FlashSessions::default();
        let id = sessions.begin(invocation(), options());
        assert!(sessions.is_running());
        assert!(sessions.cancel());
        assert!(sessions.active().is_some_and(|a| a.cancel_requested));

        assert!(sessions.end(id));
        assert!(!sessions.is_running());
    }

    #[test]
    fn stale_session_ids_are_ignored() {
        let mut sessions = FlashSessions::default();
        let first = sessions.begin(invocation(), options());
        sessions.end(first);
        let second = sessions.begin(invocation(), options());

        assert_ne!(first, second);
        assert!(!sessions.end(first));
        assert!(sessions.is_current(second));
        sessions.end(second);
        assert!(!sessions.cancel(), "nothing running");
    }

    #[test]
    fn events_map_to_log_severity() {
        let mut log = RollingLog::new(10);
        record_event(&mut log, &RelayEvent::Output("line".into()));
        record_event(&mut log, &RelayEvent::Error("bad".into()));
        record_event(&mut log, &RelayEvent::Progress(40));

        let severities: Vec<_> = log.iter().map(|e| e.severity).collect();
        assert_eq!(
            severities,
            vec![flash_types::Severity::Output, flash_types::Severity::Error]
        );
    }
}
