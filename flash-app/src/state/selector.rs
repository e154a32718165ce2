// SPDX-License-Identifier: GPL-3.0-only

use super::record_event;
use flash_sys::RelayEvent;
use flash_types::{
    CascadingFilter, Catalog, Column, Credential, FlashInvocation, ProgressTracker, RollingLog,
};
use std::time::Instant;

/// Cascading dropdowns, progress and output of the selector window.
#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    filter: Option<CascadingFilter>,
    catalog_source: Option<String>,
    pub progress: ProgressTracker,
    pub log: RollingLog,
}

impl SelectorState {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            log: RollingLog::new(log_capacity),
            ..Self::default()
        }
    }

    pub fn set_catalog(&mut self, catalog: Catalog, source: impl Into<String>) {
        self.filter = Some(CascadingFilter::new(catalog));
        self.catalog_source = Some(source.into());
    }

    pub fn has_catalog(&self) -> bool {
        self.filter.is_some()
    }

    pub fn catalog_source(&self) -> Option<&str> {
        self.catalog_source.as_deref()
    }

    pub fn options(&self, column: Column) -> &[String] {
        self.filter.as_ref().map_or(&[][..], |f| f.options(column))
    }

    pub fn selected_index(&self, column: Column) -> Option<usize> {
        self.filter.as_ref()?.selected_index(column)
    }

    pub fn selected_value(&self, column: Column) -> Option<&str> {
        self.filter.as_ref()?.selection().get(column)
    }

    pub fn select(&mut self, column: Column, index: usize) -> bool {
        self.filter
            .as_mut()
            .is_some_and(|filter| filter.select(column, index))
    }

    /// The run described by the form, if it is complete.
    pub fn invocation(
        &self,
        keep_files: bool,
        username: &str,
        credential: &Credential,
    ) -> Option<FlashInvocation> {
        let filter = self.filter.as_ref()?;
        FlashInvocation::from_selection(filter.selection(), keep_files, username, credential)
    }

    pub fn can_run(&self, credential: &Credential) -> bool {
        self.filter
            .as_ref()
            .is_some_and(|f| f.selection().is_complete())
            && !credential.is_blank()
    }

    pub fn begin_run(&mut self) {
        self.progress.reset();
    }

    pub fn apply(&mut self, event: &RelayEvent, now: Instant) {
        if let RelayEvent::Progress(percent) = event {
            self.progress.update(*percent, now);
        }
        record_event(&mut self.log, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_types::Severity;

    fn state() -> SelectorState {
        let catalog = Catalog::parse_csv(
            "Vendor,Product,Module,Jetpack,Storage\n\
             NVIDIA,AGX DevKit,AGX Orin,6.2,nvme\n\
             NVIDIA,AGX DevKit,AGX Orin,6.2,emmc\n\
             Seeed,J4012,Orin NX 16GB,6.0,nvme\n",
        )
        .unwrap();
        let mut state = SelectorState::new(RollingLog::SELECTOR_CAPACITY);
        state.set_catalog(catalog, "test");
        state
    }

    fn fill(state: &mut SelectorState) {
        for column in Column::ALL {
            assert!(state.select(column, 0), "{column} has options");
        }
    }

    #[test]
    fn run_needs_every_field_and_a_credential() {
        let mut state = state();
        let password = Credential::new("pw");
        assert!(!state.can_run(&password));

        fill(&mut state);
        assert!(state.can_run(&password));
        assert!(!state.can_run(&Credential::new(" ")));
        assert!(state.invocation(true, "jetson", &Credential::default()).is_none());

        let invocation = state.invocation(true, "jetson", &password).unwrap();
        assert_eq!(invocation.storage, "nvme");
        assert!(invocation.keep_files);
    }

    #[test]
    fn changing_a_field_clears_later_ones() {
        let mut state = state();
        fill(&mut state);
        state.select(Column::Vendor, 1);
        assert!(!state.can_run(&Credential::new("pw")));
        assert_eq!(state.options(Column::Product), ["J4012"]);
        assert!(state.options(Column::Module).is_empty());
    }

    #[test]
    fn selected_values_follow_the_form() {
        let mut state = state();
        assert_eq!(state.selected_value(Column::Vendor), None);
        fill(&mut state);
        assert_eq!(state.selected_value(Column::Module), Some("AGX Orin"));
        state.select(Column::Vendor, 1);
        assert_eq!(state.selected_value(Column::Vendor), Some("Seeed"));
        assert_eq!(state.selected_value(Column::Product), None);
    }

    #[test]
    fn without_catalog_nothing_is_selectable() {
        let mut state = SelectorState::new(5);
        assert!(state.options(Column::Vendor).is_empty());
        assert!(!state.select(Column::Vendor, 0));
        assert!(!state.can_run(&Credential::new("pw")));
    }

    #[test]
    fn progress_events_move_the_bar_not_the_log() {
        let mut state = state();
        let now = Instant::now();
        state.apply(&RelayEvent::Progress(45), now);
        assert_eq!(state.progress.percent(), 45);
        assert!(state.log.is_empty());

        state.apply(&RelayEvent::Output("Writing image 45% done".into()), now);
        assert_eq!(state.progress.percent(), 45);
        assert_eq!(state.log.render(), "Writing image 45% done");
    }

    #[test]
    fn log_keeps_only_recent_lines() {
        let mut state = state();
        for i in 0..100 {
            state.apply(&RelayEvent::Output(format!("line {i}")), Instant::now());
        }
        state.apply(&RelayEvent::Error("Flash failed (exit code 1)".into()), Instant::now());
        assert_eq!(state.log.len(), RollingLog::SELECTOR_CAPACITY);
        assert_eq!(state.log.iter().last().map(|e| e.severity), Some(Severity::Error));
    }
}
