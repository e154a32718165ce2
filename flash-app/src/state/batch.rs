// SPDX-License-Identifier: GPL-3.0-only

use super::record_event;
use flash_sys::RelayEvent;
use flash_types::{Catalog, CatalogRow, Credential, FlashInvocation, FlashOutcome, RollingLog};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub row: CatalogRow,
    pub checked: bool,
    pub status: RowStatus,
    pub progress: u8,
}

/// Catalog rows with checkboxes, flashed one after another.
#[derive(Debug, Clone)]
pub struct BatchState {
    rows: Vec<BatchRow>,
    catalog_source: Option<String>,
    /// Index of the row being flashed.
    current: Option<usize>,
    pub log: RollingLog,
}

impl Default for BatchState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            catalog_source: None,
            current: None,
            log: RollingLog::new(RollingLog::BATCH_CAPACITY),
        }
    }
}

impl BatchState {
    /// Replace the rows with `catalog`. Refused while a batch runs.
    pub fn set_catalog(&mut self, catalog: &Catalog, source: impl Into<String>) -> bool {
        if self.is_running() {
            return false;
        }
        self.rows = catalog
            .rows()
            .iter()
            .map(|row| BatchRow {
                row: row.clone(),
                checked: false,
                status: RowStatus::Pending,
                progress: 0,
            })
            .collect();
        self.catalog_source = Some(source.into());
        true
    }

    pub fn rows(&self) -> &[BatchRow] {
        &self.rows
    }

    pub fn catalog_source(&self) -> Option<&str> {
        self.catalog_source.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn toggle(&mut self, index: usize, checked: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.checked = checked;
        }
    }

    pub fn select_all(&mut self) {
        self.rows.iter_mut().for_each(|r| r.checked = true);
    }

    pub fn clear_selection(&mut self) {
        self.rows.iter_mut().for_each(|r| r.checked = false);
    }

    pub fn checked_count(&self) -> usize {
        self.rows.iter().filter(|r| r.checked).count()
    }

    pub fn can_start(&self, credential: &Credential) -> bool {
        !self.is_running() && self.checked_count() > 0 && !credential.is_blank()
    }

    fn next_checked(&self, from: usize) -> Option<usize> {
        (from..self.rows.len()).find(|&i| self.rows[i].checked)
    }

    /// Reset checked rows to pending and return the first one.
    pub fn start(&mut self) -> Option<usize> {
        for row in self.rows.iter_mut().filter(|r| r.checked) {
            row.status = RowStatus::Pending;
            row.progress = 0;
        }
        self.current = None;
        let first = self.next_checked(0)?;
        self.mark_running(first);
        Some(first)
    }

    fn mark_running(&mut self, index: usize) {
        self.rows[index].status = RowStatus::Running;
        self.current = Some(index);
    }

    /// Invocation for the row at `index`, using that row's own values.
    pub fn invocation(
        &self,
        index: usize,
        keep_files: bool,
        username: &str,
        credential: &Credential,
    ) -> Option<FlashInvocation> {
        let row = self.rows.get(index)?;
        FlashInvocation::from_row(&row.row, keep_files, username, credential)
    }

    pub fn apply(&mut self, event: &RelayEvent) {
        if let (RelayEvent::Progress(percent), Some(index)) = (event, self.current) {
            self.rows[index].progress = *percent;
        }
        record_event(&mut self.log, event);
    }

    /// Record how the current row ended and move to the next checked row.
    ///
    /// A cancelled run stops the batch and skips every row still waiting.
    pub fn finish_current(&mut self, outcome: FlashOutcome) -> Option<usize> {
        let index = self.current.take()?;
        self.rows[index].status = if outcome.is_success() {
            RowStatus::Succeeded
        } else {
            RowStatus::Failed
        };

        if outcome == FlashOutcome::Cancelled {
            self.skip_remaining(index + 1);
            return None;
        }

        let next = self.next_checked(index + 1)?;
        self.mark_running(next);
        Some(next)
    }

    /// Abort the batch: the current row fails, the rest are skipped.
    pub fn abort(&mut self) {
        if let Some(index) = self.current.take() {
            self.rows[index].status = RowStatus::Failed;
            self.skip_remaining(index + 1);
        }
    }

    fn skip_remaining(&mut self, from: usize) {
        for row in self.rows[from..].iter_mut().filter(|r| r.checked) {
            row.status = RowStatus::Skipped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> BatchState {
        let catalog = Catalog::parse_csv(
            "Vendor,Product,Module,Jetpack,Storage\n\
             NVIDIA,AGX DevKit,AGX Orin,6.2,nvme\n\
             NVIDIA,Orin Nano DevKit,Orin Nano 8GB,6.2,sd\n\
             Seeed,J4012,Orin NX 16GB,6.0,nvme\n\
             Seeed,J3011,Orin Nano 8GB,5.1.3,nvme\n",
        )
        .unwrap();
        let mut state = BatchState::default();
        state.set_catalog(&catalog, "test");
        state
    }

    fn statuses(state: &BatchState) -> Vec<RowStatus> {
        state.rows().iter().map(|r| r.status).collect()
    }

    #[test]
    fn start_requires_checked_rows_and_credential() {
        let mut state = state();
        let password = Credential::new("pw");
        assert!(!state.can_start(&password));
        state.toggle(2, true);
        assert!(state.can_start(&password));
        assert!(!state.can_start(&Credential::new("")));
    }

    #[test]
    fn rows_run_in_order_with_their_own_values() {
        let mut state = state();
        state.toggle(1, true);
        state.toggle(3, true);

        assert_eq!(state.start(), Some(1));
        let invocation = state
            .invocation(1, false, "jetson", &Credential::new("pw"))
            .unwrap();
        assert_eq!(invocation.product, "Orin Nano DevKit");
        assert_eq!(invocation.storage, "sd");

        assert_eq!(
            state.finish_current(FlashOutcome::Failed { code: Some(2) }),
            Some(3)
        );
        assert_eq!(state.finish_current(FlashOutcome::Succeeded), None);
        assert!(!state.is_running());
        assert_eq!(
            statuses(&state),
            vec![
                RowStatus::Pending,
                RowStatus::Failed,
                RowStatus::Pending,
                RowStatus::Succeeded
            ]
        );
    }

    #[test]
    fn cancel_skips_remaining_rows() {
        let mut state = state();
        state.select_all();
        state.start();
        assert_eq!(state.finish_current(FlashOutcome::Cancelled), None);
        assert_eq!(
            statuses(&state),
            vec![
                RowStatus::Failed,
                RowStatus::Skipped,
                RowStatus::Skipped,
                RowStatus::Skipped
            ]
        );
        assert!(!state.is_running());
    }

    #[test]
    fn progress_goes_to_the_running_row() {
        let mut state = state();
        state.toggle(2, true);
        state.start();
        state.apply(&RelayEvent::Progress(70));
        state.apply(&RelayEvent::Output("done".into()));
        assert_eq!(state.rows()[2].progress, 70);
        assert_eq!(state.log.render(), "done");
    }

    #[test]
    fn log_capacity_is_five_hundred() {
        let mut state = state();
        for i in 0..600 {
            state.apply(&RelayEvent::Output(i.to_string()));
        }
        assert_eq!(state.log.len(), 500);
    }

    #[test]
    fn catalog_is_not_replaced_mid_batch() {
        let mut state = state();
        state.toggle(0, true);
        state.toggle(3, true);
        state.start();

        let other = Catalog::parse_csv(
            "Vendor,Product,Module,Jetpack,Storage\n\
             NVIDIA,AGX DevKit,AGX Orin,6.2,nvme\n",
        )
        .unwrap();
        assert!(!state.set_catalog(&other, "picked"));
        assert_eq!(state.rows().len(), 4);
        assert_eq!(state.catalog_source(), Some("test"));
        assert_eq!(state.finish_current(FlashOutcome::Succeeded), Some(3));

        assert_eq!(state.finish_current(FlashOutcome::Succeeded), None);
        assert!(state.set_catalog(&other, "picked"));
        assert_eq!(state.rows().len(), 1);
    }

    #[test]
    fn select_all_and_clear() {
        let mut state = state();
        state.select_all();
        assert_eq!(state.checked_count(), 4);
        state.clear_selection();
        assert_eq!(state.checked_count(), 0);
        assert_eq!(state.start(), None);
    }
}
