// SPDX-License-Identifier: GPL-3.0-only

use super::{load_catalog, start_flash};
use crate::fl;
use crate::message::{BatchMessage, Message};
use crate::state::AppModel;
use cosmic::app::Task;
use cosmic::dialog::file_chooser;
use flash_types::FlashOutcome;

pub(super) fn update(app: &mut AppModel, message: BatchMessage) -> Task<Message> {
    if !app.inputs_enabled() {
        return Task::none();
    }

    match message {
        BatchMessage::OpenCatalog => {
            let title = fl!("open-catalog");
            return Task::perform(
                async move {
                    let filter = file_chooser::FileFilter::new("CSV").glob("*.csv");
                    let dialog = file_chooser::open::Dialog::new()
                        .title(title)
                        .filter(filter);
                    match dialog.open_file().await {
                        Ok(response) => response.url().to_file_path().ok(),
                        Err(file_chooser::Error::Cancelled) => None,
                        Err(err) => {
                            tracing::warn!(?err, "open file dialog failed");
                            None
                        }
                    }
                },
                |path| Message::from(BatchMessage::CatalogPicked(path)).into(),
            );
        }
        BatchMessage::CatalogPicked(Some(path)) => return load_catalog(Some(path)),
        BatchMessage::CatalogPicked(None) => {}
        BatchMessage::ToggleRow(index, checked) => app.batch.toggle(index, checked),
        BatchMessage::SelectAll => app.batch.select_all(),
        BatchMessage::ClearSelection => app.batch.clear_selection(),
        BatchMessage::Start => {
            if !app.batch.can_start(&app.credential) {
                return Task::none();
            }
            if let Some(first) = app.batch.start() {
                tracing::info!(rows = app.batch.checked_count(), "batch flash started");
                run_row(app, first);
            }
        }
    }

    Task::none()
}

fn run_row(app: &mut AppModel, index: usize) {
    let invocation = app
        .batch
        .invocation(index, app.keep_files, &app.username, &app.credential);

    let started = match invocation {
        Some(invocation) => start_flash(app, invocation),
        None => false,
    };
    if !started {
        app.batch.abort();
    }
}

/// Move on after the running row finished.
pub(super) fn advance(app: &mut AppModel, outcome: FlashOutcome) {
    match app.batch.finish_current(outcome) {
        Some(next) => run_row(app, next),
        None => {
            tracing::info!("batch flash finished");
            app.batch.log.push_notice(fl!("batch-finished"));
        }
    }
}
