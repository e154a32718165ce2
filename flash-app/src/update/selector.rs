// SPDX-License-Identifier: GPL-3.0-only

use super::start_flash;
use crate::message::{Message, SelectorMessage};
use crate::state::AppModel;
use cosmic::app::Task;

pub(super) fn update(app: &mut AppModel, message: SelectorMessage) -> Task<Message> {
    if !app.inputs_enabled() {
        return Task::none();
    }

    match message {
        SelectorMessage::Select(column, index) => {
            if !app.selector.select(column, index) {
                tracing::warn!(%column, index, "selected option out of range");
            }
        }
        SelectorMessage::Run => {
            // Incomplete form or blank password: nothing to do.
            let Some(invocation) =
                app.selector
                    .invocation(app.keep_files, &app.username, &app.credential)
            else {
                return Task::none();
            };

            app.selector.begin_run();
            start_flash(app, invocation);
        }
    }

    Task::none()
}
