// SPDX-License-Identifier: GPL-3.0-only

use crate::app::Variant;
use crate::fl;
use crate::message::Message;
use crate::state::{AppModel, ContextPage};
use cosmic::Element;
use cosmic::app::context_drawer as cosmic_context_drawer;
use cosmic::widget::{self, icon};

/// Elements to pack at the end of the header bar.
pub(crate) fn header_end(_app: &AppModel) -> Vec<Element<'_, Message>> {
    vec![
        widget::button::icon(icon::from_name("preferences-system-symbolic"))
            .on_press(Message::ToggleContextPage(ContextPage::Settings))
            .into(),
    ]
}

/// Display a context drawer if the context page is requested.
pub(crate) fn context_drawer(
    app: &AppModel,
) -> Option<cosmic_context_drawer::ContextDrawer<'_, Message>> {
    if !app.core.window.show_context {
        return None;
    }

    Some(match app.context_page {
        ContextPage::Settings => cosmic_context_drawer::context_drawer(
            super::settings::settings(&app.config, app.inputs_enabled()),
            Message::ToggleContextPage(ContextPage::Settings),
        )
        .title(fl!("settings")),
    })
}

/// Describes the interface based on the current state of the application model.
pub(crate) fn view(app: &AppModel) -> Element<'_, Message> {
    match app.variant {
        Variant::Selector => super::selector::view(app),
        Variant::Batch => super::batch::view(app),
    }
}
