// SPDX-License-Identifier: GPL-3.0-only

use super::log_pane::log_pane;
use super::status::recovery_status;
use crate::controls::{action_row, labelled_field, page_shell};
use crate::fl;
use crate::message::{Message, SelectorMessage};
use crate::state::AppModel;
use cosmic::iced::Length;
use cosmic::widget::{self, button, text_input};
use cosmic::{Element, iced_widget};
use flash_types::{Column, format_eta};

fn column_label(column: Column) -> String {
    match column {
        Column::Vendor => fl!("vendor"),
        Column::Product => fl!("product"),
        Column::Module => fl!("module"),
        Column::Jetpack => fl!("jetpack"),
        Column::Storage => fl!("storage"),
    }
}

pub(crate) fn view(app: &AppModel) -> Element<'_, Message> {
    let spacing = cosmic::theme::active().cosmic().spacing;
    let enabled = app.inputs_enabled();
    let state = &app.selector;

    let source = match state.catalog_source() {
        Some(source) => fl!("catalog-source", source = source),
        None => fl!("no-catalog"),
    };
    let header = iced_widget::column![
        recovery_status(&app.recovery_devices),
        widget::text::caption(source),
    ]
    .spacing(spacing.space_xxs);

    let dropdowns = Column::ALL.into_iter().fold(
        iced_widget::column![].spacing(spacing.space_s),
        |form, column| {
            let field: Element<'_, Message> = if enabled {
                widget::dropdown(
                    state.options(column),
                    state.selected_index(column),
                    move |index| SelectorMessage::Select(column, index).into(),
                )
                .width(Length::Fill)
                .into()
            } else {
                // A text input without `on_input` renders disabled.
                widget::text_input("", state.selected_value(column).unwrap_or_default())
                    .width(Length::Fill)
                    .into()
            };
            form.push(labelled_field(column_label(column), field))
        },
    );

    let mut password = text_input::secure_input(
        fl!("password-placeholder"),
        app.credential.expose(),
        None,
        true,
    );
    if enabled {
        password = password.on_input(Message::CredentialChanged);
    }

    let mut keep_files = widget::checkbox(fl!("keep-files"), app.keep_files);
    if enabled {
        keep_files = keep_files.on_toggle(Message::KeepFilesToggled);
    }

    let percent = state.progress.percent();
    let progress = iced_widget::column![
        iced_widget::row![
            widget::text::body(fl!("download-progress", percent = percent)),
            widget::Space::new(Length::Fill, 0),
            widget::text::caption(fl!("eta", eta = format_eta(state.progress.eta()))),
        ],
        iced_widget::progress_bar(0.0..=1.0, state.progress.fraction()).width(Length::Fill),
    ]
    .spacing(spacing.space_xxs);

    let content = iced_widget::column![
        dropdowns,
        labelled_field(fl!("password"), password),
        keep_files,
        widget::text::caption(fl!("user", user = app.username.as_str())),
        progress,
        log_pane(&state.log, 220.0),
    ]
    .spacing(spacing.space_m)
    .width(Length::Fill);

    let mut run = button::suggested(fl!("run"));
    if enabled && state.can_run(&app.credential) {
        run = run.on_press(SelectorMessage::Run.into());
    }
    let mut cancel = button::destructive(fl!("cancel"));
    if !enabled {
        cancel = cancel.on_press(Message::CancelFlash);
    }

    page_shell(
        header.into(),
        content.into(),
        action_row(vec![cancel.into()], vec![run.into()]),
    )
}
