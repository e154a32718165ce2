// SPDX-License-Identifier: GPL-3.0-only

use super::log_pane::log_pane;
use super::status::recovery_status;
use crate::controls::{action_row, labelled_field, page_shell};
use crate::fl;
use crate::message::{BatchMessage, Message};
use crate::state::{AppModel, BatchRow, RowStatus};
use cosmic::iced::{Alignment, Length};
use cosmic::widget::{self, button, text_input};
use cosmic::{Element, iced_widget};
use flash_types::Column;

const CELL_PORTIONS: [u16; 5] = [2, 3, 3, 1, 1];

fn status_label(row: &BatchRow) -> String {
    match row.status {
        RowStatus::Pending => fl!("status-pending"),
        RowStatus::Running => format!(
            "{} {}",
            fl!("status-running"),
            fl!("batch-progress", percent = row.progress)
        ),
        RowStatus::Succeeded => fl!("status-succeeded"),
        RowStatus::Failed => fl!("status-failed"),
        RowStatus::Skipped => fl!("status-skipped"),
    }
}

fn header_row<'a>() -> Element<'a, Message> {
    let labels = [
        fl!("vendor"),
        fl!("product"),
        fl!("module"),
        fl!("jetpack"),
        fl!("storage"),
    ];

    let row = labels.into_iter().zip(CELL_PORTIONS).fold(
        iced_widget::row![widget::Space::new(Length::Fixed(28.0), 0)].spacing(8),
        |row, (label, portion)| {
            row.push(
                widget::text::heading(label).width(Length::FillPortion(portion)),
            )
        },
    );

    row.push(widget::Space::new(Length::FillPortion(2), 0))
        .padding([0, 8])
        .into()
}

fn table_row(index: usize, row: &BatchRow, enabled: bool) -> Element<'_, Message> {
    let mut checkbox = widget::checkbox("", row.checked);
    if enabled {
        checkbox = checkbox.on_toggle(move |checked| BatchMessage::ToggleRow(index, checked).into());
    }

    let cells = Column::ALL.into_iter().zip(CELL_PORTIONS).fold(
        iced_widget::row![widget::container(checkbox).width(Length::Fixed(28.0))]
            .spacing(8)
            .align_y(Alignment::Center),
        |cells, (column, portion)| {
            cells.push(
                widget::text::body(row.row.value(column)).width(Length::FillPortion(portion)),
            )
        },
    );

    let status = widget::text::caption(status_label(row)).width(Length::FillPortion(2));
    let cells = cells.push(status).padding([4, 8]);

    if row.status == RowStatus::Running {
        widget::container(cells)
            .class(cosmic::style::Container::Card)
            .width(Length::Fill)
            .into()
    } else {
        cells.into()
    }
}

pub(crate) fn view(app: &AppModel) -> Element<'_, Message> {
    let spacing = cosmic::theme::active().cosmic().spacing;
    let enabled = app.inputs_enabled();
    let state = &app.batch;

    let source = match state.catalog_source() {
        Some(source) => fl!("catalog-source", source = source),
        None => fl!("no-catalog"),
    };

    let mut open = button::standard(fl!("open-catalog"));
    let mut select_all = button::standard(fl!("select-all"));
    let mut clear = button::standard(fl!("clear-selection"));
    if enabled {
        open = open.on_press(BatchMessage::OpenCatalog.into());
        select_all = select_all.on_press(BatchMessage::SelectAll.into());
        clear = clear.on_press(BatchMessage::ClearSelection.into());
    }

    let header = iced_widget::column![
        recovery_status(&app.recovery_devices),
        action_row(
            vec![widget::text::caption(source).into()],
            vec![open.into(), select_all.into(), clear.into()],
        ),
        widget::text::caption(fl!(
            "selected-count",
            selected = state.checked_count(),
            total = state.rows().len()
        )),
    ]
    .spacing(spacing.space_xxs);

    let table = state.rows().iter().enumerate().fold(
        iced_widget::column![header_row(), widget::divider::horizontal::default()].spacing(2),
        |table, (index, row)| table.push(table_row(index, row, enabled)),
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

    let content = iced_widget::column![
        widget::container(table)
            .class(cosmic::style::Container::List)
            .width(Length::Fill),
        log_pane(&state.log, 200.0),
    ]
    .spacing(spacing.space_m)
    .width(Length::Fill);

    let mut start = button::suggested(fl!("flash-selected"));
    if enabled && state.can_start(&app.credential) {
        start = start.on_press(BatchMessage::Start.into());
    }
    let mut cancel = button::destructive(fl!("cancel"));
    if !enabled {
        cancel = cancel.on_press(Message::CancelFlash);
    }

    let footer = iced_widget::column![
        iced_widget::row![
            labelled_field(fl!("password"), password),
            keep_files,
        ]
        .spacing(spacing.space_s)
        .align_y(Alignment::End),
        widget::text::caption(fl!("user", user = app.username.as_str())),
        action_row(vec![cancel.into()], vec![start.into()]),
    ]
    .spacing(spacing.space_s);

    page_shell(header.into(), content.into(), footer.into())
}
