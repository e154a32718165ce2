// SPDX-License-Identifier: GPL-3.0-only

use crate::fl;
use crate::message::Message;
use cosmic::iced::Length;
use cosmic::widget;
use cosmic::{Element, iced_widget};
use flash_types::{RollingLog, Severity};

/// Script output, newest at the bottom. Errors are drawn in the destructive colour.
pub(crate) fn log_pane(log: &RollingLog, height: f32) -> Element<'_, Message> {
    let body: Element<'_, Message> = if log.is_empty() {
        widget::text::caption(fl!("output-empty")).into()
    } else {
        log.iter()
            .fold(iced_widget::column![].spacing(2), |column, entry| {
                let severity = entry.severity;
                let line = widget::container(
                    widget::text::body(entry.text.as_str()).font(cosmic::font::mono()),
                )
                .style(move |theme| {
                    let color = match severity {
                        Severity::Output => theme.cosmic().background.component.on,
                        Severity::Notice => theme.cosmic().accent_color(),
                        Severity::Error => theme.cosmic().destructive_color(),
                    };

                    cosmic::iced_widget::container::Style {
                        text_color: Some(color.into()),
                        ..Default::default()
                    }
                });
                column.push(line)
            })
            .width(Length::Fill)
            .into()
    };

    let scroll = widget::scrollable(widget::container(body).padding(8).width(Length::Fill))
        .anchor_bottom()
        .width(Length::Fill)
        .height(Length::Fixed(height));

    iced_widget::column![
        widget::text::heading(fl!("output")),
        widget::container(scroll)
            .class(cosmic::style::Container::List)
            .width(Length::Fill),
    ]
    .spacing(6)
    .width(Length::Fill)
    .into()
}
