// SPDX-License-Identifier: GPL-3.0-only

use cosmic::iced::{Alignment, Length};
use cosmic::widget;
use cosmic::{Element, iced_widget};

/// Fixed header, scrolling body and a footer pinned to the bottom.
pub(crate) fn page_shell<'a, Message: Clone + 'static>(
    header: Element<'a, Message>,
    content: Element<'a, Message>,
    footer: Element<'a, Message>,
) -> Element<'a, Message> {
    let content = widget::scrollable(
        widget::container(content)
            .padding([8, 0])
            .width(Length::Fill),
    )
    .width(Length::Fill)
    .height(Length::Fill);

    let layout = iced_widget::column![header, content, footer]
        .spacing(12)
        .width(Length::Fill)
        .height(Length::Fill);

    widget::container(layout)
        .padding(20)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Actions split to both ends of a row.
pub(crate) fn action_row<'a, Message: Clone + 'static>(
    left_actions: Vec<Element<'a, Message>>,
    right_actions: Vec<Element<'a, Message>>,
) -> Element<'a, Message> {
    let mut row = iced_widget::row![]
        .spacing(8)
        .align_y(Alignment::Center)
        .width(Length::Fill);

    for action in left_actions {
        row = row.push(action);
    }

    row = row.push(widget::Space::new(Length::Fill, 0));

    for action in right_actions {
        row = row.push(action);
    }

    row.into()
}

/// A caption above an input.
pub(crate) fn labelled_field<'a, Message: Clone + 'static>(
    label: String,
    field: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    iced_widget::column![widget::text::caption(label), field.into()]
        .spacing(4)
        .width(Length::Fill)
        .into()
}
