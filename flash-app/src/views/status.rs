// SPDX-License-Identifier: GPL-3.0-only

use crate::fl;
use crate::message::Message;
use cosmic::iced::Alignment;
use cosmic::widget::{self, icon};
use cosmic::{Element, iced_widget};
use flash_sys::RecoveryDevice;

/// Recovery-mode devices on the USB bus, or a hint to connect one.
pub(crate) fn recovery_status(devices: &[RecoveryDevice]) -> Element<'_, Message> {
    if devices.is_empty() {
        return iced_widget::row![
            icon::from_name("dialog-information-symbolic").size(16),
            widget::text::caption(fl!("recovery-none")),
        ]
        .spacing(6)
        .align_y(Alignment::Center)
        .into();
    }

    let modules = devices
        .iter()
        .map(|d| format!("{} ({})", d.module(), d.port))
        .collect::<Vec<_>>()
        .join(", ");

    iced_widget::column![
        iced_widget::row![
            icon::from_name("drive-removable-media-symbolic").size(16),
            widget::text::body(fl!("recovery-devices", count = devices.len())),
        ]
        .spacing(6)
        .align_y(Alignment::Center),
        widget::text::caption(modules),
    ]
    .spacing(2)
    .into()
}
