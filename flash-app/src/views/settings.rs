// SPDX-License-Identifier: GPL-3.0-only

use cosmic::{Element, cosmic_theme, iced::Alignment, iced::Length, theme, widget};

use crate::{
    app::{Message, REPOSITORY},
    config::Config,
    fl,
};

pub fn settings<'a>(config: &Config, enabled: bool) -> Element<'a, Message> {
    let cosmic_theme::Spacing {
        space_xxs,
        space_s,
        space_m,
        ..
    } = theme::active().cosmic().spacing;

    let hash = env!("VERGEN_GIT_SHA");
    let short_hash: String = hash.chars().take(7).collect();
    let date = env!("VERGEN_GIT_COMMIT_DATE");

    let commit_caption = widget::button::custom(widget::text::caption(fl!(
        "git-description",
        hash = short_hash.as_str(),
        date = date
    )))
    .class(cosmic::theme::Button::Link)
    .on_press(Message::LaunchUrl(format!("{REPOSITORY}/commits/{hash}")))
    .padding(0);

    // Launch settings are read-only while a flash runs.
    let mut elevate_toggle = widget::checkbox(fl!("elevate"), config.elevate);
    let mut udisks_toggle = widget::checkbox(fl!("stop-udisks"), config.stop_udisks);
    let mut script_input = widget::text_input(fl!("auto-discover"), config.script_path.clone())
        .width(Length::Fill);
    let mut catalog_input = widget::text_input(fl!("auto-discover"), config.catalog_path.clone())
        .width(Length::Fill);
    let mut capacity_input = widget::text_input("20", config.log_capacity.to_string())
        .width(Length::Fixed(96.0));
    if enabled {
        elevate_toggle = elevate_toggle.on_toggle(Message::ToggleElevate);
        udisks_toggle = udisks_toggle.on_toggle(Message::ToggleStopUdisks);
        script_input = script_input.on_input(Message::ScriptPathChanged);
        catalog_input = catalog_input.on_input(Message::CatalogPathChanged);
        capacity_input = capacity_input.on_input(Message::LogCapacityChanged);
    }

    let mut reload = widget::button::standard(fl!("reload-catalog"));
    if enabled {
        reload = reload.on_press(Message::ReloadCatalog);
    }

    let flashing_section = widget::column()
        .push(widget::text::title4(fl!("settings-flashing")))
        .push(elevate_toggle)
        .push(udisks_toggle)
        .push(widget::text::caption(fl!("script-path")))
        .push(script_input)
        .push(widget::text::caption(fl!("catalog-path")))
        .push(catalog_input)
        .push(reload)
        .push(widget::text::caption(fl!("log-capacity")))
        .push(capacity_input)
        .spacing(space_s)
        .align_x(Alignment::Start);

    let level_options = vec![
        fl!("log-level-error"),
        fl!("log-level-warn"),
        fl!("log-level-info"),
        fl!("log-level-debug"),
        fl!("log-level-trace"),
    ];

    let level_dropdown = widget::dropdown(
        level_options,
        Some(config.log_level.to_index()),
        Message::LogLevelChanged,
    )
    .width(Length::Fill);

    let logging_section = widget::column()
        .push(widget::text::title4(fl!("settings-logging")))
        .push(widget::text::caption(fl!("log-level")))
        .push(level_dropdown)
        .push(
            widget::checkbox(fl!("log-to-disk"), config.log_to_disk)
                .on_toggle(Message::ToggleLogToDisk),
        )
        .spacing(space_s)
        .align_x(Alignment::Start);

    let repo_footer = widget::row::with_capacity(2)
        .push(widget::Space::new(Length::Fill, 0))
        .push(commit_caption)
        .spacing(space_xxs)
        .align_y(Alignment::Center);

    widget::column()
        .push(flashing_section)
        .push(widget::divider::horizontal::default())
        .push(logging_section)
        .push(widget::divider::horizontal::default())
        .push(repo_footer)
        .spacing(space_m)
        .into()
}
