// SPDX-License-Identifier: GPL-3.0-only

//! COSMIC front-end for flashing NVIDIA Jetson modules
//!
//! Two windows share one application model: the selector picks a single
//! device profile through cascading dropdowns, the batch window flashes
//! checked catalog rows one after another.

pub mod app;
pub mod config;
mod controls;
pub mod i18n;
mod logging;
pub mod message;
pub mod state;
mod subscriptions;
mod update;
mod views;

pub use app::Variant;

/// Start the application in the given variant.
pub fn run(variant: Variant) -> cosmic::iced::Result {
    let config = config::Config::load(app::APP_ID);
    logging::init(&config);

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    tracing::info!(?variant, "starting {}", env!("CARGO_PKG_NAME"));

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(480.0)
            .min_height(420.0),
    );

    cosmic::app::run::<app::AppModel>(settings, variant)
}
