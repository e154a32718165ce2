// SPDX-License-Identifier: GPL-3.0-only

mod batch;
mod selector;

use crate::app::{APP_ID, REPOSITORY, Variant};
use crate::config::{Config, LoggingLevel};
use crate::fl;
use crate::logging;
use crate::message::Message;
use crate::state::AppModel;
use cosmic::app::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use flash_sys::{LaunchOptions, LoadedCatalog, RelayEvent};
use flash_types::{Credential, FlashInvocation};
use std::path::PathBuf;
use std::time::Instant;

async fn read_catalog(path: Option<PathBuf>) -> anyhow::Result<LoadedCatalog> {
    let loaded =
        tokio::task::spawn_blocking(move || flash_sys::load_catalog(path.as_deref())).await??;
    Ok(loaded)
}

/// Load the catalog off the UI thread.
pub(crate) fn load_catalog(path: Option<PathBuf>) -> Task<Message> {
    Task::perform(
        async move { read_catalog(path).await.map_err(|e| format!("{e:#}")) },
        |result| Message::CatalogLoaded(result).into(),
    )
}

fn persist_config(config: &Config) {
    match cosmic::cosmic_config::Config::new(APP_ID, Config::VERSION) {
        Ok(helper) => {
            if let Err(err) = config.write_entry(&helper) {
                tracing::warn!(?err, "failed to save config");
            }
        }
        Err(err) => tracing::warn!(?err, "failed to open config"),
    }
}

/// Begin a flash session for `invocation`.
///
/// Returns false, with the reason in the log, when the script cannot be found.
pub(crate) fn start_flash(app: &mut AppModel, invocation: FlashInvocation) -> bool {
    let options = match LaunchOptions::discover(
        app.config.script_override().as_deref(),
        app.config.elevate,
        app.config.stop_udisks,
    ) {
        Ok(options) => options,
        Err(e) => {
            tracing::error!(%e, "cannot start flash");
            app.log_mut().push_error(e.to_string());
            return false;
        }
    };

    let notice = fl!("flash-started", target = invocation.describe());
    app.log_mut().push_notice(notice);
    let id = app.flashes.begin(invocation, options);
    tracing::info!(session = id, "flash session queued");
    true
}

fn apply_catalog(app: &mut AppModel, loaded: LoadedCatalog) {
    let source = loaded.source.to_string();
    tracing::info!(rows = loaded.catalog.len(), %source, "catalog loaded");
    app.batch.set_catalog(&loaded.catalog, source.clone());
    app.selector.set_catalog(loaded.catalog, source);
}

fn on_flash_event(app: &mut AppModel, id: u64, event: RelayEvent) -> Task<Message> {
    if !app.flashes.is_current(id) {
        tracing::debug!(session = id, "dropping event from a finished session");
        return Task::none();
    }

    match &event {
        RelayEvent::Started(handle) => {
            tracing::info!(session = id, pids = ?handle.pids(), "flash script running");
            app.flashes.attach(id, handle.clone());
        }
        RelayEvent::Output(line) => tracing::debug!(session = id, "{line}"),
        _ => {}
    }

    match app.variant {
        Variant::Selector => app.selector.apply(&event, Instant::now()),
        Variant::Batch => app.batch.apply(&event),
    }

    if let RelayEvent::Finished(outcome) = event {
        app.flashes.end(id);
        if app.variant == Variant::Batch {
            batch::advance(app, outcome);
        }
        if !app.flashes.is_running()
            && let Some(loaded) = app.pending_catalog.take()
        {
            apply_catalog(app, loaded);
        }
    }

    Task::none()
}

/// Handles messages emitted by the application and its widgets.
pub(crate) fn update(app: &mut AppModel, message: Message) -> Task<Message> {
    match message {
        Message::OpenRepositoryUrl => {
            _ = open::that_detached(REPOSITORY);
        }
        Message::LaunchUrl(url) => match open::that_detached(&url) {
            Ok(()) => {}
            Err(err) => {
                tracing::warn!(?url, %err, "failed to open url");
            }
        },
        Message::ToggleContextPage(context_page) => {
            if app.context_page == context_page {
                // Close the context drawer if the toggled context page is the same.
                app.core.window.show_context = !app.core.window.show_context;
            } else {
                // Open the context drawer to display the requested context page.
                app.context_page = context_page;
                app.core.window.show_context = true;
            }
        }
        Message::UpdateConfig(config) => {
            app.selector.log.set_capacity(config.log_capacity);
            logging::set_log_level(config.log_level);
            logging::set_log_to_disk(config.log_to_disk);
            app.config = config;
        }

        Message::CatalogLoaded(Ok(loaded)) => {
            if app.flashes.is_running() {
                tracing::info!("catalog loaded during a flash, applying it afterwards");
                app.pending_catalog = Some(loaded);
            } else {
                apply_catalog(app, loaded);
            }
        }
        Message::CatalogLoaded(Err(e)) => {
            tracing::error!(%e, "failed to load catalog");
            app.log_mut()
                .push_error(fl!("catalog-load-failed", error = e.as_str()));
        }
        Message::RecoveryDevicesScanned(devices) => {
            if devices != app.recovery_devices {
                tracing::info!(count = devices.len(), "recovery-mode devices changed");
                app.recovery_devices = devices;
            }
        }
        Message::CredentialChanged(value) => {
            if app.inputs_enabled() {
                app.credential = Credential::new(value);
            }
        }
        Message::KeepFilesToggled(keep_files) => {
            if app.inputs_enabled() {
                app.keep_files = keep_files;
            }
        }

        Message::Selector(message) => return selector::update(app, message),
        Message::Batch(message) => return batch::update(app, message),

        Message::Flash(id, event) => return on_flash_event(app, id, event),
        Message::CancelFlash => {
            if app.flashes.cancel() {
                tracing::info!("flash cancel requested");
                app.log_mut().push_notice(fl!("flash-cancelling"));
            }
        }

        Message::LogLevelChanged(index) => {
            let level = LoggingLevel::from_index(index);
            app.config.log_level = level;
            persist_config(&app.config);
            logging::set_log_level(level);
        }
        Message::ToggleLogToDisk(log_to_disk) => {
            app.config.log_to_disk = log_to_disk;
            persist_config(&app.config);
            logging::set_log_to_disk(log_to_disk);
        }
        Message::ToggleElevate(_)
        | Message::ToggleStopUdisks(_)
        | Message::LogCapacityChanged(_)
        | Message::ScriptPathChanged(_)
        | Message::CatalogPathChanged(_)
            if !app.inputs_enabled() =>
        {
            tracing::debug!("launch settings are locked while flashing");
        }
        Message::ToggleElevate(elevate) => {
            app.config.elevate = elevate;
            persist_config(&app.config);
        }
        Message::ToggleStopUdisks(stop_udisks) => {
            app.config.stop_udisks = stop_udisks;
            persist_config(&app.config);
        }
        Message::LogCapacityChanged(value) => {
            if let Ok(capacity) = value.trim().parse::<usize>()
                && capacity > 0
            {
                app.config.log_capacity = capacity;
                app.selector.log.set_capacity(capacity);
                persist_config(&app.config);
            }
        }
        Message::ScriptPathChanged(path) => {
            app.config.script_path = path;
            persist_config(&app.config);
        }
        Message::CatalogPathChanged(path) => {
            app.config.catalog_path = path;
            persist_config(&app.config);
        }
        Message::ReloadCatalog => {
            if app.inputs_enabled() {
                return load_catalog(app.config.catalog_override());
            }
        }

        Message::None => {}
    }

    Task::none()
}
