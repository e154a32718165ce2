// SPDX-License-Identifier: GPL-3.0-only

use crate::config::Config;
use crate::message::Message;
use crate::state::AppModel;
use cosmic::Application;
use cosmic::iced::Subscription;
use futures_util::SinkExt;
use flash_sys::{FlashHandle, RelayEvent};
use std::time::Duration;

const USB_SCAN_INTERVAL: Duration = Duration::from_secs(3);

/// Subscription relaying one flash session.
struct FlashSubscription;

/// Subscription polling USB for modules in recovery mode.
struct RecoveryScanSubscription;

/// Signals the script if the session stream is dropped before it finished,
/// e.g. when the window closes mid-flash.
struct CancelOnDrop(Option<FlashHandle>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take()
            && !handle.is_finished()
        {
            tracing::warn!("flash session dropped while running, stopping script");
            handle.cancel();
        }
    }
}

/// Register subscriptions for this application.
///
/// Subscriptions are long-running async tasks running in the background which
/// emit messages to the application through a channel.
pub(crate) fn subscription(app: &AppModel) -> Subscription<Message> {
    let mut subs: Vec<Subscription<Message>> = vec![
        Subscription::run_with_id(
            std::any::TypeId::of::<RecoveryScanSubscription>(),
            cosmic::iced::stream::channel(4, move |mut output| async move {
                loop {
                    let devices = tokio::task::spawn_blocking(flash_sys::scan_recovery_devices)
                        .await
                        .unwrap_or_default();
                    if output
                        .send(Message::RecoveryDevicesScanned(devices))
                        .await
                        .is_err()
                    {
                        return;
                    }
                    tokio::time::sleep(USB_SCAN_INTERVAL).await;
                }
            }),
        ),
        // Watch for application configuration changes.
        app.core
            .watch_config::<Config>(<AppModel as Application>::APP_ID)
            .map(|update| Message::UpdateConfig(update.config)),
    ];

    if let Some(active) = app.flashes.active() {
        let id = active.id;
        let invocation = active.invocation.clone();
        let options = active.options.clone();

        subs.push(Subscription::run_with_id(
            (std::any::TypeId::of::<FlashSubscription>(), id),
            cosmic::iced::stream::channel(64, move |mut output| async move {
                let (tx, mut rx) = tokio::sync::mpsc::channel::<RelayEvent>(256);

                let worker = tokio::task::spawn_blocking(move || {
                    flash_sys::run_flash(&invocation, &options, |event| {
                        // The receiver is gone only if the session was dropped.
                        let _ = tx.blocking_send(event);
                    })
                });

                let mut guard = CancelOnDrop(None);
                while let Some(event) = rx.recv().await {
                    if let RelayEvent::Started(handle) = &event {
                        guard.0 = Some(handle.clone());
                    }
                    if output.send(Message::Flash(id, event)).await.is_err() {
                        return;
                    }
                }

                if let Err(err) = worker.await {
                    tracing::error!(%err, session = id, "flash worker panicked");
                    let _ = output
                        .send(Message::Flash(
                            id,
                            RelayEvent::Finished(flash_types::FlashOutcome::Failed { code: None }),
                        ))
                        .await;
                }
            }),
        ));
    }

    Subscription::batch(subs)
}
