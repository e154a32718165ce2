// SPDX-License-Identifier: GPL-3.0-only

pub const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

pub use crate::message::Message;
pub use crate::state::{AppModel, ContextPage};

use crate::config::Config;
use crate::fl;
use crate::state::{BatchState, FlashSessions, SelectorState};
use cosmic::app::{Core, Task};
use cosmic::{Application, ApplicationExt, Element};
use flash_types::Credential;

pub(crate) const APP_ID: &str = "com.cosmic.ext.JetsonFlash";

/// Which window the application shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    /// Cascading dropdowns for a single device profile.
    #[default]
    Selector,
    /// Checkbox table over the catalog, flashed row by row.
    Batch,
}

impl AppModel {
    /// Updates the header and window titles.
    pub fn update_title(&mut self) -> Task<Message> {
        let window_title = match self.variant {
            Variant::Selector => fl!("app-title"),
            Variant::Batch => fl!("app-title-batch"),
        };

        if let Some(id) = self.core.main_window_id() {
            self.set_window_title(window_title, id)
        } else {
            Task::none()
        }
    }
}

impl Application for AppModel {
    type Executor = cosmic::executor::Default;
    type Flags = Variant;
    type Message = Message;
    const APP_ID: &'static str = APP_ID;

    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn init(core: Core, variant: Self::Flags) -> (Self, Task<Self::Message>) {
        let config = Config::load(Self::APP_ID);

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            selector: SelectorState::new(config.log_capacity),
            batch: BatchState::default(),
            config,
            variant,
            username: flash_sys::invoking_user(),
            credential: Credential::default(),
            keep_files: false,
            recovery_devices: Vec::new(),
            flashes: FlashSessions::default(),
            pending_catalog: None,
        };

        tracing::info!(user = %app.username, "flashing on behalf of the invoking user");

        let command = app.update_title();
        let catalog_command = crate::update::load_catalog(app.config.catalog_override());

        (app, command.chain(catalog_command))
    }

    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        crate::views::app::header_end(self)
    }

    fn context_drawer(
        &self,
    ) -> Option<cosmic::app::context_drawer::ContextDrawer<'_, Self::Message>> {
        crate::views::app::context_drawer(self)
    }

    fn view(&self) -> Element<'_, Self::Message> {
        crate::views::app::view(self)
    }

    fn subscription(&self) -> cosmic::iced::Subscription<Self::Message> {
        crate::subscriptions::subscription(self)
    }

    fn update(&mut self, message: Self::Message) -> Task<Self::Message> {
        crate::update::update(self, message)
    }
}
