// SPDX-License-Identifier: GPL-3.0-only

pub(crate) mod app;
mod batch;
mod log_pane;
mod selector;
mod settings;
mod status;
