// SPDX-License-Identifier: GPL-3.0-only

mod layout;

pub(crate) use layout::{action_row, labelled_field, page_shell};
