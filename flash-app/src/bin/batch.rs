// SPDX-License-Identifier: GPL-3.0-only

fn main() -> cosmic::iced::Result {
    jetson_flash::run(jetson_flash::Variant::Batch)
}
