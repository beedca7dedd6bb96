// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

use crate::models::device::DeviceInfo;

/// About window; `open` is cleared when the user closes it.
pub fn show(ctx: &egui::Context, open: &mut bool, device: Option<&DeviceInfo>) {
    egui::Window::new("About Scanlite")
        .open(open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading(format!("Scanlite {}", env!("CARGO_PKG_VERSION")));
            ui.label(env!("CARGO_PKG_DESCRIPTION"));
            ui.label(format!("License: {}", env!("CARGO_PKG_LICENSE")));
            ui.separator();
            match device {
                Some(info) => {
                    ui.label(format!("Scanner: {}", info.display_name()));
                    ui.label(format!("Device: {} ({})", info.name, info.kind));
                }
                None => {
                    ui.label("No scanner open");
                }
            }
        });
}
