// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Button row along the top of the main window.

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Preview,
    Scan,
    Settings,
    About,
    Close,
}

/// Display the toolbar. Scan and Settings buttons are disabled while a scan
/// runs.
pub fn show(ui: &mut egui::Ui, scanning: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(!scanning, egui::Button::new("🔍 Preview")).clicked() {
            action = ToolbarAction::Preview;
        }
        if ui.add_enabled(!scanning, egui::Button::new("📷 Scan")).clicked() {
            action = ToolbarAction::Scan;
        }

        ui.separator();

        if ui.add_enabled(!scanning, egui::Button::new("⚙ Settings")).clicked() {
            action = ToolbarAction::Settings;
        }
        if ui.button("About").clicked() {
            action = ToolbarAction::About;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Close").clicked() {
                action = ToolbarAction::Close;
            }
        });
    });

    action
}
