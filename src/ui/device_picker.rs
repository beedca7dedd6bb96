// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Device selection shown when several scanners are available.

use crate::models::device::DeviceInfo;

/// Result of device picker interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Open(usize),
    Cancel,
}

pub fn show(ctx: &egui::Context, devices: &[DeviceInfo], selected: &mut usize) -> PickerAction {
    let mut action = PickerAction::None;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Select a scanner");
        ui.add_space(8.0);

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (index, device) in devices.iter().enumerate() {
                let text = format!("{}\n{} ({})", device.display_name(), device.name, device.kind);
                let response = ui.selectable_label(*selected == index, text);
                if response.clicked() {
                    *selected = index;
                }
                if response.double_clicked() {
                    action = PickerAction::Open(index);
                }
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(*selected < devices.len(), egui::Button::new("OK")).clicked() {
                action = PickerAction::Open(*selected);
            }
            if ui.button("Cancel").clicked() {
                action = PickerAction::Cancel;
            }
        });
    });

    if ctx.input(|i| i.key_pressed(egui::Key::Enter)) && *selected < devices.len() {
        action = PickerAction::Open(*selected);
    }
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = PickerAction::Cancel;
    }

    action
}
