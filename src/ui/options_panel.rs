// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scanner option editor shown beside the canvas.
//!
//! Values are edited as text and only reach the device when the user
//! presses Apply.

use crate::models::device::DeviceOptionMap;

/// Result of option panel interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsAction {
    None,
    Apply,
    Reload,
}

#[derive(Debug, Default)]
pub struct OptionsPanel {
    values: DeviceOptionMap,
    filter: String,
    dirty: bool,
}

impl OptionsPanel {
    pub fn new(values: DeviceOptionMap) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Replace the shown values with what the device reports.
    pub fn set_values(&mut self, values: DeviceOptionMap) {
        self.values = values;
        self.dirty = false;
    }

    pub fn values(&self) -> &DeviceOptionMap {
        &self.values
    }

    /// Option names matching the filter text, case-insensitively.
    fn visible_names(&self) -> Vec<String> {
        let filter = self.filter.trim().to_lowercase();
        self.values
            .keys()
            .filter(|name| filter.is_empty() || name.to_lowercase().contains(&filter))
            .cloned()
            .collect()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, enabled: bool) -> OptionsAction {
        let mut action = OptionsAction::None;

        ui.heading("Scanner options");
        ui.horizontal(|ui| {
            ui.label("Filter:");
            ui.text_edit_singleline(&mut self.filter);
        });
        ui.separator();

        if self.values.is_empty() {
            ui.label(egui::RichText::new("This device has no options").weak());
        }

        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - 40.0).max(0.0))
            .show(ui, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    egui::Grid::new("device_options").num_columns(2).striped(true).show(ui, |ui| {
                        for name in self.visible_names() {
                            ui.label(&name);
                            if let Some(value) = self.values.get_mut(&name) {
                                if ui.text_edit_singleline(value).changed() {
                                    self.dirty = true;
                                }
                            }
                            ui.end_row();
                        }
                    });
                });
            });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_enabled(enabled && self.dirty, egui::Button::new("Apply")).clicked() {
                action = OptionsAction::Apply;
            }
            if ui.add_enabled(enabled, egui::Button::new("Reload")).clicked() {
                action = OptionsAction::Reload;
            }
        });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> OptionsPanel {
        let mut values = DeviceOptionMap::new();
        values.insert("mode".to_string(), "Color".to_string());
        values.insert("resolution".to_string(), "300".to_string());
        values.insert("tl-x".to_string(), "0".to_string());
        OptionsPanel::new(values)
    }

    #[test]
    fn test_filter_matches_case_insensitively() {
        let mut panel = panel();
        panel.filter = " RES".to_string();
        assert_eq!(panel.visible_names(), vec!["resolution".to_string()]);

        panel.filter.clear();
        assert_eq!(panel.visible_names().len(), 3);
    }

    #[test]
    fn test_set_values_clears_dirty_flag() {
        let mut panel = panel();
        panel.dirty = true;
        panel.set_values(DeviceOptionMap::new());
        assert!(!panel.dirty);
        assert!(panel.values().is_empty());
    }
}
