// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dialog asked before the first automatic save.
//!
//! Sets where images go and how they are named: directory, name prefix,
//! format and the number to start counting from.

use crate::io::formats::offered_formats;
use crate::io::naming::{compose_file_name, MAX_FILE_NUMBER};
use crate::models::settings::SaveSettings;

/// Result of save location dialog interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAction {
    None,
    Accept,
    Cancel,
}

pub struct SaveLocationDialog {
    directory: String,
    prefix: String,
    format: String,
    start_number: u32,
    formats: Vec<String>,
}

impl SaveLocationDialog {
    pub fn new(settings: &SaveSettings) -> Self {
        Self {
            directory: settings.directory.clone(),
            prefix: settings.prefix.clone(),
            format: settings.format.clone(),
            start_number: settings.next_number,
            formats: offered_formats(&settings.format),
        }
    }

    /// Name the first image would get.
    fn example_name(&self) -> String {
        compose_file_name(&self.prefix, self.start_number.min(MAX_FILE_NUMBER), &self.format.to_lowercase())
    }

    /// Write the chosen location and naming into `settings`.
    pub fn apply(self, settings: &mut SaveSettings) {
        settings.directory = self.directory.trim().to_string();
        settings.prefix = self.prefix;
        settings.format = self.format.to_lowercase();
        settings.next_number = self.start_number.min(MAX_FILE_NUMBER);
    }

    pub fn show(&mut self, ctx: &egui::Context) -> LocationAction {
        let mut action = LocationAction::None;

        egui::Window::new("Save location")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("save_location").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                    ui.label("Save location:");
                    ui.horizontal(|ui| {
                        ui.text_edit_singleline(&mut self.directory);
                        if ui.button("Browse...").clicked() {
                            if let Some(dir) = rfd::FileDialog::new()
                                .set_title("Save location")
                                .set_directory(&self.directory)
                                .pick_folder()
                            {
                                self.directory = dir.to_string_lossy().into_owned();
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("Name prefix:");
                    ui.text_edit_singleline(&mut self.prefix);
                    ui.end_row();

                    ui.label("Image format:");
                    egui::ComboBox::from_id_source("location_format")
                        .selected_text(self.format.to_uppercase())
                        .show_ui(ui, |ui| {
                            for format in &self.formats {
                                ui.selectable_value(&mut self.format, format.clone(), format.to_uppercase());
                            }
                        });
                    ui.end_row();

                    ui.label("Start numbering from:");
                    ui.add(egui::DragValue::new(&mut self.start_number).clamp_range(0..=MAX_FILE_NUMBER));
                    ui.end_row();
                });

                ui.label(egui::RichText::new(format!("Example: {}", self.example_name())).weak());

                ui.separator();
                ui.horizontal(|ui| {
                    let ready = !self.directory.trim().is_empty();
                    if ui.add_enabled(ready, egui::Button::new("OK")).clicked() {
                        action = LocationAction::Accept;
                    }
                    if ui.button("Cancel").clicked() {
                        action = LocationAction::Cancel;
                    }
                });
            });

        action
    }
}
