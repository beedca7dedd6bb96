// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings dialog.
//!
//! Works on a copy of the current settings. Nothing changes until the user
//! presses OK; Close throws the copy away. On OK only the fields the user
//! touched are written back, so a counter advanced by a save in the
//! meantime survives.

use crate::io::formats::offered_formats;
use crate::io::naming::MAX_FILE_NUMBER;
use crate::models::settings::{GeneralSettings, SaveMode, SaveSettings, SettingsContext};

/// Resolutions offered for preview scans.
const PREVIEW_DPI_CHOICES: [&str; 6] = ["50", "75", "100", "150", "200", "300"];

/// Result of settings dialog interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    Accept,
    Close,
    RevertOptions,
}

pub struct SettingsDialog {
    save: SaveSettings,
    general: GeneralSettings,
    /// Values the dialog was opened with.
    original_save: SaveSettings,
    original_general: GeneralSettings,
    formats: Vec<String>,
}

/// `edited` if the user changed it, otherwise the value `current` holds now.
fn changed_or<T: PartialEq>(original: T, edited: T, current: T) -> T {
    if edited != original {
        edited
    } else {
        current
    }
}

impl SettingsDialog {
    pub fn new(context: &SettingsContext) -> Self {
        let formats = offered_formats(&context.save.format);
        Self {
            save: context.save.clone(),
            general: context.general.clone(),
            original_save: context.save.clone(),
            original_general: context.general.clone(),
            formats,
        }
    }

    /// The user's edits laid over `current`, tidied up for storage.
    pub fn merge_into(self, current: &SettingsContext) -> (SaveSettings, GeneralSettings) {
        let (edited, original, now) = (self.save, self.original_save, current.save.clone());
        let mut save = SaveSettings {
            save_mode: changed_or(original.save_mode, edited.save_mode, now.save_mode),
            directory: changed_or(original.directory, edited.directory, now.directory),
            prefix: changed_or(original.prefix, edited.prefix, now.prefix),
            next_number: changed_or(original.next_number, edited.next_number, now.next_number),
            format: changed_or(original.format, edited.format, now.format),
            quality: changed_or(original.quality, edited.quality, now.quality),
            set_quality: changed_or(original.set_quality, edited.set_quality, now.set_quality),
            show_before_save: changed_or(original.show_before_save, edited.show_before_save, now.show_before_save),
        };
        save.quality = save.quality.clamp(1, 100);
        save.next_number = save.next_number.min(MAX_FILE_NUMBER);
        save.format = save.format.to_lowercase();

        let (edited, original, now) = (self.general, self.original_general, current.general.clone());
        let mut general = GeneralSettings {
            preview_dpi: changed_or(original.preview_dpi, edited.preview_dpi, now.preview_dpi),
            set_preview_dpi: changed_or(original.set_preview_dpi, edited.set_preview_dpi, now.set_preview_dpi),
        };
        general.preview_dpi = general.preview_dpi.trim().to_string();
        (save, general)
    }

    pub fn show(&mut self, ctx: &egui::Context) -> SettingsAction {
        let mut action = SettingsAction::None;

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.heading("Image saving");
                egui::Grid::new("saving_settings").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                    ui.label("Save mode:");
                    egui::ComboBox::from_id_source("save_mode")
                        .selected_text(self.save.save_mode.label())
                        .show_ui(ui, |ui| {
                            for mode in [SaveMode::Manual, SaveMode::AskFirst] {
                                ui.selectable_value(&mut self.save.save_mode, mode, mode.label());
                            }
                        });
                    ui.end_row();

                    ui.label("Location:");
                    ui.horizontal(|ui| {
                        ui.text_edit_singleline(&mut self.save.directory);
                        if ui.button("Browse...").clicked() {
                            if let Some(dir) = rfd::FileDialog::new()
                                .set_title("Save location")
                                .set_directory(&self.save.directory)
                                .pick_folder()
                            {
                                self.save.directory = dir.to_string_lossy().into_owned();
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("Name prefix:");
                    ui.text_edit_singleline(&mut self.save.prefix);
                    ui.end_row();

                    ui.label("Start numbering from:");
                    ui.add(egui::DragValue::new(&mut self.save.next_number).clamp_range(0..=MAX_FILE_NUMBER));
                    ui.end_row();

                    ui.label("Image format:");
                    egui::ComboBox::from_id_source("image_format")
                        .selected_text(self.save.format.to_uppercase())
                        .show_ui(ui, |ui| {
                            for format in &self.formats {
                                ui.selectable_value(&mut self.save.format, format.clone(), format.to_uppercase());
                            }
                        });
                    ui.end_row();

                    ui.checkbox(&mut self.save.set_quality, "Set quality:");
                    ui.add_enabled(self.save.set_quality, egui::Slider::new(&mut self.save.quality, 1..=100));
                    ui.end_row();
                });
                ui.checkbox(&mut self.save.show_before_save, "Show the image before saving");

                ui.separator();
                ui.heading("General");
                ui.horizontal(|ui| {
                    ui.checkbox(&mut self.general.set_preview_dpi, "Set preview resolution (DPI):");
                    ui.add_enabled_ui(self.general.set_preview_dpi, |ui| {
                        egui::ComboBox::from_id_source("preview_dpi")
                            .selected_text(self.general.preview_dpi.as_str())
                            .show_ui(ui, |ui| {
                                for dpi in PREVIEW_DPI_CHOICES {
                                    ui.selectable_value(&mut self.general.preview_dpi, dpi.to_string(), dpi);
                                }
                            });
                    });
                });
                if ui.button("Revert scanner options to default values").clicked() {
                    action = SettingsAction::RevertOptions;
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        action = SettingsAction::Accept;
                    }
                    if ui.button("Close").clicked() {
                        action = SettingsAction::Close;
                    }
                });
            });

        action
    }
}
