// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Native message boxes and file choosers for the save workflow.

use super::save_location::SaveLocationDialog;
use crate::models::settings::SaveSettings;
use crate::save::SavePrompts;
use std::path::{Path, PathBuf};

/// Show a modal error box.
pub fn alert(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

/// [`SavePrompts`] backed by the platform's dialogs.
///
/// The save location is chosen in an egui window before saving starts, so
/// its answer is handed in here rather than asked for.
#[derive(Default)]
pub struct NativePrompts {
    pub location: Option<SaveLocationDialog>,
}

impl SavePrompts for NativePrompts {
    fn notify(&mut self, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title("Scanlite")
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn alert(&mut self, message: &str) {
        alert("Scanlite", message);
    }

    fn choose_location(&mut self, settings: &mut SaveSettings) -> bool {
        match self.location.take() {
            Some(dialog) => {
                dialog.apply(settings);
                true
            }
            None => {
                log::warn!("No save location was chosen");
                false
            }
        }
    }

    fn confirm_file(&mut self, proposed: &Path, formats: &[String]) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title("Save Image").add_filter("Images", formats);
        if let Some(dir) = proposed.parent() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(name) = proposed.file_name() {
            dialog = dialog.set_file_name(name.to_string_lossy());
        }
        dialog.save_file()
    }
}
