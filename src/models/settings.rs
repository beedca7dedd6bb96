// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User preferences.
//!
//! These are the values the settings dialog edits and the save workflow
//! reads. They are plain data; persistence lives in [`crate::config`].

use std::path::PathBuf;

/// Number the file name counter starts from on a fresh install.
pub const DEFAULT_START_NUMBER: u32 = 1;

/// How the save workflow asks for destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Show a save dialog for every image.
    #[default]
    Manual,
    /// Ask for a location once, then name files automatically.
    AskFirst,
}

impl SaveMode {
    /// Index stored in the settings file.
    pub fn index(self) -> i32 {
        match self {
            SaveMode::Manual => 0,
            SaveMode::AskFirst => 1,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(SaveMode::Manual),
            1 => Some(SaveMode::AskFirst),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SaveMode::Manual => "Open the save dialog for every image",
            SaveMode::AskFirst => "Open the save dialog for the first image only",
        }
    }
}

/// Where and how scanned images are saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSettings {
    pub save_mode: SaveMode,
    /// Destination directory; a local path or a URL.
    pub directory: String,
    pub prefix: String,
    /// Next number to try when composing a file name.
    pub next_number: u32,
    /// File extension naming the output format, e.g. `png`.
    pub format: String,
    pub quality: u8,
    pub set_quality: bool,
    pub show_before_save: bool,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            save_mode: SaveMode::default(),
            directory: default_directory(),
            prefix: "Image-".to_string(),
            next_number: DEFAULT_START_NUMBER,
            format: "png".to_string(),
            quality: 90,
            set_quality: false,
            show_before_save: true,
        }
    }
}

impl SaveSettings {
    /// Encoder quality, if the user asked for one.
    pub fn quality(&self) -> Option<u8> {
        self.set_quality.then_some(self.quality)
    }
}

/// Home directory, or the current directory when there is none.
pub fn default_directory() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .into_owned()
}

/// Preferences not tied to saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralSettings {
    /// Resolution used for preview scans, as typed by the user.
    pub preview_dpi: String,
    pub set_preview_dpi: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            preview_dpi: "100".to_string(),
            set_preview_dpi: false,
        }
    }
}

impl GeneralSettings {
    /// Preview resolution to hand the scanner, `None` for its own default.
    pub fn preview_resolution(&self) -> Option<f32> {
        if !self.set_preview_dpi {
            return None;
        }
        self.preview_dpi.trim().parse::<f32>().ok().filter(|dpi| *dpi > 0.0)
    }
}

/// Main window size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: 740.0,
            height: 400.0,
        }
    }
}

/// Settings shared by the controller and the save workflow.
#[derive(Debug, Clone, Default)]
pub struct SettingsContext {
    pub save: SaveSettings,
    pub general: GeneralSettings,
    /// In [`SaveMode::AskFirst`], the location has not been asked yet.
    pub location_pending: bool,
}

impl SettingsContext {
    pub fn new(save: SaveSettings, general: GeneralSettings) -> Self {
        let location_pending = save.save_mode == SaveMode::AskFirst;
        Self {
            save,
            general,
            location_pending,
        }
    }

    /// Replace the preferences after the settings dialog was accepted.
    ///
    /// The next save in [`SaveMode::AskFirst`] asks for a location again.
    pub fn apply(&mut self, save: SaveSettings, general: GeneralSettings) {
        self.save = save;
        self.general = general;
        self.location_pending = true;
    }

    /// Whether the next save must ask for a location first.
    pub fn needs_location(&self) -> bool {
        self.save.save_mode == SaveMode::AskFirst && self.location_pending
    }
}
