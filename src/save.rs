// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Saving a finished scan.
//!
//! Picks the output format, finds the next unused file name, asks the user
//! when the save mode calls for it, writes the file and finally advances the
//! remembered prefix and counter. All user interaction goes through
//! [`SavePrompts`] so the workflow runs the same with native dialogs or
//! with a scripted test double.

use crate::io::formats::{formats_for_depth, SIXTEEN_BIT_FORMAT};
use crate::io::naming::{base_name, compose_file_name, next_free_number, split_trailing_number, Location, MAX_FILE_NUMBER};
use crate::io::writer::write_image;
use crate::models::scan::ScanResult;
use crate::models::settings::{SaveMode, SaveSettings, SettingsContext};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Shown when a 16-bit scan has to be written as PNG.
pub const SIXTEEN_BIT_NOTICE: &str =
    "The image will be saved in the PNG format, as Scanlite only supports saving 16 bit color images in the PNG format.";

/// User interaction needed while saving.
pub trait SavePrompts {
    /// Informational message.
    fn notify(&mut self, message: &str);

    /// Error message.
    fn alert(&mut self, message: &str);

    /// Let the user pick where automatic saves go. `false` cancels the save.
    fn choose_location(&mut self, settings: &mut SaveSettings) -> bool;

    /// Let the user confirm or edit the proposed file. `None` cancels.
    fn confirm_file(&mut self, proposed: &Path, formats: &[String]) -> Option<PathBuf>;
}

/// How a save attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The user backed out of a dialog; nothing changed.
    Cancelled,
    /// The user has been told why; settings are unchanged.
    Failed,
}

/// Save `scan` according to the settings in `context`.
pub fn save_scan(context: &mut SettingsContext, scan: &ScanResult, prompts: &mut dyn SavePrompts) -> SaveOutcome {
    if context.needs_location() {
        if !prompts.choose_location(&mut context.save) {
            return SaveOutcome::Cancelled;
        }
        context.location_pending = false;
    }

    let settings = &context.save;
    let is_16bit = scan.format.is_16bit();
    let formats = formats_for_depth(is_16bit);
    let mut extension = settings.format.to_lowercase();
    if is_16bit && extension != SIXTEEN_BIT_FORMAT {
        extension = SIXTEEN_BIT_FORMAT.to_string();
        prompts.notify(SIXTEEN_BIT_NOTICE);
    }

    let location = Location::parse(&settings.directory);
    let destination = location.destination();
    let Some(number) = next_free_number(destination.as_ref(), &settings.prefix, settings.next_number, &extension)
    else {
        prompts.alert(&format!(
            "There is no unused file name left for \"{}\" in {}",
            settings.prefix, settings.directory
        ));
        return SaveOutcome::Failed;
    };
    let proposed = location.join(&compose_file_name(&settings.prefix, number, &extension));

    let path = match settings.save_mode {
        SaveMode::Manual => match prompts.confirm_file(&proposed, &formats) {
            Some(path) => with_default_extension(path, &extension),
            None => return SaveOutcome::Cancelled,
        },
        SaveMode::AskFirst => proposed,
    };
    context.location_pending = false;

    let written = match Location::parse(&path.to_string_lossy()) {
        Location::Remote(url) => Err(anyhow::anyhow!("Saving to remote locations is not supported ({})", url)),
        Location::Local(_) => write_scan(scan, &path, &extension, settings.quality()),
    };
    if let Err(e) = written {
        log::error!("Failed to save image to {}: {:#}", path.display(), e);
        prompts.alert(&format!("Failed to save image: {:#}", e));
        return SaveOutcome::Failed;
    }

    log::info!("Saved image to {}", path.display());
    remember_saved_file(&mut context.save, &path);
    SaveOutcome::Saved(path)
}

/// Encode and write the scan. 16-bit scans are always written as PNG.
fn write_scan(scan: &ScanResult, path: &Path, extension: &str, quality: Option<u8>) -> Result<()> {
    let image = scan.to_image()?;
    let format = if scan.format.is_16bit() {
        SIXTEEN_BIT_FORMAT.to_string()
    } else {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => extension.to_string(),
        }
    };
    if format.is_empty() {
        bail!("{} has no image format", path.display());
    }
    write_image(&image, path, &format, quality)
}

fn with_default_extension(path: PathBuf, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(extension)
    }
}

/// Update prefix and counter after a successful save.
///
/// In manual mode the directory and format of the chosen file are kept for
/// the next proposal as well.
fn remember_saved_file(settings: &mut SaveSettings, path: &Path) {
    let (prefix, number) = split_trailing_number(&base_name(path));
    settings.prefix = prefix;
    if number != 0 {
        settings.next_number = number.saturating_add(1).min(MAX_FILE_NUMBER);
    }

    if settings.save_mode == SaveMode::Manual {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            settings.directory = parent.to_string_lossy().into_owned();
        }
        if let Some(ext) = path.extension() {
            settings.format = ext.to_string_lossy().to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scan::PixelFormat;
    use crate::models::settings::GeneralSettings;

    /// Scripted answers and a log of what the user was shown.
    #[derive(Default)]
    struct ScriptedPrompts {
        notices: Vec<String>,
        alerts: Vec<String>,
        location_asked: usize,
        /// Directory picked when asked; `None` cancels.
        location_answer: Option<String>,
        proposals: Vec<(PathBuf, Vec<String>)>,
        /// Replacement path for confirm_file; `None` accepts the proposal.
        file_answer: Option<PathBuf>,
        cancel_file: bool,
    }

    impl SavePrompts for ScriptedPrompts {
        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn choose_location(&mut self, settings: &mut SaveSettings) -> bool {
            self.location_asked += 1;
            match &self.location_answer {
                Some(dir) => {
                    settings.directory = dir.clone();
                    true
                }
                None => false,
            }
        }

        fn confirm_file(&mut self, proposed: &Path, formats: &[String]) -> Option<PathBuf> {
            self.proposals.push((proposed.to_path_buf(), formats.to_vec()));
            if self.cancel_file {
                return None;
            }
            Some(self.file_answer.clone().unwrap_or_else(|| proposed.to_path_buf()))
        }
    }

    fn gray8_scan() -> ScanResult {
        ScanResult {
            data: (0..64).collect(),
            width: 8,
            height: 8,
            bytes_per_line: 8,
            format: PixelFormat::Gray8,
        }
    }

    fn gray16_scan() -> ScanResult {
        ScanResult {
            data: vec![0x12; 8 * 8 * 2],
            width: 8,
            height: 8,
            bytes_per_line: 16,
            format: PixelFormat::Gray16,
        }
    }

    fn context_in(dir: &Path, mode: SaveMode) -> SettingsContext {
        let save = SaveSettings {
            save_mode: mode,
            directory: dir.to_string_lossy().into_owned(),
            ..SaveSettings::default()
        };
        SettingsContext::new(save, GeneralSettings::default())
    }

    #[test]
    fn test_manual_save_uses_next_free_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Image-0001.png"), b"taken").unwrap();
        let mut context = context_in(dir.path(), SaveMode::Manual);
        let mut prompts = ScriptedPrompts::default();

        let outcome = save_scan(&mut context, &gray8_scan(), &mut prompts);

        let expected = dir.path().join("Image-0002.png");
        assert_eq!(outcome, SaveOutcome::Saved(expected.clone()));
        assert_eq!(prompts.proposals.len(), 1);
        assert_eq!(prompts.proposals[0].0, expected);
        assert!(expected.exists());
        assert_eq!(context.save.prefix, "Image-");
        assert_eq!(context.save.next_number, 3);
    }

    #[test]
    fn test_manual_edit_remembers_prefix_directory_and_format() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("receipts");
        std::fs::create_dir(&other).unwrap();
        let mut context = context_in(dir.path(), SaveMode::Manual);
        let mut prompts = ScriptedPrompts {
            file_answer: Some(other.join("Receipt-0041.jpeg")),
            ..ScriptedPrompts::default()
        };

        let outcome = save_scan(&mut context, &gray8_scan(), &mut prompts);

        assert_eq!(outcome, SaveOutcome::Saved(other.join("Receipt-0041.jpeg")));
        assert_eq!(context.save.prefix, "Receipt-");
        assert_eq!(context.save.next_number, 42);
        assert_eq!(context.save.directory, other.to_string_lossy());
        assert_eq!(context.save.format, "jpeg");
        assert_eq!(image::open(other.join("Receipt-0041.jpeg")).unwrap().width(), 8);
    }

    #[test]
    fn test_manual_name_without_digits_keeps_counter() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::Manual);
        context.save.next_number = 5;
        let mut prompts = ScriptedPrompts {
            file_answer: Some(dir.path().join("cover")),
            ..ScriptedPrompts::default()
        };

        let outcome = save_scan(&mut context, &gray8_scan(), &mut prompts);

        assert_eq!(outcome, SaveOutcome::Saved(dir.path().join("cover.png")));
        assert_eq!(context.save.prefix, "cover");
        assert_eq!(context.save.next_number, 5);
    }

    #[test]
    fn test_counter_stays_in_range_after_last_number() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::Manual);
        let mut prompts = ScriptedPrompts {
            file_answer: Some(dir.path().join("scan999999.png")),
            ..ScriptedPrompts::default()
        };

        let outcome = save_scan(&mut context, &gray8_scan(), &mut prompts);

        assert_eq!(outcome, SaveOutcome::Saved(dir.path().join("scan999999.png")));
        assert_eq!(context.save.prefix, "scan");
        assert_eq!(context.save.next_number, MAX_FILE_NUMBER);
    }

    #[test]
    fn test_cancelled_dialog_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::Manual);
        let before = context.save.clone();
        let mut prompts = ScriptedPrompts {
            cancel_file: true,
            ..ScriptedPrompts::default()
        };

        assert_eq!(save_scan(&mut context, &gray8_scan(), &mut prompts), SaveOutcome::Cancelled);
        assert_eq!(context.save, before);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_sixteen_bit_forces_png_with_one_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::AskFirst);
        context.location_pending = false;
        context.save.format = "jpeg".to_string();
        let mut prompts = ScriptedPrompts::default();

        let outcome = save_scan(&mut context, &gray16_scan(), &mut prompts);

        let expected = dir.path().join("Image-0001.png");
        assert_eq!(outcome, SaveOutcome::Saved(expected.clone()));
        assert_eq!(prompts.notices, vec![SIXTEEN_BIT_NOTICE.to_string()]);
        assert_eq!(image::open(&expected).unwrap().color(), image::ColorType::L16);
        // The override is for this save only.
        assert_eq!(context.save.format, "jpeg");
    }

    #[test]
    fn test_sixteen_bit_manual_offers_only_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::Manual);
        context.save.format = "tif".to_string();
        let mut prompts = ScriptedPrompts::default();

        save_scan(&mut context, &gray16_scan(), &mut prompts);

        assert_eq!(prompts.notices.len(), 1);
        assert_eq!(prompts.proposals[0].1, vec!["png".to_string()]);
        assert_eq!(prompts.proposals[0].0, dir.path().join("Image-0001.png"));
    }

    #[test]
    fn test_png_sixteen_bit_needs_no_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::Manual);
        let mut prompts = ScriptedPrompts::default();

        save_scan(&mut context, &gray16_scan(), &mut prompts);
        assert!(prompts.notices.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_settings_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no").join("such").join("dir");
        let mut context = context_in(&missing, SaveMode::AskFirst);
        context.location_pending = false;
        context.save.prefix = "Page-".to_string();
        context.save.next_number = 7;
        let before = context.save.clone();
        let mut prompts = ScriptedPrompts::default();

        let outcome = save_scan(&mut context, &gray8_scan(), &mut prompts);

        assert_eq!(outcome, SaveOutcome::Failed);
        assert_eq!(context.save, before);
        assert_eq!(prompts.alerts.len(), 1);
        assert!(prompts.alerts[0].starts_with("Failed to save image:"));
        assert!(prompts.alerts[0].contains("Page-0007.png"));
    }

    #[test]
    fn test_ask_first_asks_once() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("batch");
        std::fs::create_dir(&target).unwrap();
        let mut context = context_in(dir.path(), SaveMode::AskFirst);
        let mut prompts = ScriptedPrompts {
            location_answer: Some(target.to_string_lossy().into_owned()),
            ..ScriptedPrompts::default()
        };

        let first = save_scan(&mut context, &gray8_scan(), &mut prompts);
        let second = save_scan(&mut context, &gray8_scan(), &mut prompts);

        assert_eq!(first, SaveOutcome::Saved(target.join("Image-0001.png")));
        assert_eq!(second, SaveOutcome::Saved(target.join("Image-0002.png")));
        assert_eq!(prompts.location_asked, 1);
        assert!(prompts.proposals.is_empty());
        assert_eq!(context.save.next_number, 3);
    }

    #[test]
    fn test_ask_first_cancel_asks_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::AskFirst);
        let mut prompts = ScriptedPrompts::default();

        assert_eq!(save_scan(&mut context, &gray8_scan(), &mut prompts), SaveOutcome::Cancelled);
        assert!(context.needs_location());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_quality_is_applied_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let scan = ScanResult {
            data: (0..64 * 64 * 3).map(|i| (i * 7 % 251) as u8).collect(),
            width: 64,
            height: 64,
            bytes_per_line: 64 * 3,
            format: PixelFormat::Rgb8,
        };

        let mut sizes = Vec::new();
        for quality in [10u8, 95] {
            let mut context = context_in(dir.path(), SaveMode::AskFirst);
            context.location_pending = false;
            context.save.format = "jpeg".to_string();
            context.save.prefix = format!("q{}-", quality);
            context.save.quality = quality;
            context.save.set_quality = true;

            let outcome = save_scan(&mut context, &scan, &mut ScriptedPrompts::default());
            let SaveOutcome::Saved(path) = outcome else {
                panic!("save failed: {:?}", outcome);
            };
            sizes.push(std::fs::metadata(path).unwrap().len());
        }

        assert!(sizes[0] < sizes[1]);
    }

    #[test]
    fn test_remote_location_is_reported() {
        let mut context = SettingsContext::new(
            SaveSettings {
                save_mode: SaveMode::AskFirst,
                directory: "sftp://nas/scans".to_string(),
                ..SaveSettings::default()
            },
            GeneralSettings::default(),
        );
        context.location_pending = false;
        let before = context.save.clone();
        let mut prompts = ScriptedPrompts::default();

        assert_eq!(save_scan(&mut context, &gray8_scan(), &mut prompts), SaveOutcome::Failed);
        assert!(prompts.alerts[0].contains("remote"));
        assert_eq!(context.save, before);
    }

    #[test]
    fn test_broken_scan_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(dir.path(), SaveMode::AskFirst);
        context.location_pending = false;
        let scan = ScanResult {
            data: vec![0; 3],
            ..gray8_scan()
        };
        let mut prompts = ScriptedPrompts::default();

        assert_eq!(save_scan(&mut context, &scan, &mut prompts), SaveOutcome::Failed);
        assert_eq!(prompts.alerts.len(), 1);
        assert_eq!(context.save.next_number, 1);
    }
}
