// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted configuration.
//!
//! [`store`] holds the grouped key/value file; the functions here map the
//! application's preference types onto stable group and key names.

pub mod store;

use crate::models::device::DeviceOptionMap;
use crate::models::settings::{
    default_directory, GeneralSettings, SaveMode, SaveSettings, WindowGeometry,
    DEFAULT_START_NUMBER,
};
pub use store::ConfigStore;

pub const WINDOW_GROUP: &str = "Window";
pub const SAVING_GROUP: &str = "Image Saving";
pub const GENERAL_GROUP: &str = "General";

/// Group holding the scan options of one device.
pub fn device_group(device: &str) -> String {
    format!("Options For {}", device)
}

pub fn read_save_settings(store: &ConfigStore) -> SaveSettings {
    let defaults = SaveSettings::default();

    let mode_index = store.read_entry(SAVING_GROUP, "SaveMode", defaults.save_mode.index());
    let save_mode = SaveMode::from_index(mode_index).unwrap_or_else(|| {
        log::warn!("Unknown save mode {}, using manual saving", mode_index);
        SaveMode::Manual
    });

    SaveSettings {
        save_mode,
        directory: store.read_string(SAVING_GROUP, "Location", &default_directory()),
        prefix: store.read_string(SAVING_GROUP, "NamePrefix", &defaults.prefix),
        next_number: store.read_entry(SAVING_GROUP, "NumberStartsFrom", DEFAULT_START_NUMBER),
        format: store.read_string(SAVING_GROUP, "ImgFormat", &defaults.format),
        quality: store
            .read_entry(SAVING_GROUP, "ImgQuality", defaults.quality)
            .clamp(1, 100),
        set_quality: store.read_entry(SAVING_GROUP, "SetQuality", defaults.set_quality),
        show_before_save: store.read_entry(SAVING_GROUP, "ShowBeforeSave", defaults.show_before_save),
    }
}

pub fn write_save_settings(store: &mut ConfigStore, settings: &SaveSettings) {
    store.write_entry(SAVING_GROUP, "SaveMode", settings.save_mode.index());
    store.write_entry(SAVING_GROUP, "Location", &settings.directory);
    store.write_entry(SAVING_GROUP, "NamePrefix", &settings.prefix);
    store.write_entry(SAVING_GROUP, "NumberStartsFrom", settings.next_number);
    store.write_entry(SAVING_GROUP, "ImgFormat", &settings.format);
    store.write_entry(SAVING_GROUP, "ImgQuality", settings.quality);
    store.write_entry(SAVING_GROUP, "SetQuality", settings.set_quality);
    store.write_entry(SAVING_GROUP, "ShowBeforeSave", settings.show_before_save);
}

pub fn read_general_settings(store: &ConfigStore) -> GeneralSettings {
    let defaults = GeneralSettings::default();
    GeneralSettings {
        preview_dpi: store.read_string(GENERAL_GROUP, "PreviewDPI", &defaults.preview_dpi),
        set_preview_dpi: store.read_entry(GENERAL_GROUP, "SetPreviewDPI", defaults.set_preview_dpi),
    }
}

pub fn write_general_settings(store: &mut ConfigStore, settings: &GeneralSettings) {
    store.write_entry(GENERAL_GROUP, "PreviewDPI", &settings.preview_dpi);
    store.write_entry(GENERAL_GROUP, "SetPreviewDPI", settings.set_preview_dpi);
}

/// Window size, stored as `width,height`.
pub fn read_window_geometry(store: &ConfigStore) -> WindowGeometry {
    let Some(raw) = store.entry(WINDOW_GROUP, "Geometry") else {
        return WindowGeometry::default();
    };

    let parsed = raw.split_once(',').and_then(|(w, h)| {
        let width = w.trim().parse::<f32>().ok()?;
        let height = h.trim().parse::<f32>().ok()?;
        (width > 0.0 && height > 0.0).then_some(WindowGeometry { width, height })
    });

    parsed.unwrap_or_else(|| {
        log::warn!("Ignoring malformed window geometry {:?}", raw);
        WindowGeometry::default()
    })
}

pub fn write_window_geometry(store: &mut ConfigStore, geometry: WindowGeometry) {
    let value = format!("{},{}", geometry.width.round(), geometry.height.round());
    store.write_entry(WINDOW_GROUP, "Geometry", value);
}

/// Saved options for a device; empty for a device never seen before.
pub fn read_device_options(store: &ConfigStore, device: &str) -> DeviceOptionMap {
    store.entry_map(&device_group(device))
}

pub fn write_device_options(store: &mut ConfigStore, device: &str, options: &DeviceOptionMap) {
    store.replace_group(&device_group(device), options.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let store = ConfigStore::in_memory();
        let settings = read_save_settings(&store);

        assert_eq!(settings.save_mode, SaveMode::Manual);
        assert_eq!(settings.prefix, "Image-");
        assert_eq!(settings.format, "png");
        assert_eq!(settings.next_number, 1);
        assert_eq!(settings.quality, 90);
        assert!(!settings.set_quality);
        assert!(settings.show_before_save);
        assert_eq!(settings.directory, default_directory());

        assert_eq!(read_general_settings(&store), GeneralSettings::default());
        assert_eq!(read_window_geometry(&store), WindowGeometry::default());
    }

    #[test]
    fn test_save_settings_roundtrip() {
        let samples = [
            SaveSettings {
                save_mode: SaveMode::AskFirst,
                directory: "/srv/scans/archive 2025".to_string(),
                prefix: "Invoice #".to_string(),
                next_number: 4711,
                format: "jpeg".to_string(),
                quality: 42,
                set_quality: true,
                show_before_save: false,
            },
            SaveSettings {
                directory: "sftp://nas.local/scans".to_string(),
                prefix: String::new(),
                next_number: 0,
                ..SaveSettings::default()
            },
        ];

        for settings in samples {
            let mut store = ConfigStore::in_memory();
            write_save_settings(&mut store, &settings);
            assert_eq!(read_save_settings(&store), settings);
        }
    }

    #[test]
    fn test_save_settings_survive_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanliterc.yaml");
        let settings = SaveSettings {
            prefix: "0042".to_string(),
            format: "tif".to_string(),
            next_number: 12,
            ..SaveSettings::default()
        };

        let mut store = ConfigStore::empty_at(&path);
        write_save_settings(&mut store, &settings);
        store.sync().unwrap();

        let loaded = ConfigStore::open(&path).unwrap();
        assert_eq!(read_save_settings(&loaded), settings);
    }

    #[test]
    fn test_unknown_save_mode_falls_back_to_manual() {
        let mut store = ConfigStore::in_memory();
        store.write_entry(SAVING_GROUP, "SaveMode", 9);
        assert_eq!(read_save_settings(&store).save_mode, SaveMode::Manual);
    }

    #[test]
    fn test_general_settings_roundtrip() {
        let general = GeneralSettings {
            preview_dpi: "75".to_string(),
            set_preview_dpi: true,
        };
        let mut store = ConfigStore::in_memory();
        write_general_settings(&mut store, &general);
        assert_eq!(read_general_settings(&store), general);
    }

    #[test]
    fn test_window_geometry() {
        let mut store = ConfigStore::in_memory();
        write_window_geometry(&mut store, WindowGeometry { width: 1024.4, height: 768.0 });
        assert_eq!(store.entry(WINDOW_GROUP, "Geometry"), Some("1024,768"));
        assert_eq!(
            read_window_geometry(&store),
            WindowGeometry { width: 1024.0, height: 768.0 }
        );

        store.write_entry(WINDOW_GROUP, "Geometry", "wide");
        assert_eq!(read_window_geometry(&store), WindowGeometry::default());
    }

    #[test]
    fn test_device_options_keyed_by_device() {
        let mut store = ConfigStore::in_memory();
        let mut options = DeviceOptionMap::new();
        options.insert("resolution".to_string(), "300".to_string());
        options.insert("mode".to_string(), "Color".to_string());

        write_device_options(&mut store, "Epson:Perfection V39", &options);

        assert_eq!(store.entry_map("Options For Epson:Perfection V39").len(), 2);
        assert_eq!(read_device_options(&store, "Epson:Perfection V39"), options);
        assert!(read_device_options(&store, "Canon:LiDE 220").is_empty());
    }

    #[test]
    fn test_device_options_replace_previous_values() {
        let mut store = ConfigStore::in_memory();
        let mut first = DeviceOptionMap::new();
        first.insert("lamp-off-time".to_string(), "15".to_string());
        write_device_options(&mut store, "test:0", &first);

        let mut second = DeviceOptionMap::new();
        second.insert("resolution".to_string(), "600".to_string());
        write_device_options(&mut store, "test:0", &second);

        assert_eq!(read_device_options(&store, "test:0"), second);
    }
}
