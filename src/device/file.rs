// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file backend.
//!
//! Treats an image file on disk as the glass of a scanner: every scan
//! decodes the file again and packs it in the configured mode and depth.
//! Useful without scanner hardware and for exercising the save path.

use super::ScanSource;
use crate::models::device::{DeviceInfo, DeviceOptionMap};
use crate::models::scan::{PixelFormat, ScanResult};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Longest edge of a preview scan, in pixels.
const PREVIEW_EDGE: u32 = 800;

const MODE_OPTION: &str = "mode";
const DEPTH_OPTION: &str = "depth";

/// Colour mode, named like the SANE `mode` option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    Color,
    Gray,
    Lineart,
}

impl ScanMode {
    fn name(self) -> &'static str {
        match self {
            ScanMode::Color => "Color",
            ScanMode::Gray => "Gray",
            ScanMode::Lineart => "Lineart",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "Color" => Some(ScanMode::Color),
            "Gray" => Some(ScanMode::Gray),
            "Lineart" => Some(ScanMode::Lineart),
            _ => None,
        }
    }
}

/// Scanner backed by a single image file.
pub struct ImageFileSource {
    path: PathBuf,
    info: DeviceInfo,
    mode: ScanMode,
    depth: u8,
}

impl ImageFileSource {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            bail!("Image file {} does not exist", path.display());
        }

        let model = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let info = DeviceInfo {
            name: format!("{}{}", super::FILE_DEVICE_PREFIX, path.display()),
            vendor: "Image file".to_string(),
            model,
            kind: "virtual device".to_string(),
        };

        log::info!("Opened image file device {}", path.display());
        Ok(Self {
            path,
            info,
            mode: ScanMode::Color,
            depth: 8,
        })
    }

    fn pixel_format(&self) -> PixelFormat {
        match (self.mode, self.depth) {
            (ScanMode::Lineart, _) => PixelFormat::BlackWhite,
            (ScanMode::Gray, 16) => PixelFormat::Gray16,
            (ScanMode::Gray, _) => PixelFormat::Gray8,
            (ScanMode::Color, 16) => PixelFormat::Rgb16,
            (ScanMode::Color, _) => PixelFormat::Rgb8,
        }
    }
}

impl ScanSource for ImageFileSource {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn option_values(&mut self) -> Result<DeviceOptionMap> {
        let mut options = DeviceOptionMap::new();
        options.insert(MODE_OPTION.to_string(), self.mode.name().to_string());
        options.insert(DEPTH_OPTION.to_string(), self.depth.to_string());
        Ok(options)
    }

    fn set_option_values(&mut self, options: &DeviceOptionMap) -> Result<()> {
        for (name, value) in options {
            match name.as_str() {
                MODE_OPTION => match ScanMode::parse(value) {
                    Some(mode) => self.mode = mode,
                    None => log::warn!("Unsupported scan mode {:?}", value),
                },
                DEPTH_OPTION => match value.trim().parse::<u8>() {
                    Ok(depth @ (8 | 16)) => self.depth = depth,
                    _ => log::warn!("Unsupported bit depth {:?}", value),
                },
                other => log::warn!("Unknown option {:?} for {}", other, self.info.name),
            }
        }
        Ok(())
    }

    fn set_preview_resolution(&mut self, dpi: Option<f32>) {
        log::debug!("Preview resolution {:?} has no effect on image files", dpi);
    }

    fn acquire(&mut self, preview: bool) -> Result<ScanResult> {
        let mut image = image::open(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if preview {
            image = image.thumbnail(PREVIEW_EDGE, PREVIEW_EDGE);
        }

        let scan = ScanResult::from_image(&image, self.pixel_format());
        log::info!(
            "Scanned {} ({}x{}, {:?})",
            self.path.display(),
            scan.width,
            scan.height,
            scan.format
        );
        Ok(scan)
    }
}
