// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scanner access.
//!
//! Talking to hardware is the backend's job. This module defines the
//! [`ScanSource`] seam the rest of the application works against, and picks
//! a backend from a device name:
//!
//! - `file:<path>` replays an image file as if it had been scanned;
//! - anything else is a SANE device name (requires the `sane` feature).

pub mod acquisition;
pub mod file;
#[cfg(feature = "sane")]
pub mod sane;

use crate::models::device::{DeviceInfo, DeviceOptionMap};
use crate::models::scan::ScanResult;
use anyhow::Result;

/// Device name prefix selecting the image-file backend.
pub const FILE_DEVICE_PREFIX: &str = "file:";

/// An opened scanner.
pub trait ScanSource: Send {
    fn info(&self) -> &DeviceInfo;

    /// Current values of all readable options.
    fn option_values(&mut self) -> Result<DeviceOptionMap>;

    /// Apply option values. Unknown or rejected options are skipped.
    fn set_option_values(&mut self, options: &DeviceOptionMap) -> Result<()>;

    /// Resolution for preview scans; `None` leaves it to the device.
    fn set_preview_resolution(&mut self, dpi: Option<f32>);

    /// Run one scan and return the raster.
    fn acquire(&mut self, preview: bool) -> Result<ScanResult>;
}

/// Scanners the backend can see.
#[cfg(feature = "sane")]
pub fn available_devices() -> Vec<DeviceInfo> {
    match sane::list_devices() {
        Ok(devices) => devices,
        Err(e) => {
            log::error!("Failed to list scanners: {:#}", e);
            Vec::new()
        }
    }
}

/// Scanners the backend can see.
#[cfg(not(feature = "sane"))]
pub fn available_devices() -> Vec<DeviceInfo> {
    log::info!("Built without SANE support; only {}<path> devices are available", FILE_DEVICE_PREFIX);
    Vec::new()
}

/// Open a device by name.
pub fn open_device(name: &str) -> Result<Box<dyn ScanSource>> {
    match name.strip_prefix(FILE_DEVICE_PREFIX) {
        Some(path) => Ok(Box::new(file::ImageFileSource::open(path)?)),
        None => open_sane_device(name),
    }
}

#[cfg(feature = "sane")]
fn open_sane_device(name: &str) -> Result<Box<dyn ScanSource>> {
    Ok(Box::new(sane::SaneSource::open(name)?))
}

#[cfg(not(feature = "sane"))]
fn open_sane_device(name: &str) -> Result<Box<dyn ScanSource>> {
    anyhow::bail!("Cannot open {:?}: this build has no SANE support", name)
}
