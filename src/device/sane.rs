// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! SANE backend.
//!
//! Options travel as strings so they can be persisted; they are converted
//! to and from the option's SANE value type at this boundary.

use super::ScanSource;
use crate::models::device::{DeviceInfo, DeviceOptionMap};
use crate::models::scan::{PixelFormat, ScanResult};
use anyhow::{anyhow, bail, Result};
use sane_scan::{Device, DeviceHandle, DeviceOption, DeviceOptionValue, Frame, Sane, ValueType};
use std::ffi::{CStr, CString};

const PREVIEW_OPTION: &str = "preview";
const RESOLUTION_OPTION: &str = "resolution";

fn text(value: &CStr) -> String {
    value.to_string_lossy().into_owned()
}

fn device_info(device: &Device) -> DeviceInfo {
    DeviceInfo {
        name: text(&device.name),
        vendor: text(&device.vendor),
        model: text(&device.model),
        kind: text(&device.type_),
    }
}

fn init() -> Result<Sane> {
    Sane::init(0).map_err(|e| anyhow!("Failed to initialise SANE: {}", e))
}

/// Scanners visible to SANE, network ones included.
pub fn list_devices() -> Result<Vec<DeviceInfo>> {
    let sane = init()?;
    let devices = sane
        .get_devices(false)
        .map_err(|e| anyhow!("Failed to list SANE devices: {}", e))?;
    Ok(devices.iter().map(device_info).collect())
}

/// SANE fixed point (16.16) to float.
fn fixed_to_float(value: i32) -> f64 {
    value as f64 / 65536.0
}

fn float_to_fixed(value: f64) -> i32 {
    (value * 65536.0).round() as i32
}

fn value_to_string(value: &DeviceOptionValue) -> Option<String> {
    match value {
        DeviceOptionValue::Bool(v) => Some(v.to_string()),
        DeviceOptionValue::Int(v) => Some(v.to_string()),
        DeviceOptionValue::Fixed(v) => Some(fixed_to_float(*v).to_string()),
        DeviceOptionValue::String(v) => Some(text(v)),
        DeviceOptionValue::Button | DeviceOptionValue::Group => None,
    }
}

fn value_from_string(kind: &ValueType, raw: &str) -> Result<DeviceOptionValue> {
    let raw = raw.trim();
    let value = match kind {
        ValueType::Bool => DeviceOptionValue::Bool(match raw {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => bail!("{:?} is not a boolean", raw),
        }),
        ValueType::Int => DeviceOptionValue::Int(raw.parse::<f64>()?.round() as i32),
        ValueType::Fixed => DeviceOptionValue::Fixed(float_to_fixed(raw.parse()?)),
        ValueType::String => DeviceOptionValue::String(CString::new(raw)?),
        ValueType::Button | ValueType::Group => bail!("option has no value"),
    };
    Ok(value)
}

/// An open SANE device.
pub struct SaneSource {
    // Declared before `_sane` so the handle is closed before SANE exits.
    handle: DeviceHandle,
    _sane: Sane,
    info: DeviceInfo,
    preview_dpi: Option<f32>,
}

// SAFETY: the handle is only used from one thread at a time; the
// application keeps the source behind a mutex.
unsafe impl Send for SaneSource {}

impl SaneSource {
    pub fn open(name: &str) -> Result<Self> {
        let sane = init()?;
        let devices = sane
            .get_devices(false)
            .map_err(|e| anyhow!("Failed to list SANE devices: {}", e))?;
        let device = devices
            .iter()
            .find(|d| d.name.as_bytes() == name.as_bytes())
            .ok_or_else(|| anyhow!("Scanner {:?} was not found", name))?;

        let handle = device
            .open()
            .map_err(|e| anyhow!("Failed to open {}: {}", name, e))?;
        let info = device_info(device);
        log::info!("Opened SANE device {} ({})", info.name, info.display_name());

        Ok(Self {
            handle,
            _sane: sane,
            info,
            preview_dpi: None,
        })
    }

    fn options(&mut self) -> Result<Vec<DeviceOption>> {
        self.handle
            .get_options()
            .map_err(|e| anyhow!("Failed to read scanner options: {}", e))
    }

    /// Set one option from its string form.
    fn set_named(&mut self, options: &[DeviceOption], name: &str, raw: &str) -> Result<()> {
        let option = options
            .iter()
            .find(|o| o.name.as_bytes() == name.as_bytes())
            .ok_or_else(|| anyhow!("unknown option"))?;
        let value = value_from_string(&option.type_, raw)?;
        self.handle
            .set_option(option, value)
            .map_err(|e| anyhow!("{}", e))?;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<ScanResult> {
        self.handle
            .start_scan()
            .map_err(|e| anyhow!("Failed to start the scan: {}", e))?;
        let data = self
            .handle
            .read_to_vec()
            .map_err(|e| anyhow!("Failed to read image data: {}", e))?;
        let params = self
            .handle
            .get_parameters()
            .map_err(|e| anyhow!("Failed to read scan parameters: {}", e))?;

        let format = match (params.format, params.depth) {
            (Frame::Gray, 1) => PixelFormat::BlackWhite,
            (Frame::Gray, 8) => PixelFormat::Gray8,
            (Frame::Gray, 16) => PixelFormat::Gray16,
            (Frame::Rgb, 8) => PixelFormat::Rgb8,
            (Frame::Rgb, 16) => PixelFormat::Rgb16,
            (_, depth) => bail!("Unsupported frame layout (depth {})", depth),
        };

        let bytes_per_line = usize::try_from(params.bytes_per_line)
            .ok()
            .filter(|bpl| *bpl > 0)
            .ok_or_else(|| anyhow!("Invalid line length {}", params.bytes_per_line))?;
        let width = u32::try_from(params.pixels_per_line)?;
        // Hand-held and sheet-fed devices may not know the line count up front.
        let height = u32::try_from(data.len() / bytes_per_line)?;

        Ok(ScanResult {
            data,
            width,
            height,
            bytes_per_line,
            format,
        })
    }
}

impl ScanSource for SaneSource {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn option_values(&mut self) -> Result<DeviceOptionMap> {
        let mut values = DeviceOptionMap::new();
        for option in self.options()? {
            if matches!(option.type_, ValueType::Button | ValueType::Group) {
                continue;
            }
            let name = text(&option.name);
            if name.is_empty() {
                continue;
            }
            match self.handle.get_option(&option) {
                Ok(value) => {
                    if let Some(value) = value_to_string(&value) {
                        values.insert(name, value);
                    }
                }
                Err(e) => log::debug!("Skipping unreadable option {}: {}", name, e),
            }
        }
        Ok(values)
    }

    fn set_option_values(&mut self, values: &DeviceOptionMap) -> Result<()> {
        let options = self.options()?;
        for (name, raw) in values {
            if let Err(e) = self.set_named(&options, name, raw) {
                log::warn!("Could not set option {}={:?}: {:#}", name, raw, e);
            }
        }
        Ok(())
    }

    fn set_preview_resolution(&mut self, dpi: Option<f32>) {
        self.preview_dpi = dpi;
    }

    fn acquire(&mut self, preview: bool) -> Result<ScanResult> {
        if !preview {
            return self.read_frame();
        }

        let saved = self.option_values()?;
        let options = self.options()?;
        if let Err(e) = self.set_named(&options, PREVIEW_OPTION, "true") {
            log::debug!("Device has no preview mode: {:#}", e);
        }
        if let Some(dpi) = self.preview_dpi {
            if let Err(e) = self.set_named(&options, RESOLUTION_OPTION, &dpi.to_string()) {
                log::warn!("Could not set preview resolution {}: {:#}", dpi, e);
            }
        }

        let result = self.read_frame();

        let restore: DeviceOptionMap = saved
            .into_iter()
            .filter(|(name, _)| name == PREVIEW_OPTION || name == RESOLUTION_OPTION)
            .collect();
        self.set_option_values(&restore)?;
        result
    }
}
