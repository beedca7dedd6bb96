// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scanner device descriptions.

use std::collections::BTreeMap;

/// Option name to string-encoded value, as persisted per device.
pub type DeviceOptionMap = BTreeMap<String, String>;

/// A scanner as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Backend device name, e.g. `epson2:libusb:001:004`.
    pub name: String,
    pub vendor: String,
    pub model: String,
    /// Device class, e.g. `flatbed scanner`.
    pub kind: String,
}

impl DeviceInfo {
    /// `vendor:model`, used to key option groups for picked devices.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.vendor, self.model)
    }

    /// Human readable `vendor model`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.vendor, self.model)
    }
}
