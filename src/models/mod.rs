// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for scans, devices and preferences.

pub mod device;
pub mod scan;
pub mod settings;
