// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the Scanlite application.

pub mod about;
pub mod canvas;
pub mod device_picker;
pub mod options_panel;
pub mod preview;
pub mod prompts;
pub mod save_location;
pub mod settings_dialog;
pub mod toolbar;
