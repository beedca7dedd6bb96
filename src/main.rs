// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scanlite - a lightweight scanning application
//!
//! Opens a scanner, shows preview scans and saves full scans as image
//! files with automatic numbering.

mod app;
mod config;
mod device;
mod io;
mod models;
mod save;
mod ui;
mod util;

use anyhow::Result;
use app::{resolve_startup, ScanliteApp, Startup, APP_NAME};
use clap::Parser;
use config::ConfigStore;
use std::cell::Cell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

/// Scan images with a SANE scanner.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Device to open, e.g. `epson2:libusb:001:004` or `file:page.png`
    #[arg(short, long)]
    device: Option<String>,

    /// Settings file (default: scanlite/scanliterc.yaml in the config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Load settings, falling back to defaults when the file is unreadable.
fn load_store(path: Option<PathBuf>) -> ConfigStore {
    let path = path.unwrap_or_else(ConfigStore::default_path);
    match ConfigStore::open(path.clone()) {
        Ok(store) => {
            log::info!("Loaded settings from {}", path.display());
            store
        }
        Err(e) => {
            log::warn!("Failed to load settings from {}: {:#}; using defaults", path.display(), e);
            ConfigStore::empty_at(path)
        }
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let store = load_store(cli.config);

    let launch = match resolve_startup(cli.device.as_deref(), device::available_devices, device::open_device) {
        Startup::Launch(launch) => launch,
        Startup::NoDevice => {
            log::info!("No scanner found");
            return Ok(ExitCode::SUCCESS);
        }
        Startup::Failed(e) => {
            log::error!("{:#}", e);
            ui::prompts::alert(APP_NAME, &format!("{:#}", e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let geometry = config::read_window_geometry(&store);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([geometry.width, geometry.height])
            .with_min_inner_size([480.0, 320.0])
            .with_title(launch.title()),
        ..Default::default()
    };

    let exit_code = Rc::new(Cell::new(0u8));
    let app_exit_code = Rc::clone(&exit_code);

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(ScanliteApp::new(cc, store, launch, app_exit_code)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(ExitCode::from(exit_code.get()))
}
