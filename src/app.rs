// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Owns the settings, the config store and the open scanner. Scans run in
//! the background; their results arrive as [`ScanEvent`]s which are polled
//! every frame and handled here: previews go to the canvas, finished scans
//! to the preview dialog or straight to the save workflow.
//!
//! [`ScanEvent`]: crate::device::acquisition::ScanEvent

use crate::config::{self, ConfigStore};
use crate::device::acquisition::{share, Acquisition, ScanEventHandler, SharedSource};
use crate::device::{self, ScanSource};
use crate::models::device::{DeviceInfo, DeviceOptionMap};
use crate::models::scan::ScanResult;
use crate::models::settings::{SettingsContext, WindowGeometry};
use crate::save::{save_scan, SaveOutcome};
use crate::ui::canvas::{self, ScanTexture};
use crate::ui::device_picker::{self, PickerAction};
use crate::ui::options_panel::{OptionsAction, OptionsPanel};
use crate::ui::preview::{PreviewAction, PreviewDialog};
use crate::ui::prompts::{self, NativePrompts};
use crate::ui::save_location::{LocationAction, SaveLocationDialog};
use crate::ui::settings_dialog::{SettingsAction, SettingsDialog};
use crate::ui::toolbar::{self, ToolbarAction};
use crate::ui::about;
use anyhow::{Context, Result};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

pub const APP_NAME: &str = "Scanlite";

pub fn window_title(device: &str) -> String {
    format!("{} - {}", device, APP_NAME)
}

/// A scanner opened at startup or from the picker.
pub struct OpenedDevice {
    pub source: Box<dyn ScanSource>,
    pub title: String,
    /// Device part of the `Options For <device>` config group.
    pub key: String,
}

impl OpenedDevice {
    /// Opened by the name given on the command line.
    fn by_name(source: Box<dyn ScanSource>, name: &str) -> Self {
        Self {
            source,
            title: window_title(name),
            key: name.to_string(),
        }
    }

    /// Opened after being listed by the backend.
    fn selected(source: Box<dyn ScanSource>) -> Self {
        let info = source.info();
        let title = window_title(&info.display_name());
        let key = info.identity();
        Self { source, title, key }
    }
}

/// How the main window starts.
pub enum Launch {
    Device(OpenedDevice),
    /// Several scanners are available; let the user choose.
    Picker(Vec<DeviceInfo>),
}

impl Launch {
    pub fn title(&self) -> String {
        match self {
            Launch::Device(device) => device.title.clone(),
            Launch::Picker(_) => APP_NAME.to_string(),
        }
    }
}

/// What to do once the command line has been looked at.
pub enum Startup {
    Launch(Launch),
    NoDevice,
    Failed(anyhow::Error),
}

/// Decide which scanner to use.
///
/// An explicitly named device is tried first; when it cannot be opened the
/// available devices are listed instead, as if no name had been given.
pub fn resolve_startup(
    explicit: Option<&str>,
    list_devices: impl FnOnce() -> Vec<DeviceInfo>,
    open: impl Fn(&str) -> Result<Box<dyn ScanSource>>,
) -> Startup {
    if let Some(name) = explicit {
        match open(name) {
            Ok(source) => return Startup::Launch(Launch::Device(OpenedDevice::by_name(source, name))),
            Err(e) => log::warn!("Could not open {}: {:#}", name, e),
        }
    }

    let mut devices = list_devices();
    match devices.len() {
        0 => Startup::NoDevice,
        1 => match open_selected(&devices.remove(0), open) {
            Ok(device) => Startup::Launch(Launch::Device(device)),
            Err(e) => Startup::Failed(e),
        },
        _ => Startup::Launch(Launch::Picker(devices)),
    }
}

pub fn open_selected(device: &DeviceInfo, open: impl Fn(&str) -> Result<Box<dyn ScanSource>>) -> Result<OpenedDevice> {
    let source = open(&device.name).with_context(|| format!("Opening the selected scanner failed ({})", device.display_name()))?;
    Ok(OpenedDevice::selected(source))
}

/// An open scanner and its option state.
struct Session {
    source: SharedSource,
    info: DeviceInfo,
    key: String,
    /// Values the device came up with, for "revert scanner options".
    default_options: DeviceOptionMap,
    options: OptionsPanel,
}

impl Session {
    fn start(device: OpenedDevice, store: &ConfigStore) -> Self {
        let OpenedDevice { mut source, key, .. } = device;

        let default_options = source.option_values().unwrap_or_else(|e| {
            log::warn!("Could not read scanner options: {:#}", e);
            DeviceOptionMap::new()
        });

        let saved = config::read_device_options(store, &key);
        if !saved.is_empty() {
            match source.set_option_values(&saved) {
                Ok(()) => log::info!("Restored {} saved options for {}", saved.len(), key),
                Err(e) => log::warn!("Could not restore options for {}: {:#}", key, e),
            }
        }

        let current = source.option_values().unwrap_or_else(|_| default_options.clone());
        let info = source.info().clone();
        Self {
            source: share(source),
            info,
            key,
            default_options,
            options: OptionsPanel::new(current),
        }
    }

    /// Run `f` on the scanner unless a scan is holding it.
    fn with_source<T>(&self, f: impl FnOnce(&mut dyn ScanSource) -> T) -> Option<T> {
        match self.source.try_lock() {
            Ok(mut source) => Some(f(&mut **source)),
            Err(_) => {
                log::warn!("The scanner is busy");
                None
            }
        }
    }

    /// Current option values, falling back to the last ones shown.
    fn current_options(&self) -> DeviceOptionMap {
        match self.with_source(|source| source.option_values()) {
            Some(Ok(values)) => values,
            Some(Err(e)) => {
                log::warn!("Could not read scanner options: {:#}", e);
                self.options.values().clone()
            }
            None => self.options.values().clone(),
        }
    }

    fn apply_options(&mut self, values: &DeviceOptionMap) {
        let result = self.with_source(|source| {
            source.set_option_values(values)?;
            source.option_values()
        });
        match result {
            Some(Ok(current)) => self.options.set_values(current),
            Some(Err(e)) => prompts::alert(APP_NAME, &format!("Could not set scanner options: {:#}", e)),
            None => {}
        }
    }

    fn reload_options(&mut self) {
        let current = self.current_options();
        self.options.set_values(current);
    }
}

/// Write everything that outlives the session into `store`.
fn persist_state(store: &mut ConfigStore, settings: &SettingsContext, geometry: WindowGeometry, device: Option<(&str, &DeviceOptionMap)>) {
    config::write_window_geometry(store, geometry);
    config::write_save_settings(store, &settings.save);
    config::write_general_settings(store, &settings.general);
    if let Some((key, options)) = device {
        config::write_device_options(store, key, options);
    }
}

/// Hand back a pending item unless `outcome` says it reached disk.
fn keep_unless_saved<T>(pending: T, outcome: &SaveOutcome) -> Option<T> {
    match outcome {
        SaveOutcome::Saved(_) => None,
        SaveOutcome::Cancelled | SaveOutcome::Failed => Some(pending),
    }
}

enum Stage {
    PickDevice { devices: Vec<DeviceInfo>, selected: usize },
    Ready(Session),
}

/// Main application state.
pub struct ScanliteApp {
    egui_ctx: egui::Context,
    store: ConfigStore,
    settings: SettingsContext,
    geometry: WindowGeometry,
    stage: Stage,
    acquisition: Acquisition,

    /// Latest preview scan shown in the canvas
    preview: Option<ScanTexture>,
    /// Finished scan waiting for Save or Discard
    pending_save: Option<PreviewDialog>,
    /// Asked before the first automatic save
    location_dialog: Option<SaveLocationDialog>,
    /// Unpreviewed scan waiting for the location dialog
    awaiting_location: Option<ScanResult>,
    settings_dialog: Option<SettingsDialog>,
    show_about: bool,

    exit_code: Rc<Cell<u8>>,
    /// State has been persisted (or deliberately skipped) for this run.
    finished: bool,
}

impl ScanliteApp {
    /// `exit_code` receives the process exit status when the app quits early.
    pub fn new(cc: &eframe::CreationContext<'_>, store: ConfigStore, launch: Launch, exit_code: Rc<Cell<u8>>) -> Self {
        let stage = match launch {
            Launch::Device(device) => Stage::Ready(Session::start(device, &store)),
            Launch::Picker(devices) => Stage::PickDevice { devices, selected: 0 },
        };
        let settings = SettingsContext::new(config::read_save_settings(&store), config::read_general_settings(&store));
        let geometry = config::read_window_geometry(&store);
        Self {
            egui_ctx: cc.egui_ctx.clone(),
            store,
            settings,
            geometry,
            stage,
            acquisition: Acquisition::new(),
            preview: None,
            pending_save: None,
            location_dialog: None,
            awaiting_location: None,
            settings_dialog: None,
            show_about: false,
            exit_code,
            finished: false,
        }
    }

    fn session(&self) -> Option<&Session> {
        match &self.stage {
            Stage::Ready(session) => Some(session),
            Stage::PickDevice { .. } => None,
        }
    }

    fn sync_store(&self) {
        if let Err(e) = self.store.sync() {
            log::error!("Failed to write settings: {:#}", e);
        }
    }

    /// Leave without persisting anything.
    fn quit(&mut self, ctx: &egui::Context, code: u8) {
        self.exit_code.set(code);
        self.finished = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Persist window, settings and device options.
    fn shutdown(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        let device = self.session().map(|s| (s.key.clone(), s.current_options()));
        persist_state(
            &mut self.store,
            &self.settings,
            self.geometry,
            device.as_ref().map(|(key, options)| (key.as_str(), options)),
        );
        self.sync_store();
        log::info!("Settings saved");
    }

    fn start_scan(&mut self, preview: bool) {
        let Some(session) = self.session() else {
            return;
        };
        if preview {
            let dpi = self.settings.general.preview_resolution();
            session.with_source(|source| source.set_preview_resolution(dpi));
        }
        log::info!("Starting {} scan on {}", if preview { "preview" } else { "full" }, session.info.name);
        let source = session.source.clone();
        self.acquisition.start(source, preview);
    }

    /// Run the save workflow. `location` answers the first-image question
    /// in ask-first mode.
    fn save(&mut self, scan: &ScanResult, location: Option<SaveLocationDialog>) -> SaveOutcome {
        let outcome = save_scan(&mut self.settings, scan, &mut NativePrompts { location });
        if let SaveOutcome::Saved(_) = outcome {
            config::write_save_settings(&mut self.store, &self.settings.save);
            self.sync_store();
        }
        outcome
    }

    /// Save the scan shown in the preview dialog, keeping the dialog open
    /// unless the file was written.
    fn save_previewed(&mut self, location: Option<SaveLocationDialog>) {
        if let Some(dialog) = self.pending_save.take() {
            let outcome = self.save(&dialog.scan, location);
            self.pending_save = keep_unless_saved(dialog, &outcome);
        }
    }

    /// Finish the location dialog and save whatever was waiting for it.
    fn finish_location(&mut self, dialog: SaveLocationDialog) {
        match self.awaiting_location.take() {
            Some(scan) => {
                self.save(&scan, Some(dialog));
            }
            None => self.save_previewed(Some(dialog)),
        }
    }

    fn apply_settings(&mut self, dialog: SettingsDialog) {
        let (save, general) = dialog.merge_into(&self.settings);
        self.settings.apply(save, general);
        config::write_save_settings(&mut self.store, &self.settings.save);
        config::write_general_settings(&mut self.store, &self.settings.general);
        self.sync_store();

        let dpi = self.settings.general.preview_resolution();
        if let Some(session) = self.session() {
            session.with_source(|source| source.set_preview_resolution(dpi));
        }
        log::info!("Settings applied");
    }

    fn update_picker(&mut self, ctx: &egui::Context) {
        let Stage::PickDevice { devices, selected } = &mut self.stage else {
            return;
        };
        let choice = match device_picker::show(ctx, devices, selected) {
            PickerAction::None => return,
            PickerAction::Cancel => None,
            PickerAction::Open(index) => devices.get(index).cloned(),
        };
        let Some(picked) = choice else {
            log::info!("No scanner selected");
            self.quit(ctx, 0);
            return;
        };

        match open_selected(&picked, device::open_device) {
            Ok(opened) => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(opened.title.clone()));
                self.stage = Stage::Ready(Session::start(opened, &self.store));
            }
            Err(e) => {
                log::error!("{:#}", e);
                prompts::alert(APP_NAME, &format!("{:#}", e));
                self.quit(ctx, 1);
            }
        }
    }

    fn update_main(&mut self, ctx: &egui::Context) {
        if let Some(event) = self.acquisition.poll() {
            event.dispatch(self);
        }
        let scanning = self.acquisition.is_running();
        if scanning {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
        let dialog_open = self.pending_save.is_some() || self.settings_dialog.is_some() || self.location_dialog.is_some();

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| ui.add_enabled_ui(!dialog_open, |ui| toolbar::show(ui, scanning)).inner)
            .inner;
        match toolbar_action {
            ToolbarAction::Preview => self.start_scan(true),
            ToolbarAction::Scan => self.start_scan(false),
            ToolbarAction::Settings => self.settings_dialog = Some(SettingsDialog::new(&self.settings)),
            ToolbarAction::About => self.show_about = true,
            ToolbarAction::Close => {
                self.shutdown();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            ToolbarAction::None => {}
        }

        if let Stage::Ready(session) = &mut self.stage {
            let options_action = egui::SidePanel::right("options")
                .default_width(260.0)
                .show(ctx, |ui| session.options.show(ui, !scanning && !dialog_open))
                .inner;
            match options_action {
                OptionsAction::Apply => {
                    let values = session.options.values().clone();
                    session.apply_options(&values);
                }
                OptionsAction::Reload => session.reload_options(),
                OptionsAction::None => {}
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            canvas::show(ui, self.preview.as_ref(), scanning.then_some("Scanning..."));
        });

        let preview_action = match &self.pending_save {
            Some(dialog) if self.location_dialog.is_none() => Some(dialog.show(ctx)),
            _ => None,
        };
        match preview_action {
            Some(PreviewAction::Save) if self.settings.needs_location() => {
                self.location_dialog = Some(SaveLocationDialog::new(&self.settings.save));
            }
            Some(PreviewAction::Save) => self.save_previewed(None),
            Some(PreviewAction::Discard) => {
                log::info!("Scanned image discarded");
                self.pending_save = None;
            }
            Some(PreviewAction::None) | None => {}
        }

        let location_action = self.location_dialog.as_mut().map(|dialog| dialog.show(ctx));
        match location_action {
            Some(LocationAction::Accept) => {
                if let Some(dialog) = self.location_dialog.take() {
                    self.finish_location(dialog);
                }
            }
            Some(LocationAction::Cancel) => {
                self.location_dialog = None;
                if self.awaiting_location.take().is_some() {
                    log::info!("Save cancelled; scanned image discarded");
                }
            }
            Some(LocationAction::None) | None => {}
        }

        let settings_action = self.settings_dialog.as_mut().map(|dialog| dialog.show(ctx));
        match settings_action {
            Some(SettingsAction::Accept) => {
                if let Some(dialog) = self.settings_dialog.take() {
                    self.apply_settings(dialog);
                }
            }
            Some(SettingsAction::Close) => self.settings_dialog = None,
            Some(SettingsAction::RevertOptions) => {
                if let Stage::Ready(session) = &mut self.stage {
                    let defaults = session.default_options.clone();
                    session.apply_options(&defaults);
                    log::info!("Scanner options reverted to defaults");
                }
            }
            Some(SettingsAction::None) | None => {}
        }

        let info = match &self.stage {
            Stage::Ready(session) => Some(&session.info),
            Stage::PickDevice { .. } => None,
        };
        about::show(ctx, &mut self.show_about, info);
    }
}

impl ScanEventHandler for ScanliteApp {
    fn image_ready(&mut self, scan: ScanResult) {
        log::info!("Scan finished: {}x{} {:?}", scan.width, scan.height, scan.format);
        if self.settings.save.show_before_save {
            match PreviewDialog::new(&self.egui_ctx, scan) {
                Ok(dialog) => self.pending_save = Some(dialog),
                Err(e) => prompts::alert(APP_NAME, &format!("Cannot show the scanned image: {:#}", e)),
            }
        } else if self.settings.needs_location() {
            self.location_dialog = Some(SaveLocationDialog::new(&self.settings.save));
            self.awaiting_location = Some(scan);
        } else {
            self.save(&scan, None);
        }
    }

    fn preview_ready(&mut self, scan: ScanResult) {
        match ScanTexture::load(&self.egui_ctx, "preview", &scan) {
            Ok(texture) => self.preview = Some(texture),
            Err(e) => prompts::alert(APP_NAME, &format!("Cannot show the preview: {:#}", e)),
        }
    }

    fn scan_failed(&mut self, message: String) {
        prompts::alert(APP_NAME, &format!("The scan failed: {}", message));
    }
}

impl eframe::App for ScanliteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.geometry = WindowGeometry {
                width: rect.width(),
                height: rect.height(),
            };
        }
        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
        }

        match self.stage {
            Stage::PickDevice { .. } => self.update_picker(ctx),
            Stage::Ready(_) => self.update_main(ctx),
        }
    }
}
