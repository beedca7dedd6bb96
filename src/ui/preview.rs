// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! "Show before save" dialog for a finished scan.

use super::canvas::{paint_fitted, ScanTexture};
use crate::models::scan::ScanResult;
use anyhow::Result;

/// Result of preview dialog interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAction {
    None,
    Save,
    Discard,
}

/// A scan waiting for the user to save or discard it.
pub struct PreviewDialog {
    pub scan: ScanResult,
    image: ScanTexture,
}

impl PreviewDialog {
    pub fn new(ctx: &egui::Context, scan: ScanResult) -> Result<Self> {
        let image = ScanTexture::load(ctx, "scanned_image", &scan)?;
        Ok(Self { scan, image })
    }

    pub fn show(&self, ctx: &egui::Context) -> PreviewAction {
        let mut action = PreviewAction::None;
        let screen = ctx.screen_rect();

        egui::Window::new("Scanned image")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "{} x {} pixels, {:?}",
                    self.scan.width, self.scan.height, self.scan.format
                ));
                ui.separator();

                let area = egui::vec2(screen.width() * 0.7, screen.height() * 0.7);
                ui.allocate_ui(area, |ui| {
                    ui.set_min_size(area);
                    paint_fitted(ui, &self.image, false);
                });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("💾 Save").clicked() {
                        action = PreviewAction::Save;
                    }
                    if ui.button("Discard").clicked() {
                        action = PreviewAction::Discard;
                    }
                });
            });

        action
    }
}
