// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image display area.
//!
//! Shows the latest preview scan scaled to fit the panel, or a hint when
//! nothing has been scanned yet.

use crate::models::scan::ScanResult;
use crate::util::geometry::{centered_offset, fit_within};
use anyhow::Result;
use image::DynamicImage;

/// A scan uploaded to the GPU for display.
pub struct ScanTexture {
    pub texture: egui::TextureHandle,
    pub size: (u32, u32),
}

impl ScanTexture {
    /// Upload `scan`, shrunk to what the renderer accepts. The scan itself is
    /// left untouched for saving.
    pub fn load(ctx: &egui::Context, name: &str, scan: &ScanResult) -> Result<Self> {
        let max_side = ctx.input(|i| i.max_texture_side);
        let max_side = u32::try_from(max_side).unwrap_or(u32::MAX);
        let rgba = fit_texture(scan.to_image()?, max_side).to_rgba8();
        let size = (rgba.width(), rgba.height());
        let color_image = egui::ColorImage::from_rgba_unmultiplied([size.0 as usize, size.1 as usize], rgba.as_raw());
        let texture = ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR);
        Ok(Self { texture, size })
    }
}

/// Downscale `image` so neither side exceeds `max_side`, keeping its aspect.
fn fit_texture(image: DynamicImage, max_side: u32) -> DynamicImage {
    if image.width() <= max_side && image.height() <= max_side {
        image
    } else {
        image.thumbnail(max_side, max_side)
    }
}

/// Paint `image` scaled to fit and centred in the remaining space.
pub fn paint_fitted(ui: &mut egui::Ui, image: &ScanTexture, allow_upscale: bool) {
    let available = ui.available_size();
    let (width, height) = fit_within(image.size, (available.x, available.y), allow_upscale);
    let (x_offset, y_offset) = centered_offset((width, height), (available.x, available.y));

    let (area, _) = ui.allocate_exact_size(available, egui::Sense::hover());
    let image_rect = egui::Rect::from_min_size(area.min + egui::vec2(x_offset, y_offset), egui::vec2(width, height));

    ui.painter().image(
        image.texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

/// Display the main canvas area.
pub fn show(ui: &mut egui::Ui, preview: Option<&ScanTexture>, busy: Option<&str>) {
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);
    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        if let Some(message) = busy {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.spinner();
                    ui.add_space(10.0);
                    ui.label(egui::RichText::new(message).size(16.0).color(egui::Color32::from_gray(200)));
                });
            });
        } else if let Some(image) = preview {
            paint_fitted(ui, image, true);
        } else {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(egui::RichText::new("Scanlite").size(32.0).color(egui::Color32::from_gray(200)));
                    ui.add_space(20.0);
                    ui.label(
                        egui::RichText::new("Place a document on the scanner and press Preview or Scan")
                            .color(egui::Color32::from_gray(180)),
                    );
                });
            });
        }
    });
}
