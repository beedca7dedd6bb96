// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Output formats offered to the user.

use image::ImageFormat;

/// The only format written with 16-bit samples.
pub const SIXTEEN_BIT_FORMAT: &str = "png";

/// Formats listed first, in this order.
const PREFERRED: [&str; 3] = ["png", "jpeg", "tif"];

/// Encoders that cannot take a page-sized image.
const UNSUITABLE: [ImageFormat; 1] = [ImageFormat::Ico];

/// Extensions of every format the encoders can write, preferred ones first.
pub fn writable_formats() -> Vec<String> {
    let mut formats: Vec<String> = PREFERRED
        .iter()
        .filter(|ext| format_for_extension(ext).is_some())
        .map(|ext| ext.to_string())
        .collect();

    for format in ImageFormat::all().filter(|f| f.writing_enabled() && !UNSUITABLE.contains(f)) {
        if PREFERRED.iter().any(|ext| ImageFormat::from_extension(ext) == Some(format)) {
            continue;
        }
        if let Some(ext) = format.extensions_str().first() {
            formats.push(ext.to_string());
        }
    }

    formats
}

/// Formats to list in a chooser, keeping `current` even when no encoder
/// knows it.
pub fn offered_formats(current: &str) -> Vec<String> {
    let mut formats = writable_formats();
    if !formats.iter().any(|f| f == current) {
        formats.push(current.to_string());
    }
    formats
}

/// Formats usable for a scan of the given depth.
pub fn formats_for_depth(is_16bit: bool) -> Vec<String> {
    if is_16bit {
        vec![SIXTEEN_BIT_FORMAT.to_string()]
    } else {
        writable_formats()
    }
}

/// Encoder for an extension, if one is available for writing.
pub fn format_for_extension(extension: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(extension).filter(|f| f.writing_enabled())
}
