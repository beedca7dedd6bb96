// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Placement of a scanned image inside the space a panel or dialog offers.

/// Largest size with the image's aspect ratio that fits in `available`.
///
/// Images are never enlarged beyond their own size when `allow_upscale` is
/// false. Degenerate sizes yield `(0.0, 0.0)`.
pub fn fit_within(image: (u32, u32), available: (f32, f32), allow_upscale: bool) -> (f32, f32) {
    let (img_width, img_height) = (image.0 as f32, image.1 as f32);
    let (avail_width, avail_height) = available;
    if img_width <= 0.0 || img_height <= 0.0 || avail_width <= 0.0 || avail_height <= 0.0 {
        return (0.0, 0.0);
    }

    let mut scale = (avail_width / img_width).min(avail_height / img_height);
    if !allow_upscale {
        scale = scale.min(1.0);
    }
    (img_width * scale, img_height * scale)
}

/// Offset that centres `content` inside `available`.
pub fn centered_offset(content: (f32, f32), available: (f32, f32)) -> (f32, f32) {
    (
        ((available.0 - content.0) / 2.0).max(0.0),
        ((available.1 - content.1) / 2.0).max(0.0),
    )
}
