// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file output.
//!
//! Encoding is left to the `image` crate; this module picks the encoder,
//! converts the pixels to a layout it accepts and applies the quality
//! setting.

use super::formats::format_for_extension;
use anyhow::{anyhow, Context, Result};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// AVIF encoder speed, 1 (slowest) to 10.
const AVIF_SPEED: u8 = 8;

/// Convert `image` to a color type the encoder for `format` can write.
fn encodable(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::Pnm | ImageFormat::Bmp | ImageFormat::Tga | ImageFormat::WebP => {
            Cow::Borrowed(image)
        }
        ImageFormat::Farbfeld => Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16())),
        ImageFormat::OpenExr | ImageFormat::Hdr => Cow::Owned(DynamicImage::ImageRgb32F(image.to_rgb32f())),
        _ => match image {
            DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
            _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        },
    }
}

/// Write `image` to `path` in the format named by `extension`.
///
/// `quality` (1-100) is honoured by lossy encoders. A partially written file
/// is removed when encoding fails.
pub fn write_image(image: &DynamicImage, path: &Path, extension: &str, quality: Option<u8>) -> Result<()> {
    let format = format_for_extension(extension)
        .ok_or_else(|| anyhow!("No encoder available for the {:?} format", extension))?;

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let image = encodable(image, format);
    let result = match (format, quality) {
        (ImageFormat::Jpeg, Some(quality)) => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            image.write_with_encoder(encoder)
        }
        (ImageFormat::Avif, Some(quality)) => {
            let encoder = AvifEncoder::new_with_speed_quality(&mut writer, AVIF_SPEED, quality.clamp(1, 100));
            image.write_with_encoder(encoder)
        }
        _ => image.write_to(&mut writer, format),
    };

    let result = result
        .map_err(anyhow::Error::from)
        .and_then(|_| writer.into_inner().map(|_| ()).map_err(|e| e.into_error().into()));

    if let Err(e) = result {
        if let Err(remove_err) = std::fs::remove_file(path) {
            log::warn!("Could not remove partial file {}: {}", path.display(), remove_err);
        }
        return Err(e).with_context(|| format!("Failed to encode {}", path.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::formats::writable_formats;
    use image::{GrayImage, ImageBuffer, Luma, RgbImage};

    fn gradient() -> DynamicImage {
        let img = RgbImage::from_fn(32, 16, |x, y| image::Rgb([(x * 8) as u8, (y * 16) as u8, 128]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        write_image(&gradient(), &path, "png", None).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (32, 16));
    }

    #[test]
    fn test_jpeg_quality_changes_size() {
        let dir = tempfile::tempdir().unwrap();
        let low = dir.path().join("low.jpeg");
        let high = dir.path().join("high.jpeg");

        write_image(&gradient(), &low, "jpeg", Some(5)).unwrap();
        write_image(&gradient(), &high, "jpeg", Some(100)).unwrap();

        let low_len = std::fs::metadata(&low).unwrap().len();
        let high_len = std::fs::metadata(&high).unwrap().len();
        assert!(low_len < high_len);
    }

    #[test]
    fn test_every_offered_format_writes_gray_and_color_scans() {
        let dir = tempfile::tempdir().unwrap();
        // Wider than the 256 pixel limit some icon-style formats have.
        let gray = DynamicImage::ImageLuma8(GrayImage::from_fn(300, 24, |x, _| Luma([(x % 256) as u8])));
        let color = DynamicImage::ImageRgb8(RgbImage::from_fn(300, 24, |x, y| image::Rgb([(x % 256) as u8, (y * 8) as u8, 64])));

        for format in writable_formats() {
            for (label, image) in [("gray", &gray), ("color", &color)] {
                let path = dir.path().join(format!("{}.{}", label, format));
                if let Err(e) = write_image(image, &path, &format, None) {
                    panic!("writing a {} scan as {} failed: {:#}", label, format, e);
                }
                assert!(std::fs::metadata(&path).unwrap().len() > 0);
            }
        }
    }

    #[test]
    fn test_avif_quality_changes_size() {
        if format_for_extension("avif").is_none() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let low = dir.path().join("low.avif");
        let high = dir.path().join("high.avif");

        write_image(&gradient(), &low, "avif", Some(5)).unwrap();
        write_image(&gradient(), &high, "avif", Some(100)).unwrap();

        let low_len = std::fs::metadata(&low).unwrap().len();
        let high_len = std::fs::metadata(&high).unwrap().len();
        assert!(low_len < high_len);
    }

    #[test]
    fn test_sixteen_bit_png_keeps_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.png");
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(4, 4, |x, _| Luma([x as u16 * 1000]));

        write_image(&DynamicImage::ImageLuma16(img), &path, "png", None).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.color(), image::ColorType::L16);
    }

    #[test]
    fn test_missing_directory_reports_os_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let img = DynamicImage::ImageLuma8(GrayImage::new(2, 2));

        let err = write_image(&img, &path, "png", None).unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.contains("Failed to create"));
        assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xyz");
        let img = DynamicImage::ImageLuma8(GrayImage::new(2, 2));

        assert!(write_image(&img, &path, "xyz", None).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_encoder_rejection_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.jpeg");
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(4, 4);

        assert!(write_image(&DynamicImage::ImageLuma16(img), &path, "jpeg", Some(80)).is_err());
        assert!(!path.exists());
    }
}
