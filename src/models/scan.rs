// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raw scan data.
//!
//! A [`ScanResult`] is the raster a scanner hands back after one completed
//! scan: packed rows of samples plus enough metadata to interpret them.

use anyhow::{bail, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};

/// Sample layout of a scanned raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One bit per pixel, most significant bit first, set bit is black.
    BlackWhite,
    Gray8,
    /// 16-bit samples in native byte order.
    Gray16,
    Rgb8,
    /// 16-bit samples in native byte order.
    Rgb16,
}

impl PixelFormat {
    /// Whether samples are 16 bits deep.
    pub fn is_16bit(self) -> bool {
        matches!(self, PixelFormat::Gray16 | PixelFormat::Rgb16)
    }

    /// Minimum number of bytes a row of `width` pixels occupies.
    pub fn packed_row_len(self, width: u32) -> usize {
        let width = width as usize;
        match self {
            PixelFormat::BlackWhite => width.div_ceil(8),
            PixelFormat::Gray8 => width,
            PixelFormat::Gray16 => width * 2,
            PixelFormat::Rgb8 => width * 3,
            PixelFormat::Rgb16 => width * 6,
        }
    }
}

/// One completed scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub bytes_per_line: usize,
    pub format: PixelFormat,
}

impl ScanResult {
    /// Pack a decoded image into a scan raster of the given format.
    pub fn from_image(image: &DynamicImage, format: PixelFormat) -> Self {
        let (width, height) = (image.width(), image.height());
        let data = match format {
            PixelFormat::BlackWhite => pack_lineart(&image.to_luma8()),
            PixelFormat::Gray8 => image.to_luma8().into_raw(),
            PixelFormat::Gray16 => image
                .to_luma16()
                .into_raw()
                .iter()
                .flat_map(|s| s.to_ne_bytes())
                .collect(),
            PixelFormat::Rgb8 => image.to_rgb8().into_raw(),
            PixelFormat::Rgb16 => image
                .to_rgb16()
                .into_raw()
                .iter()
                .flat_map(|s| s.to_ne_bytes())
                .collect(),
        };

        Self {
            data,
            width,
            height,
            bytes_per_line: format.packed_row_len(width),
            format,
        }
    }

    /// Convert the raster into an image the encoders understand.
    ///
    /// Black-and-white scans become 8-bit grayscale; 16-bit scans keep their
    /// depth so they can be written losslessly.
    pub fn to_image(&self) -> Result<DynamicImage> {
        if self.width == 0 || self.height == 0 {
            bail!("Scan is empty ({}x{})", self.width, self.height);
        }
        let row_len = self.format.packed_row_len(self.width);
        if self.bytes_per_line < row_len {
            bail!(
                "Scan line of {} bytes is too short for {} pixels",
                self.bytes_per_line,
                self.width
            );
        }
        let needed = self.bytes_per_line * self.height as usize;
        if self.data.len() < needed {
            bail!(
                "Scan data is truncated: {} of {} bytes",
                self.data.len(),
                needed
            );
        }

        let rows = self
            .data
            .chunks_exact(self.bytes_per_line)
            .take(self.height as usize)
            .map(|row| &row[..row_len]);

        let image = match self.format {
            PixelFormat::BlackWhite => {
                let width = self.width as usize;
                let pixels: Vec<u8> = rows
                    .flat_map(|row| {
                        (0..width).map(move |x| {
                            if row[x / 8] & (0x80 >> (x % 8)) != 0 {
                                0
                            } else {
                                255
                            }
                        })
                    })
                    .collect();
                DynamicImage::ImageLuma8(buffer(self.width, self.height, pixels)?)
            }
            PixelFormat::Gray8 => {
                let pixels: Vec<u8> = rows.flatten().copied().collect();
                DynamicImage::ImageLuma8(buffer(self.width, self.height, pixels)?)
            }
            PixelFormat::Gray16 => {
                let samples = rows.flat_map(ne_samples).collect();
                DynamicImage::ImageLuma16(buffer::<Luma<u16>>(self.width, self.height, samples)?)
            }
            PixelFormat::Rgb8 => {
                let pixels: Vec<u8> = rows.flatten().copied().collect();
                DynamicImage::ImageRgb8(buffer(self.width, self.height, pixels)?)
            }
            PixelFormat::Rgb16 => {
                let samples = rows.flat_map(ne_samples).collect();
                DynamicImage::ImageRgb16(buffer::<Rgb<u16>>(self.width, self.height, samples)?)
            }
        };

        Ok(image)
    }
}

fn buffer<P: image::Pixel>(
    width: u32,
    height: u32,
    samples: Vec<P::Subpixel>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    match ImageBuffer::from_raw(width, height, samples) {
        Some(buffer) => Ok(buffer),
        None => bail!("Scan buffer does not match {}x{} pixels", width, height),
    }
}

fn ne_samples(row: &[u8]) -> impl Iterator<Item = u16> + '_ {
    row.chunks_exact(2).map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
}

/// Threshold a grayscale image into packed lineart rows.
fn pack_lineart(gray: &GrayImage) -> Vec<u8> {
    let row_len = PixelFormat::BlackWhite.packed_row_len(gray.width());
    let mut data = vec![0u8; row_len * gray.height() as usize];
    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] < 128 {
            data[y as usize * row_len + x as usize / 8] |= 0x80 >> (x % 8);
        }
    }
    data
}
