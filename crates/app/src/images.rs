//! Image ingestion pipeline: decode, shrink-only downscale, JPEG re-encode,
//! data-URL packaging.
//!
//! Each upload kind carries its own size cap and JPEG quality. QR images are
//! flattened onto a white background first so transparent corners do not turn
//! black in the JPEG.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage, imageops};
use thiserror::Error;

/// Image pipeline errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),
}

const AVATAR_MAX_EDGE: u32 = 500;
const AVATAR_QUALITY: u8 = 70;
const PRODUCT_MAX_EDGE: u32 = 800;
const PRODUCT_QUALITY: u8 = 70;
const QR_MAX_EDGE: u32 = 800;
const QR_QUALITY: u8 = 85;
const BANNER_MAX_WIDTH: u32 = 1200;
const BANNER_QUALITY: u8 = 80;

/// Target dimensions under a maximum-edge cap. Shrink-only: images already
/// within the cap keep their dimensions. Fractional results are floored.
#[must_use]
pub fn scaled_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }
    if width > height {
        let scaled = f64::from(height) * f64::from(max_edge) / f64::from(width);
        (max_edge, scaled as u32)
    } else {
        let scaled = f64::from(width) * f64::from(max_edge) / f64::from(height);
        (scaled as u32, max_edge)
    }
}

/// Target dimensions under a width-only cap (banners). Shrink-only; the
/// height scales proportionally and is floored.
#[must_use]
pub fn width_capped_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = f64::from(height) * f64::from(max_width) / f64::from(width);
    (max_width, scaled as u32)
}

/// Process a profile avatar: cap both edges at 500px, JPEG quality 70.
///
/// # Errors
///
/// Returns `ImageError` when the input bytes cannot be decoded or the
/// result cannot be encoded.
pub fn process_avatar(bytes: &[u8]) -> Result<String, ImageError> {
    let img = decode(bytes)?;
    let resized = shrink_to_edge(&img, AVATAR_MAX_EDGE);
    encode_jpeg_data_url(&resized, AVATAR_QUALITY)
}

/// Process a product photo: cap both edges at 800px, JPEG quality 70.
///
/// # Errors
///
/// Returns `ImageError` on decode or encode failure.
pub fn process_product_image(bytes: &[u8]) -> Result<String, ImageError> {
    let img = decode(bytes)?;
    let resized = shrink_to_edge(&img, PRODUCT_MAX_EDGE);
    encode_jpeg_data_url(&resized, PRODUCT_QUALITY)
}

/// Process a QR code image: flatten onto a white background, cap both edges
/// at 800px, JPEG quality 85.
///
/// # Errors
///
/// Returns `ImageError` on decode or encode failure.
pub fn process_qr_image(bytes: &[u8]) -> Result<String, ImageError> {
    let img = decode(bytes)?;
    let resized = shrink_to_edge(&img, QR_MAX_EDGE);

    // Transparent pixels become white, not black, in the JPEG.
    let rgba = resized.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);

    encode_jpeg_data_url(&DynamicImage::ImageRgba8(canvas), QR_QUALITY)
}

/// Process a banner: cap the width at 1200px, JPEG quality 80.
///
/// # Errors
///
/// Returns `ImageError` on decode or encode failure.
pub fn process_banner_image(bytes: &[u8]) -> Result<String, ImageError> {
    let img = decode(bytes)?;
    let (width, height) = width_capped_dimensions(img.width(), img.height(), BANNER_MAX_WIDTH);
    let resized = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    };
    encode_jpeg_data_url(&resized, BANNER_QUALITY)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes).map_err(|err| ImageError::Decode(err.to_string()))
}

fn shrink_to_edge(img: &DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = scaled_dimensions(img.width(), img.height(), max_edge);
    if (width, height) == (img.width(), img.height()) {
        img.clone()
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    }
}

fn encode_jpeg_data_url(img: &DynamicImage, quality: u8) -> Result<String, ImageError> {
    let rgb = img.to_rgb8();
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| ImageError::Encode(err.to_string()))?;
    Ok(format!(
        "data:image/jpeg;base64,{}",
        BASE64.encode(&jpeg)
    ))
}
