//! Cover art download, recoloring and encoding.
//!
//! The recolorizer fetches the source cover, bounds it to a small square,
//! dims it and stamps a centered leaf glyph on top, then re-encodes the
//! result as base64 PNG for the image-upload endpoint. Every failure is
//! surfaced as `Error::Image`; the fallback to the built-in default cover is
//! the orchestrator's call, not this module's.

use std::io::Cursor;
use std::sync::OnceLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops::FilterType};
use reqwest::Client;

use crate::error::Error;

/// Longer-edge bound for the recolored cover. Keeps the upload payload small;
/// the catalog caps cover uploads at 256 KB.
pub const MAX_EDGE: u32 = 200;

/// Source image opacity beneath the glyph.
const IMAGE_OPACITY: f32 = 0.9;

const LEAF_GREEN: Rgba<u8> = Rgba([96, 178, 112, 255]);
const STEM_BROWN: Rgba<u8> = Rgba([92, 70, 48, 255]);
const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([34, 40, 49, 255]);

/// Fetches the source cover and produces the recolored, base64-encoded
/// replacement. Fetch, decode and re-encode failures all yield
/// `Error::Image` so the caller can observe and degrade.
pub async fn recolor(client: &Client, source_image_url: &str) -> Result<String, Error> {
    let response = client
        .get(source_image_url)
        .send()
        .await
        .map_err(|e| Error::Image(e.to_string()))?;

    if !response.status().is_success() {
        return Err(Error::Image(format!(
            "cover fetch returned HTTP {}",
            response.status().as_u16()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Image(e.to_string()))?;

    recolor_bytes(&bytes)
}

/// Pure half of [`recolor`]: decode, bound, dim, stamp, encode.
pub fn recolor_bytes(bytes: &[u8]) -> Result<String, Error> {
    let decoded = image::load_from_memory(bytes)?;
    let mut canvas = bound_to_max_edge(decoded).to_rgba8();
    scale_alpha(&mut canvas, IMAGE_OPACITY);
    draw_leaf(&mut canvas);
    encode_base64_png(&canvas)
}

/// Built-in cover used when the source playlist has no cover image or the
/// recoloring failed: the leaf glyph on a plain dark background.
/// Deterministic, computed once per process.
pub fn default_cover() -> &'static str {
    static ENCODED: OnceLock<String> = OnceLock::new();
    ENCODED.get_or_init(|| {
        let mut canvas = RgbaImage::from_pixel(MAX_EDGE, MAX_EDGE, DEFAULT_BACKGROUND);
        draw_leaf(&mut canvas);
        encode_base64_png(&canvas).expect("encoding the generated default cover")
    })
}

fn bound_to_max_edge(img: DynamicImage) -> DynamicImage {
    if img.width().max(img.height()) > MAX_EDGE {
        // resize preserves aspect ratio within the bounding square
        img.resize(MAX_EDGE, MAX_EDGE, FilterType::Triangle)
    } else {
        img
    }
}

fn scale_alpha(canvas: &mut RgbaImage, opacity: f32) {
    for pixel in canvas.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f32 * opacity) as u8;
    }
}

/// Stamps a centered leaf at full opacity: a vertically stretched diamond
/// blade over a short stem.
fn draw_leaf(canvas: &mut RgbaImage) {
    let (width, height) = canvas.dimensions();
    let cx = width as i64 / 2;
    let cy = height as i64 / 2;
    let ry = (width.min(height) as i64 / 4).max(2);
    let rx = (ry * 3 / 5).max(1);

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let dx = (x - cx).abs();
            let dy = (y - cy).abs();
            if dx * ry + dy * rx <= rx * ry {
                canvas.put_pixel(x as u32, y as u32, LEAF_GREEN);
            }
        }
    }

    let stem_top = cy + ry;
    let stem_bottom = (stem_top + ry / 2).min(height as i64 - 1);
    for y in stem_top..=stem_bottom {
        for x in (cx - 1)..=(cx + 1) {
            if x >= 0 && x < width as i64 {
                canvas.put_pixel(x as u32, y as u32, STEM_BROWN);
            }
        }
    }
}

fn encode_base64_png(canvas: &RgbaImage) -> Result<String, Error> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas.clone()).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(STANDARD.encode(buffer.into_inner()))
}
