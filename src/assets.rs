//! BMP texture loading.
//!
//! The decoder reads the fixed 54-byte header, trusts the width/height/size
//! fields, and swaps B/R in place over 3-byte strides. No bfType, bit-depth
//! or compression checks, and no row padding handling. A load failure logs
//! and the game continues untextured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Texture slots referenced by game objects and the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKey {
    /// Front face of the movable door
    Door,
    /// The anamorphic picture spread over the puzzle pieces
    Picture,
    /// Skybox
    Sky,
    /// The three face textures of the puzzle reward box
    BoxFront,
    BoxTop,
    BoxSide,
}

impl TextureKey {
    pub const ALL: [TextureKey; 6] = [
        TextureKey::Door,
        TextureKey::Picture,
        TextureKey::Sky,
        TextureKey::BoxFront,
        TextureKey::BoxTop,
        TextureKey::BoxSide,
    ];

    /// Relative path of the backing file.
    pub fn path(self) -> &'static str {
        match self {
            TextureKey::Door => "data/wood.bmp",
            TextureKey::Picture => "data/picture.bmp",
            TextureKey::Sky => "data/sky.bmp",
            TextureKey::BoxFront => "data/box_front.bmp",
            TextureKey::BoxTop => "data/box_top.bmp",
            TextureKey::BoxSide => "data/box_side.bmp",
        }
    }
}

#[derive(Debug, Error)]
pub enum BmpError {
    #[error("file shorter than the 54-byte BMP header")]
    TruncatedHeader,
    #[error("pixel data truncated: header promises {expected} bytes, file has {actual}")]
    TruncatedPixels { expected: usize, actual: usize },
}

/// A decoded 24-bit image, pixel data in RGB order.
#[derive(Debug, Clone)]
pub struct BmpImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

const HEADER_LEN: usize = 54;

fn read_i32_le(bytes: &[u8], offset: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_le_bytes(buf)
}

/// Decode a 24-bit BMP. Width is at 0x12, height at 0x16, image size at
/// 0x22 (zero means `width * height * 3`). The data is stored BGR and
/// swapped to RGB in place.
pub fn decode_bmp(bytes: &[u8]) -> Result<BmpImage, BmpError> {
    if bytes.len() < HEADER_LEN {
        return Err(BmpError::TruncatedHeader);
    }

    let width = read_i32_le(bytes, 0x12).unsigned_abs();
    let height = read_i32_le(bytes, 0x16).unsigned_abs();
    let mut image_size = read_i32_le(bytes, 0x22).unsigned_abs() as usize;
    if image_size == 0 {
        image_size = (width as usize) * (height as usize) * 3;
    }

    let available = bytes.len() - HEADER_LEN;
    if available < image_size {
        return Err(BmpError::TruncatedPixels {
            expected: image_size,
            actual: available,
        });
    }

    let mut pixels = bytes[HEADER_LEN..HEADER_LEN + image_size].to_vec();
    let mut i = 0;
    while i + 2 < pixels.len() {
        pixels.swap(i, i + 2);
        i += 3;
    }

    Ok(BmpImage {
        width,
        height,
        pixels,
    })
}

impl BmpImage {
    /// Expand RGB to RGBA for GPU upload.
    pub fn to_rgba(&self) -> Vec<u8> {
        let count = (self.width as usize) * (self.height as usize);
        let mut out = Vec::with_capacity(count * 4);
        for px in self.pixels.chunks_exact(3).take(count) {
            out.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        // Short pixel data (image_size smaller than w*h*3) pads opaque black
        while out.len() < count * 4 {
            out.extend_from_slice(&[0, 0, 0, 255]);
        }
        out
    }
}

/// The loaded texture set. Missing entries render as vertex color only.
#[derive(Debug, Default)]
pub struct Assets {
    images: HashMap<TextureKey, BmpImage>,
}

impl Assets {
    /// No textures at all (wasm has no filesystem; textures are optional).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every known texture from its relative path, skipping failures.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_default() -> Self {
        let mut assets = Self::default();
        for key in TextureKey::ALL {
            match std::fs::read(key.path()) {
                Ok(bytes) => match decode_bmp(&bytes) {
                    Ok(image) => {
                        log::info!(
                            "loaded {} ({}x{})",
                            key.path(),
                            image.width,
                            image.height
                        );
                        assets.images.insert(key, image);
                    }
                    Err(e) => log::warn!("failed to decode {}: {e}", key.path()),
                },
                Err(e) => log::warn!("failed to read {}: {e}", key.path()),
            }
        }
        assets
    }

    pub fn insert(&mut self, key: TextureKey, image: BmpImage) {
        self.images.insert(key, image);
    }

    pub fn get(&self, key: TextureKey) -> Option<&BmpImage> {
        self.images.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bmp(width: i32, height: i32, image_size: i32, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[0x12..0x16].copy_from_slice(&width.to_le_bytes());
        bytes[0x16..0x1a].copy_from_slice(&height.to_le_bytes());
        bytes[0x22..0x26].copy_from_slice(&image_size.to_le_bytes());
        bytes.extend_from_slice(pixels);
        bytes
    }

    #[test]
    fn test_decode_swaps_b_and_r() {
        // One blue pixel stored BGR
        let bytes = make_bmp(1, 1, 3, &[255, 0, 0]);
        let img = decode_bmp(&bytes).unwrap();
        assert_eq!(img.width, 1);
        assert_eq!(img.height, 1);
        assert_eq!(img.pixels, vec![0, 0, 255]);
    }

    #[test]
    fn test_zero_image_size_falls_back_to_dimensions() {
        let bytes = make_bmp(2, 1, 0, &[1, 2, 3, 4, 5, 6]);
        let img = decode_bmp(&bytes).unwrap();
        assert_eq!(img.pixels.len(), 6);
        assert_eq!(img.pixels, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            decode_bmp(&[0u8; 53]),
            Err(BmpError::TruncatedHeader)
        ));
    }

    #[test]
    fn test_truncated_pixels() {
        let bytes = make_bmp(4, 4, 0, &[0u8; 10]);
        match decode_bmp(&bytes) {
            Err(BmpError::TruncatedPixels { expected, actual }) => {
                assert_eq!(expected, 48);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_to_rgba_expands_and_pads() {
        let img = BmpImage {
            width: 2,
            height: 1,
            pixels: vec![10, 20, 30],
        };
        let rgba = img.to_rgba();
        assert_eq!(rgba, vec![10, 20, 30, 255, 0, 0, 0, 255]);
    }
}
