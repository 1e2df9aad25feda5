//! Decoded asset payloads produced by the built-in loaders

use super::loader::LoaderError;

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Location the texture was loaded from
    pub source: String,
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Texture {
    /// Decode an encoded image (PNG) from memory
    pub fn from_bytes(source: &str, bytes: &[u8]) -> Result<Self, LoaderError> {
        let img = image::load_from_memory(bytes).map_err(|e| LoaderError::Decode {
            url: source.to_string(),
            message: e.to_string(),
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded texture {}x{} from {}", width, height, source);

        Ok(Self {
            source: source.to_string(),
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid colour texture (placeholders and tests)
    pub fn solid_color(source: &str, width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = pixel_count(width, height);
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&color);
        }

        Self {
            source: source.to_string(),
            data,
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Undecoded file contents (json, atlases, audio, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    /// Location the bytes were loaded from
    pub source: String,
    /// File contents
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color("mem", 4, 2, [255, 0, 0, 255]);
        assert_eq!(tex.size_bytes(), 4 * 2 * 4);
        assert_eq!(&tex.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_pixel_count_does_not_wrap() {
        assert_eq!(pixel_count(65_536, 65_536), 1_usize << 32);
        assert_eq!(pixel_count(0, u32::MAX), 0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Texture::from_bytes("bad.png", b"not an image").unwrap_err();
        assert!(matches!(err, LoaderError::Decode { .. }));
    }
}
