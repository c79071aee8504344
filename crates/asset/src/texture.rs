//! Texture data kept on the CPU: software sampling, snapshots, PNG I/O.

use std::path::Path;

use anyhow::Context;
use corelib::{CausticError, CausticResult};
use image::ExtendedColorType;

/// Supported texture formats, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl TextureFormat {
    pub fn components(self) -> u32 {
        match self {
            TextureFormat::Red => 1,
            TextureFormat::Rg => 2,
            TextureFormat::Rgb => 3,
            TextureFormat::Rgba => 4,
        }
    }

    fn color_type(self) -> ExtendedColorType {
        match self {
            TextureFormat::Red => ExtendedColorType::L8,
            TextureFormat::Rg => ExtendedColorType::La8,
            TextureFormat::Rgb => ExtendedColorType::Rgb8,
            TextureFormat::Rgba => ExtendedColorType::Rgba8,
        }
    }
}

/// Tightly packed texture data, rows top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureData {
    /// Fails with `InvalidArgument` when either dimension is zero or `data`
    /// does not hold exactly `width * height` pixels of `format`.
    pub fn new(
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Vec<u8>,
    ) -> CausticResult<Self> {
        if width == 0 || height == 0 {
            return Err(CausticError::InvalidArgument(format!(
                "Texture dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * format.components() as usize;
        if data.len() != expected {
            return Err(CausticError::InvalidArgument(format!(
                "Texture data is {} bytes, expected {} for {}x{} {:?}",
                data.len(),
                expected,
                width,
                height,
                format
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Load texture from PNG file, converted to RGBA.
    pub fn load_png<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).with_context(|| format!("Failed to open image {path:?}"))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let texture = Self::new(width, height, TextureFormat::Rgba, rgba.into_raw())?;

        log::info!("Loaded texture {}x{} with {} bytes", width, height, texture.data.len());
        Ok(texture)
    }

    /// Write the texture as PNG; the format picks the PNG color type.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        image::save_buffer(path, &self.data, self.width, self.height, self.format.color_type())
            .with_context(|| format!("Failed to save image {path:?}"))?;
        log::info!("Saved texture {}x{} to {:?}", self.width, self.height, path);
        Ok(())
    }

    /// Simple test texture (8x8 checkerboard of white and gray).
    pub fn checkerboard(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }
        Self {
            data,
            width: size,
            height: size,
            format: TextureFormat::Rgba,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.components()
    }

    /// Texel at `(x, y)` expanded to RGBA; missing channels are 0, alpha 255.
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.bytes_per_pixel() as usize;
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        let px = self.data.get(start..start + bpp)?;
        Some(match self.format {
            TextureFormat::Red => [px[0], 0, 0, 255],
            TextureFormat::Rg => [px[0], px[1], 0, 255],
            TextureFormat::Rgb => [px[0], px[1], px[2], 255],
            TextureFormat::Rgba => [px[0], px[1], px[2], px[3]],
        })
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected = self.width as usize * self.height as usize * self.bytes_per_pixel() as usize;
        self.data.len() == expected && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = TextureData::new(2, 2, TextureFormat::Rgb, vec![0; 11]).unwrap_err();
        assert!(matches!(err, CausticError::InvalidArgument(_)));
        assert!(TextureData::new(2, 2, TextureFormat::Rgb, vec![0; 12]).is_ok());
    }

    #[test]
    fn rejects_empty_dimensions() {
        for (w, h) in [(0, 0), (0, 4), (4, 0)] {
            let err = TextureData::new(w, h, TextureFormat::Rgba, Vec::new()).unwrap_err();
            assert!(matches!(err, CausticError::InvalidArgument(_)));
        }
    }

    #[test]
    fn texel_expands_to_rgba() {
        let tex = TextureData::new(2, 1, TextureFormat::Rg, vec![10, 20, 30, 40]).unwrap();
        assert_eq!(tex.texel(0, 0), Some([10, 20, 0, 255]));
        assert_eq!(tex.texel(1, 0), Some([30, 40, 0, 255]));
        assert_eq!(tex.texel(2, 0), None);
        assert_eq!(tex.texel(0, 1), None);
    }

    #[test]
    fn checkerboard_pattern() {
        let tex = TextureData::checkerboard(16);
        assert!(tex.is_valid());
        assert_eq!(tex.texel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(tex.texel(8, 0), Some([128, 128, 128, 255]));
        assert_eq!(tex.texel(8, 8), Some([255, 255, 255, 255]));
    }

    #[test]
    fn png_round_trip() {
        let path = std::env::temp_dir().join(format!("caustic-texture-{}.png", std::process::id()));
        let tex = TextureData::checkerboard(16);
        tex.save_png(&path).unwrap();
        let loaded = TextureData::load_png(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, tex);
    }
}
