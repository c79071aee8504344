//! Software renderer: a fixed-size RGB pixel buffer, texture units and the
//! active program. Presenting upscales the buffer instead of blitting to a
//! window.

use std::{collections::HashMap, sync::Arc};

use asset::{TextureData, TextureFormat};
use corelib::{CausticError, CausticResult, Rectangle};
use parking_lot::Mutex;

use crate::program::ProgramId;

/// Renderer shared between the programs that draw into it.
pub type SharedRenderer = Arc<Mutex<SoftwareRenderer>>;

/// Pixel buffer size and the integer upscale applied by [`SoftwareRenderer::present`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            scale: 4,
        }
    }
}

pub struct SoftwareRenderer {
    config: RendererConfig,
    viewport: Rectangle,
    /// `0x00RRGGBB`, row-major.
    pixels: Vec<u32>,
    textures: HashMap<u32, Arc<TextureData>>,
    active_program: Option<ProgramId>,
}

impl SoftwareRenderer {
    pub fn new(config: RendererConfig) -> CausticResult<Self> {
        if config.width == 0 || config.height == 0 || config.scale == 0 {
            return Err(CausticError::InvalidArgument(format!(
                "Renderer dimensions must be non-zero, got {}x{} at scale {}",
                config.width, config.height, config.scale
            )));
        }
        let presented = config
            .width
            .checked_mul(config.scale)
            .zip(config.height.checked_mul(config.scale));
        if presented.is_none() {
            return Err(CausticError::InvalidArgument(format!(
                "Presented size of {}x{} at scale {} does not fit in u32",
                config.width, config.height, config.scale
            )));
        }
        log::debug!(
            "Software renderer {}x{} (x{})",
            config.width,
            config.height,
            config.scale
        );
        Ok(Self {
            config,
            viewport: Rectangle::from_size(config.width, config.height),
            pixels: vec![0; config.width as usize * config.height as usize],
            textures: HashMap::new(),
            active_program: None,
        })
    }

    pub fn into_shared(self) -> SharedRenderer {
        Arc::new(Mutex::new(self))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.config.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.config.height
    }

    #[inline]
    pub fn scale(&self) -> u32 {
        self.config.scale
    }

    pub fn viewport(&self) -> Rectangle {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rectangle) {
        self.viewport = viewport;
    }

    pub fn clear_pixels(&mut self) {
        self.pixels.fill(0);
    }

    pub fn write_pixel(&mut self, x: i32, y: i32, color: u32) -> CausticResult<()> {
        let index = self.index_of(x, y).ok_or_else(|| {
            CausticError::InvalidArgument(format!(
                "({x}, {y}) not within (0, 0) to ({}, {})",
                self.config.width - 1,
                self.config.height - 1
            ))
        })?;
        self.pixels[index] = color;
        Ok(())
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        if x >= self.config.width || y >= self.config.height {
            return None;
        }
        Some(x as usize + y as usize * self.config.width as usize)
    }

    /// Bind `texture` to `unit`, returning the previous one.
    pub fn bind_texture(&mut self, unit: u32, texture: Arc<TextureData>) -> Option<Arc<TextureData>> {
        self.textures.insert(unit, texture)
    }

    pub fn unbind_texture(&mut self, unit: u32) -> Option<Arc<TextureData>> {
        self.textures.remove(&unit)
    }

    pub fn texture(&self, unit: u32) -> Option<Arc<TextureData>> {
        self.textures.get(&unit).cloned()
    }

    pub fn active_program(&self) -> Option<ProgramId> {
        self.active_program
    }

    pub(crate) fn set_active_program(&mut self, program: Option<ProgramId>) {
        self.active_program = program;
    }

    /// The pixel buffer upscaled by `scale` (nearest neighbour) as RGBA.
    pub fn present(&self) -> TextureData {
        let scale = self.config.scale as usize;
        let (w, h) = (self.config.width as usize, self.config.height as usize);
        let mut data = Vec::with_capacity(w * scale * h * scale * 4);
        for row in self.pixels.chunks_exact(w) {
            for _ in 0..scale {
                for &color in row {
                    let [_, r, g, b] = color.to_be_bytes();
                    for _ in 0..scale {
                        data.extend_from_slice(&[r, g, b, 255]);
                    }
                }
            }
        }
        TextureData {
            data,
            width: self.config.width * self.config.scale,
            height: self.config.height * self.config.scale,
            format: TextureFormat::Rgba,
        }
    }
}
