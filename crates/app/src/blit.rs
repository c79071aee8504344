//! Fragment stage used for `--snapshot`: tiles the texture bound to its
//! sampler unit across the viewport, multiplied by the `tint` uniform.

use std::sync::Arc;

use asset::TextureData;
use corelib::{CausticResult, Vec3};
use renderer::{ShaderImplementation, SoftwareRenderer, UniformValue};

pub struct TextureBlit {
    unit: u32,
    tint: Vec3,
    texture: Option<Arc<TextureData>>,
}

impl TextureBlit {
    pub fn new(unit: u32) -> Self {
        Self {
            unit,
            tint: Vec3::ONE,
            texture: None,
        }
    }
}

impl ShaderImplementation for TextureBlit {
    fn set_uniform(&mut self, name: &str, value: &UniformValue) {
        match (name, value) {
            ("tint", UniformValue::Vec3(tint)) => self.tint = *tint,
            _ => log::debug!("Blit ignores uniform '{}' ({})", name, value.glsl_type()),
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Arc<TextureData>) {
        if unit == self.unit {
            self.texture = Some(texture);
        }
    }

    fn uniform_names(&self) -> Vec<String> {
        vec!["tint".to_string()]
    }

    fn draw(&mut self, target: &mut SoftwareRenderer) -> CausticResult<()> {
        let Some(texture) = self.texture.as_ref() else {
            log::warn!("No texture bound at unit {}; nothing drawn", self.unit);
            return Ok(());
        };
        if texture.width == 0 || texture.height == 0 {
            log::warn!("Texture at unit {} is empty; nothing drawn", self.unit);
            return Ok(());
        }
        let viewport = target.viewport();
        for vy in 0..viewport.height {
            for vx in 0..viewport.width {
                let (x, y) = (viewport.x + vx as i32, viewport.y + vy as i32);
                if target.pixel(x, y).is_none() {
                    continue;
                }
                let texel = texture.texel(vx % texture.width, vy % texture.height);
                let Some([r, g, b, _]) = texel else { continue };
                let shade = |c: u8, t: f32| (c as f32 * t.clamp(0.0, 1.0)) as u32;
                let color = shade(r, self.tint.x) << 16
                    | shade(g, self.tint.y) << 8
                    | shade(b, self.tint.z);
                target.write_pixel(x, y, color)?;
            }
        }
        Ok(())
    }
}
