//! Entry point for the `caustic` inspector.
//! Loads OBJ meshes and shader sources, logs what they contain, and can
//! render a snapshot through the software renderer.

mod blit;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use asset::{ObjAttributes, ShaderSource, TextureData, load_obj_from_path};
use corelib::Vec3;
use renderer::{
    Material, RendererConfig, SoftwareRenderer, SoftwareShader, UniformTable, VertexData,
};

use crate::blit::TextureBlit;

const BLIT_VERTEX: &str = include_str!("shaders/blit.vert");
const BLIT_FRAGMENT: &str = include_str!("shaders/blit.frag");

#[derive(Debug, Default)]
struct Options {
    objs: Vec<String>,
    shaders: Vec<String>,
    attributes: ObjAttributes,
    snapshot: Option<String>,
    config: RendererConfig,
}

fn parse_args(args: impl Iterator<Item = String>) -> Options {
    // Accept: --obj=PATH --shader=PATH --no-normals --no-texcoords
    //         --snapshot=PATH --size=WxH --scale=N
    let mut opts = Options::default();
    for arg in args {
        if let Some(path) = arg.strip_prefix("--obj=") {
            opts.objs.push(path.to_string());
        } else if let Some(path) = arg.strip_prefix("--shader=") {
            opts.shaders.push(path.to_string());
        } else if arg == "--no-normals" {
            opts.attributes.normals = false;
        } else if arg == "--no-texcoords" {
            opts.attributes.texture_coords = false;
        } else if let Some(path) = arg.strip_prefix("--snapshot=") {
            opts.snapshot = Some(path.to_string());
        } else if let Some(v) = arg.strip_prefix("--size=") {
            match v.split_once('x').or_else(|| v.split_once('X')) {
                Some((sw, sh)) => match (sw.parse::<u32>(), sh.parse::<u32>()) {
                    (Ok(w), Ok(h)) => {
                        opts.config.width = w.max(1);
                        opts.config.height = h.max(1);
                    }
                    _ => log::warn!("Invalid --size '{}', keeping default", v),
                },
                None => log::warn!("Invalid --size '{}', expected WxH", v),
            }
        } else if let Some(v) = arg.strip_prefix("--scale=") {
            match v.parse::<u32>() {
                Ok(s) => opts.config.scale = s.max(1),
                Err(_) => log::warn!("Invalid --scale '{}', keeping default", v),
            }
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }
    opts
}

fn inspect_obj(path: &str, attributes: ObjAttributes) -> Result<()> {
    let mesh = load_obj_from_path(path, attributes)?;
    let data = VertexData::from_obj_mesh(&mesh);
    log::info!(
        "{}: {} vertices, {} triangles, sizes (position, normal, uv) = {:?}",
        path,
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.sizes.to_array()
    );
    for (slot, attribute) in data.attributes() {
        log::info!(
            "  attribute {} '{}': {} x {:?}, {} bytes",
            slot,
            attribute.name(),
            attribute.size(),
            attribute.data_type(),
            attribute.data()?.len()
        );
    }
    if !mesh.is_valid() {
        log::warn!("{}: mesh is empty or inconsistent", path);
    }
    Ok(())
}

fn inspect_shader(path: &str) -> Result<()> {
    let shader = ShaderSource::from_path(path)?;
    match shader.shader_type() {
        Some(ty) => log::info!("{}: {} shader", path, ty),
        None => log::warn!("{}: no $shader_type token; type must be set by the caller", path),
    }
    let mut attributes: Vec<_> = shader.attribute_layouts().iter().collect();
    attributes.sort_by_key(|(_, slot)| **slot);
    for (name, slot) in attributes {
        log::info!("  attribute '{}' -> {}", name, slot);
    }
    let mut textures: Vec<_> = shader.texture_layouts().iter().collect();
    textures.sort_by_key(|(unit, _)| **unit);
    for (unit, sampler) in textures {
        log::info!("  texture unit {} -> '{}'", unit, sampler);
    }
    Ok(())
}

fn render_snapshot(path: &str, config: RendererConfig) -> Result<()> {
    let renderer = SoftwareRenderer::new(config)?.into_shared();
    let mut material = Material::new(renderer.clone());
    material.create()?;

    let vertex = ShaderSource::new(BLIT_VERTEX)?;
    let fragment = ShaderSource::new(BLIT_FRAGMENT)?;
    let unit = fragment
        .texture_layouts()
        .iter()
        .find(|(_, sampler)| sampler.as_str() == "diffuse")
        .map(|(&unit, _)| unit)
        .context("Blit fragment shader declares no 'diffuse' texture layout")?;

    let program = material.program_mut();
    program.attach_shader(SoftwareShader::new(vertex, UniformTable::new())?)?;
    program.attach_shader(SoftwareShader::new(fragment, TextureBlit::new(unit))?)?;
    program.link()?;
    material.bind()?;

    renderer.lock().bind_texture(unit, Arc::new(TextureData::checkerboard(32)));
    material.set_uniform("tint", Vec3::new(1.0, 0.85, 0.6));
    material.upload_uniforms()?;
    let program = material.program_mut();
    program.bind_sampler(unit)?;
    program.draw()?;
    material.unbind()?;

    let frame = renderer.lock().present();
    frame.save_png(path)?;
    material.destroy()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = parse_args(std::env::args().skip(1));
    log::info!(
        "Starting caustic: {} OBJ file(s), {} shader(s), attributes={:?}, snapshot={:?}",
        opts.objs.len(),
        opts.shaders.len(),
        opts.attributes,
        opts.snapshot
    );
    if opts.objs.is_empty() && opts.shaders.is_empty() && opts.snapshot.is_none() {
        bail!("Nothing to do; pass --obj=PATH, --shader=PATH or --snapshot=PATH");
    }

    for path in &opts.objs {
        inspect_obj(path, opts.attributes)?;
    }
    for path in &opts.shaders {
        inspect_shader(path)?;
    }
    if let Some(path) = &opts.snapshot {
        render_snapshot(path, opts.config)
            .with_context(|| format!("Failed to render snapshot to {path}"))?;
    }

    log::info!("Done.");
    Ok(())
}
