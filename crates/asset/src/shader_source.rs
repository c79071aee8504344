//! Shader source with embedded metadata tokens.
//!
//! Tokens let a shader declare things the host would otherwise have to
//! configure in code: its pipeline stage and the fixed slots of its vertex
//! attributes and samplers (standing in for `layout(location = x)` and
//! `layout(binding = x)` on API levels that lack them).
//!
//! ```text
//! $shader_type: VERTEX
//! $attrib_layout: position = 0
//! $texture_layout: diffuse = 1
//! ```

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::Context;
use corelib::{CausticError, CausticResult, ShaderType};

const TOKEN_SYMBOL: char = '$';
const SHADER_TYPE_TOKEN: &str = "shader_type";
const ATTRIBUTE_LAYOUT_TOKEN: &str = "attrib_layout";
const TEXTURE_LAYOUT_TOKEN: &str = "texture_layout";

/// Raw shader text plus the metadata parsed out of it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderSource {
    source: String,
    shader_type: Option<ShaderType>,
    attribute_layouts: HashMap<String, u32>,
    texture_layouts: HashMap<u32, String>,
}

impl ShaderSource {
    /// Build from shader text, parsing tokens immediately.
    pub fn new(source: impl Into<String>) -> CausticResult<Self> {
        let mut shader = Self {
            source: source.into(),
            ..Self::default()
        };
        shader.parse()?;
        Ok(shader)
    }

    /// Read the whole source from `reader`. Lines are re-joined with `\n`.
    pub fn from_reader<R: BufRead>(reader: R) -> CausticResult<Self> {
        let mut text = String::new();
        for line in reader.lines() {
            let line = line.map_err(|e| {
                CausticError::InvalidArgument(format!("Unreadable shader source: {e}"))
            })?;
            text.push_str(&line);
            text.push('\n');
        }
        Self::new(text)
    }

    /// Load a shader source file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open shader source: {}", path.display()))?;
        let shader = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse shader source: {}", path.display()))?;
        log::info!(
            "Loaded shader source {:?} (type={:?}, {} attribute layouts, {} texture layouts)",
            path,
            shader.shader_type,
            shader.attribute_layouts.len(),
            shader.texture_layouts.len()
        );
        Ok(shader)
    }

    fn parse(&mut self) -> CausticResult<()> {
        for line in self.source.split('\n') {
            let mut from = 0;
            while let Some(offset) = line[from..].find(TOKEN_SYMBOL) {
                let start = from + offset + TOKEN_SYMBOL.len_utf8();
                let Some((token, end)) = match_token(line, start) else {
                    from = start;
                    continue;
                };
                from = end;
                match token {
                    Token::ShaderType(value) => {
                        self.shader_type = Some(value.parse()?);
                    }
                    Token::AttributeLayout { name, slot } => {
                        self.attribute_layouts.insert(name.to_owned(), parse_slot(slot)?);
                    }
                    Token::TextureLayout { sampler, unit } => {
                        self.texture_layouts.insert(parse_slot(unit)?, sampler.to_owned());
                    }
                }
            }
        }
        log::debug!(
            "Parsed shader tokens: type={:?}, attributes={:?}, textures={:?}",
            self.shader_type,
            self.attribute_layouts,
            self.texture_layouts
        );
        Ok(())
    }

    /// `true` once the shader type is known, either from a token or set by hand.
    pub fn is_complete(&self) -> bool {
        self.shader_type.is_some()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn shader_type(&self) -> Option<ShaderType> {
        self.shader_type
    }

    /// Override the shader type, e.g. for sources without a `$shader_type` token.
    pub fn set_shader_type(&mut self, shader_type: ShaderType) {
        self.shader_type = Some(shader_type);
    }

    /// Attribute name to binding slot.
    pub fn attribute_layouts(&self) -> &HashMap<String, u32> {
        &self.attribute_layouts
    }

    /// Texture unit to sampler name.
    pub fn texture_layouts(&self) -> &HashMap<u32, String> {
        &self.texture_layouts
    }

    pub fn attribute_layout(&self, name: &str) -> Option<u32> {
        self.attribute_layouts.get(name).copied()
    }

    pub fn texture_layout(&self, unit: u32) -> Option<&str> {
        self.texture_layouts.get(&unit).map(String::as_str)
    }

    pub fn set_attribute_layout(&mut self, attribute: impl Into<String>, slot: u32) {
        self.attribute_layouts.insert(attribute.into(), slot);
    }

    pub fn set_texture_layout(&mut self, unit: u32, sampler: impl Into<String>) {
        self.texture_layouts.insert(unit, sampler.into());
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    ShaderType(&'a str),
    AttributeLayout { name: &'a str, slot: &'a str },
    TextureLayout { sampler: &'a str, unit: &'a str },
}

/// Try to read a token starting right after a `$`. Returns the token and the
/// byte offset just past it.
fn match_token(line: &str, start: usize) -> Option<(Token<'_>, usize)> {
    let mut cur = Cursor { line, pos: start };
    if cur.eat(SHADER_TYPE_TOKEN) {
        cur.separator(b':')?;
        let value = cur.take_while(is_word)?;
        return Some((Token::ShaderType(value), cur.pos));
    }

    let is_attribute = if cur.eat(ATTRIBUTE_LAYOUT_TOKEN) {
        true
    } else if cur.eat(TEXTURE_LAYOUT_TOKEN) {
        false
    } else {
        return None;
    };
    cur.separator(b':')?;
    let name = cur.take_while(is_word)?;
    cur.separator(b'=')?;
    let number = cur.take_while(|b| b.is_ascii_digit())?;

    let token = if is_attribute {
        Token::AttributeLayout { name, slot: number }
    } else {
        Token::TextureLayout {
            sampler: name,
            unit: number,
        }
    };
    Some((token, cur.pos))
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn parse_slot(digits: &str) -> CausticResult<u32> {
    digits
        .parse()
        .map_err(|_| CausticError::invalid_value(format!("Layout index '{digits}' is out of range")))
}

struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a [u8] {
        &self.line.as_bytes()[self.pos..]
    }

    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Spaces, `sep`, spaces.
    fn separator(&mut self, sep: u8) -> Option<()> {
        self.skip_spaces();
        if self.rest().first() != Some(&sep) {
            return None;
        }
        self.pos += 1;
        self.skip_spaces();
        Some(())
    }

    fn skip_spaces(&mut self) {
        let n = self.rest().iter().take_while(|&&b| b == b' ').count();
        self.pos += n;
    }

    /// Non-empty run of ASCII bytes matching `pred`.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> Option<&'a str> {
        let n = self.rest().iter().take_while(|&&b| pred(b)).count();
        if n == 0 {
            return None;
        }
        let start = self.pos;
        self.pos += n;
        Some(&self.line[start..self.pos])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor as IoCursor;

    use super::*;

    const VERTEX_SHADER: &str = "\
// $shader_type: vertex
// $attrib_layout: position = 0
// $attrib_layout: normal = 1
#version 120
attribute vec3 position;
attribute vec3 normal;
";

    #[test]
    fn parses_type_and_attributes() {
        let shader = ShaderSource::new(VERTEX_SHADER).unwrap();
        assert!(shader.is_complete());
        assert_eq!(shader.shader_type(), Some(ShaderType::Vertex));
        assert_eq!(shader.attribute_layouts().len(), 2);
        assert_eq!(shader.attribute_layout("position"), Some(0));
        assert_eq!(shader.attribute_layout("normal"), Some(1));
        assert!(shader.texture_layouts().is_empty());
        assert_eq!(shader.source(), VERTEX_SHADER);
    }

    #[test]
    fn no_type_token_is_incomplete() {
        let shader = ShaderSource::new("void main() {}\n").unwrap();
        assert!(!shader.is_complete());
        assert_eq!(shader.shader_type(), None);
    }

    #[test]
    fn unknown_type_fails_with_configuration_error() {
        let err = ShaderSource::new("$shader_type: pixel").unwrap_err();
        assert!(matches!(err, CausticError::Configuration { .. }));
    }

    #[test]
    fn last_type_token_wins() {
        let shader =
            ShaderSource::new("$shader_type: vertex $shader_type: geometry\n$shader_type:FRAGMENT")
                .unwrap();
        assert_eq!(shader.shader_type(), Some(ShaderType::Fragment));
    }

    #[test]
    fn texture_layouts_keyed_by_unit() {
        let shader = ShaderSource::new(
            "$texture_layout:diffuse=0\n$texture_layout : normals = 3\n$shader_type: fragment",
        )
        .unwrap();
        assert_eq!(shader.texture_layout(0), Some("diffuse"));
        assert_eq!(shader.texture_layout(3), Some("normals"));
        assert_eq!(shader.texture_layout(1), None);
    }

    #[test]
    fn duplicate_layouts_keep_last_value() {
        let shader = ShaderSource::new(
            "$attrib_layout: color = 2\n$attrib_layout: color = 5\n\
             $texture_layout: a = 1 $texture_layout: b = 1",
        )
        .unwrap();
        assert_eq!(shader.attribute_layout("color"), Some(5));
        assert_eq!(shader.texture_layouts().len(), 1);
        assert_eq!(shader.texture_layout(1), Some("b"));
    }

    #[test]
    fn layout_order_does_not_matter() {
        let a = ShaderSource::new("$attrib_layout: a = 0\n$attrib_layout: b = 1").unwrap();
        let b = ShaderSource::new("$attrib_layout: b = 1\n$attrib_layout: a = 0").unwrap();
        assert_eq!(a.attribute_layouts(), b.attribute_layouts());
    }

    #[test]
    fn malformed_tokens_are_ignored() {
        let shader = ShaderSource::new(
            "$shader_type:\n$attrib_layout: pos = x\n$attrib_layout pos = 1\n$$attrib_layout: uv=4\n\t$shader_typo: vertex",
        )
        .unwrap();
        assert!(!shader.is_complete());
        assert_eq!(shader.attribute_layouts().len(), 1);
        assert_eq!(shader.attribute_layout("uv"), Some(4));
    }

    #[test]
    fn only_spaces_are_tolerated_around_separators() {
        let shader = ShaderSource::new("$attrib_layout:\tpos = 1").unwrap();
        assert!(shader.attribute_layouts().is_empty());
    }

    #[test]
    fn oversized_slot_is_rejected() {
        let err = ShaderSource::new("$attrib_layout: pos = 99999999999").unwrap_err();
        assert!(matches!(err, CausticError::Configuration { .. }));
    }

    #[test]
    fn setters_override_parsed_metadata() {
        let mut shader = ShaderSource::new("$attrib_layout: pos = 0").unwrap();
        shader.set_shader_type(ShaderType::Vertex);
        shader.set_attribute_layout("pos", 7);
        shader.set_texture_layout(2, "shadow");
        assert!(shader.is_complete());
        assert_eq!(shader.attribute_layout("pos"), Some(7));
        assert_eq!(shader.texture_layout(2), Some("shadow"));
    }

    #[test]
    fn reader_rejoins_lines() {
        let shader =
            ShaderSource::from_reader(IoCursor::new("$shader_type: geometry\r\nvoid main() {}")).unwrap();
        assert_eq!(shader.shader_type(), Some(ShaderType::Geometry));
        assert_eq!(shader.source(), "$shader_type: geometry\nvoid main() {}\n");
    }

    #[test]
    fn unreadable_reader_is_invalid_argument() {
        let bytes: &[u8] = &[0x24, 0xff, 0xfe, b'\n'];
        let err = ShaderSource::from_reader(IoCursor::new(bytes)).unwrap_err();
        assert!(matches!(err, CausticError::InvalidArgument(_)));
    }

    #[test]
    fn path_round_trip() {
        let path = std::env::temp_dir().join(format!("caustic-shader-{}.vert", std::process::id()));
        std::fs::write(&path, VERTEX_SHADER).unwrap();
        let shader = ShaderSource::from_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(shader.source(), VERTEX_SHADER);
        assert_eq!(shader.shader_type(), Some(ShaderType::Vertex));
        assert_eq!(shader.attribute_layout("normal"), Some(1));

        assert!(ShaderSource::from_path(&path).is_err());
    }
}
