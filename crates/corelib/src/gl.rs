//! Backend-agnostic enums: pipeline stages and API versions.

use std::{fmt, str::FromStr};

use crate::error::CausticError;

/// Pipeline stage a shader runs in. Ordered by pipeline position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderType {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
}

impl ShaderType {
    pub const ALL: [ShaderType; 6] = [
        ShaderType::Vertex,
        ShaderType::TessControl,
        ShaderType::TessEvaluation,
        ShaderType::Geometry,
        ShaderType::Fragment,
        ShaderType::Compute,
    ];

    /// Upper-case token name, as written after `$shader_type:`.
    pub fn name(self) -> &'static str {
        match self {
            ShaderType::Fragment => "FRAGMENT",
            ShaderType::Vertex => "VERTEX",
            ShaderType::Geometry => "GEOMETRY",
            ShaderType::TessControl => "TESS_CONTROL",
            ShaderType::TessEvaluation => "TESS_EVALUATION",
            ShaderType::Compute => "COMPUTE",
        }
    }

    /// Matching OpenGL enum value (`GL_*_SHADER`).
    pub fn gl_constant(self) -> u32 {
        match self {
            ShaderType::Fragment => 0x8B30,
            ShaderType::Vertex => 0x8B31,
            ShaderType::Geometry => 0x8DD9,
            ShaderType::TessControl => 0x8E88,
            ShaderType::TessEvaluation => 0x8E87,
            ShaderType::Compute => 0x91B9,
        }
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderType {
    type Err = CausticError;

    /// Case-insensitive match against [`ShaderType::name`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        ShaderType::ALL
            .into_iter()
            .find(|ty| ty.name() == upper)
            .ok_or_else(|| {
                CausticError::invalid_value(format!("Unknown shader type token value '{s}'"))
            })
    }
}

/// Rendering API level a resource was created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlVersion {
    Gl20,
    Gl21,
    Gl30,
    Gl31,
    Gl32,
    Software,
}

impl GlVersion {
    /// Whether integer vertex attributes can be uploaded without float conversion.
    pub fn supports_integer_attributes(self) -> bool {
        matches!(self, GlVersion::Gl30 | GlVersion::Gl31 | GlVersion::Gl32 | GlVersion::Software)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("vertex".parse::<ShaderType>().unwrap(), ShaderType::Vertex);
        assert_eq!("Fragment".parse::<ShaderType>().unwrap(), ShaderType::Fragment);
        assert_eq!(
            "tess_evaluation".parse::<ShaderType>().unwrap(),
            ShaderType::TessEvaluation
        );
    }

    #[test]
    fn unknown_type_is_configuration_error() {
        let err = "pixel".parse::<ShaderType>().unwrap_err();
        assert!(matches!(err, CausticError::Configuration { .. }));
    }

    #[test]
    fn names_round_trip() {
        for ty in ShaderType::ALL {
            assert_eq!(ty.to_string().parse::<ShaderType>().unwrap(), ty);
        }
    }

    #[test]
    fn gl_constants_match_shader_enums() {
        assert_eq!(ShaderType::Vertex.gl_constant(), 0x8B31);
        assert_eq!(ShaderType::Fragment.gl_constant(), 0x8B30);
        assert_eq!(ShaderType::Compute.gl_constant(), 0x91B9);
        let mut constants: Vec<u32> = ShaderType::ALL.iter().map(|t| t.gl_constant()).collect();
        constants.sort_unstable();
        constants.dedup();
        assert_eq!(constants.len(), ShaderType::ALL.len());
    }

    #[test]
    fn gl20_has_no_integer_attributes() {
        assert!(!GlVersion::Gl20.supports_integer_attributes());
        assert!(!GlVersion::Gl21.supports_integer_attributes());
        assert!(GlVersion::Gl30.supports_integer_attributes());
    }
}
