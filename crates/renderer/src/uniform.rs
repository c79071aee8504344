//! Uniform values forwarded to shaders.

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    FloatArray(Vec<f32>),
    Vec2(Vec2),
    Vec2Array(Vec<Vec2>),
    Vec3(Vec3),
    Vec3Array(Vec<Vec3>),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    /// GLSL spelling of the value's type.
    pub fn glsl_type(&self) -> &'static str {
        match self {
            UniformValue::Bool(_) => "bool",
            UniformValue::Int(_) => "int",
            UniformValue::Float(_) | UniformValue::FloatArray(_) => "float",
            UniformValue::Vec2(_) | UniformValue::Vec2Array(_) => "vec2",
            UniformValue::Vec3(_) | UniformValue::Vec3Array(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            UniformValue::FloatArray(_) | UniformValue::Vec2Array(_) | UniformValue::Vec3Array(_)
        )
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    f32 => Float,
    Vec<f32> => FloatArray,
    Vec2 => Vec2,
    Vec<Vec2> => Vec2Array,
    Vec3 => Vec3,
    Vec<Vec3> => Vec3Array,
    Vec4 => Vec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

impl From<&[f32]> for UniformValue {
    fn from(value: &[f32]) -> Self {
        UniformValue::FloatArray(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_matching_variant() {
        assert_eq!(UniformValue::from(true), UniformValue::Bool(true));
        assert_eq!(UniformValue::from(Vec3::X).glsl_type(), "vec3");
        assert_eq!(UniformValue::from(Mat4::IDENTITY).glsl_type(), "mat4");
        let floats: &[f32] = &[1.0, 2.0];
        let value = UniformValue::from(floats);
        assert!(value.is_array());
        assert_eq!(value.glsl_type(), "float");
    }
}
