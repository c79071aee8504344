//! Core shared types and errors (renderer-agnostic).

pub use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

pub mod error;
pub mod gl;
pub mod lifecycle;
pub mod rect;

pub use error::{CausticError, CausticResult, ConfigurationKind};
pub use gl::{GlVersion, ShaderType};
pub use lifecycle::Creatable;
pub use rect::Rectangle;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_twice_is_illegal() {
        let mut c = Creatable::new();
        c.create("Program").unwrap();
        assert!(c.check_not_created("Program").is_err());
        let err = c.create("Program").unwrap_err();
        assert_eq!(err.to_string(), "Illegal state: Program has already been created");
    }

    #[test]
    fn destroy_requires_create() {
        let mut c = Creatable::new();
        assert!(c.destroy("Program").is_err());
        c.create("Program").unwrap();
        c.destroy("Program").unwrap();
        assert!(!c.is_created());
        assert!(c.check_created("Program").is_err());
    }

    #[test]
    fn rectangle_contains_edges() {
        let r = Rectangle::new(2, 3, 4, 5);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 7));
        assert!(!r.contains(6, 3));
        assert!(!r.contains(2, 8));
        assert_eq!(r.area(), 20);
        assert_eq!(Rectangle::from_size(4, 4), Rectangle::new(0, 0, 4, 4));
    }
}
