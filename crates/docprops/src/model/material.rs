//! Surface material record.

use super::color::Color;

/// Shading parameters of a surface.
///
/// `image` holds an encoded texture blob, `image_path` its source file and
/// `uuid` the identifier of the material library entry it came from. All
/// three are empty for plain colour materials.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub ambient_color: Color,
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub emissive_color: Color,
    pub shininess: f32,
    pub transparency: f32,
    pub image: String,
    pub image_path: String,
    pub uuid: String,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient_color: Color::gray(0.2),
            diffuse_color: Color::gray(0.8),
            specular_color: Color::BLACK,
            emissive_color: Color::BLACK,
            shininess: 0.2,
            transparency: 0.0,
            image: String::new(),
            image_path: String::new(),
            uuid: String::new(),
        }
    }
}

impl Material {
    /// Creates a default material with the given diffuse colour.
    pub fn with_diffuse(color: Color) -> Self {
        Self {
            diffuse_color: color,
            ..Self::default()
        }
    }

    /// Approximate heap and inline size in bytes.
    pub fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.image.len() + self.image_path.len() + self.uuid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let m = Material::default();
        assert_eq!(m.ambient_color, Color::new(0.2, 0.2, 0.2, 1.0));
        assert_eq!(m.diffuse_color, Color::new(0.8, 0.8, 0.8, 1.0));
        assert_eq!(m.specular_color, Color::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(m.emissive_color, Color::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(m.shininess, 0.2);
        assert_eq!(m.transparency, 0.0);
        assert!(m.image.is_empty() && m.image_path.is_empty() && m.uuid.is_empty());
    }

    #[test]
    fn test_with_diffuse() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let m = Material::with_diffuse(red);
        assert_eq!(m.diffuse_color, red);
        assert_eq!(m.ambient_color, Material::default().ambient_color);
    }
}
