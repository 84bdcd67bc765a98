use glam::Vec4;

/// Shading family of a material, selected from the source technique's
/// lighting model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialKind {
    /// Unlit.
    #[default]
    Basic,
    /// Diffuse-only.
    Lambert,
    /// Diffuse + specular.
    Phong,
}

/// Material parameters. `map` carries the diffuse texture's source path
/// opaquely; decoding it is the renderer's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
    pub color: Vec4,
    pub opacity: f32,
    pub transparent: bool,
    pub shininess: Option<f32>,
    pub double_sided: bool,
    pub map: Option<String>,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            opacity: 1.0,
            transparent: false,
            shininess: None,
            double_sided: false,
            map: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    pub kind: MaterialKind,
    pub params: MaterialParams,
}

impl Material {
    #[must_use]
    pub fn new(kind: MaterialKind, params: MaterialParams) -> Self {
        Self { kind, params }
    }
}
