//! Material system
//!
//! A [`Material`] is a shader tag carrying that shader's parameters plus a
//! set of named texture references. Binding turns it into a
//! [`GeometryMaterialInstance`]: a material instance handle from the
//! resource table, resolved [`TextureMaps`], and the originating material.

mod binding;
mod texture_maps;

pub use binding::{bind_material, override_material, update_material_properties};
pub use texture_maps::{GeometryMaterialInstance, TextureBinding, TextureMaps};

use crate::foundation::math::Vec4;
use crate::resources::{ResourceHandle, DEFAULT_NORMAL_MAP, DEFAULT_TEXTURE};
use bitflags::bitflags;
use std::collections::BTreeMap;

/// The fixed set of shaders a material can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingModel {
    /// Full PBR lighting
    DefaultLit,
    /// Flat color, no lighting
    DefaultUnlit,
    /// Debug view encoding normals as color
    Normals,
    /// Debug view encoding depth
    Depth,
}

impl ShadingModel {
    /// Shader name as known to the material catalog
    pub fn shader_name(&self) -> &'static str {
        match self {
            Self::DefaultLit => "defaultLit",
            Self::DefaultUnlit => "defaultUnlit",
            Self::Normals => "normals",
            Self::Depth => "depth",
        }
    }

    /// Texture channels this shader samples
    pub fn texture_channels(&self) -> TextureChannels {
        match self {
            Self::DefaultLit => TextureChannels::all(),
            Self::DefaultUnlit => TextureChannels::ALBEDO | TextureChannels::AMBIENT_OCCLUSION,
            Self::Normals | Self::Depth => TextureChannels::empty(),
        }
    }
}

bitflags! {
    /// Set of texture channels
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureChannels: u16 {
        /// Base color
        const ALBEDO = 1 << 0;
        /// Tangent-space normals
        const NORMAL = 1 << 1;
        /// Ambient occlusion
        const AMBIENT_OCCLUSION = 1 << 2;
        /// Roughness
        const ROUGHNESS = 1 << 3;
        /// Metallic
        const METALLIC = 1 << 4;
        /// Reflectance
        const REFLECTANCE = 1 << 5;
        /// Clear coat strength
        const CLEAR_COAT = 1 << 6;
        /// Clear coat roughness
        const CLEAR_COAT_ROUGHNESS = 1 << 7;
        /// Anisotropy
        const ANISOTROPY = 1 << 8;
    }
}

/// A single texture channel of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureChannel {
    /// Base color
    Albedo,
    /// Tangent-space normals
    Normal,
    /// Ambient occlusion
    AmbientOcclusion,
    /// Roughness
    Roughness,
    /// Metallic
    Metallic,
    /// Reflectance
    Reflectance,
    /// Clear coat strength
    ClearCoat,
    /// Clear coat roughness
    ClearCoatRoughness,
    /// Anisotropy
    Anisotropy,
}

impl TextureChannel {
    /// Every channel, in slot order
    pub const ALL: [TextureChannel; 9] = [
        Self::Albedo,
        Self::Normal,
        Self::AmbientOcclusion,
        Self::Roughness,
        Self::Metallic,
        Self::Reflectance,
        Self::ClearCoat,
        Self::ClearCoatRoughness,
        Self::Anisotropy,
    ];

    /// Slot index within [`TextureMaps`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Flag for this channel
    pub fn flag(self) -> TextureChannels {
        TextureChannels::from_bits_truncate(1 << self.index())
    }

    /// Handle used when the channel has no texture of its own
    pub fn placeholder(self) -> ResourceHandle {
        match self {
            Self::Normal => DEFAULT_NORMAL_MAP,
            _ => DEFAULT_TEXTURE,
        }
    }

    /// Sampler parameter name on the material instance
    pub fn parameter_name(self) -> &'static str {
        match self {
            Self::Albedo => "albedo",
            Self::Normal => "normalMap",
            Self::AmbientOcclusion => "aoMap",
            Self::Roughness => "roughnessMap",
            Self::Metallic => "metallicMap",
            Self::Reflectance => "reflectanceMap",
            Self::ClearCoat => "clearCoatMap",
            Self::ClearCoatRoughness => "clearCoatRoughnessMap",
            Self::Anisotropy => "anisotropyMap",
        }
    }
}

/// Parameters of the lit PBR shader
#[derive(Debug, Clone, PartialEq)]
pub struct LitParameters {
    /// Base color (linear RGBA)
    pub base_color: Vec4,
    /// Metallic factor (0.0 = dielectric, 1.0 = metallic)
    pub metallic: f32,
    /// Roughness factor (0.0 = mirror, 1.0 = completely rough)
    pub roughness: f32,
    /// Specular reflectance at normal incidence
    pub reflectance: f32,
    /// Clear coat layer strength
    pub clear_coat: f32,
    /// Clear coat layer roughness
    pub clear_coat_roughness: f32,
    /// Anisotropy strength
    pub anisotropy: f32,
    /// Point size for point primitives
    pub point_size: f32,
}

impl Default for LitParameters {
    fn default() -> Self {
        Self {
            base_color: Vec4::new(0.9, 0.9, 0.9, 1.0),
            metallic: 0.0,
            roughness: 0.7,
            reflectance: 0.5,
            clear_coat: 0.0,
            clear_coat_roughness: 0.0,
            anisotropy: 0.0,
            point_size: 3.0,
        }
    }
}

/// Parameters of the unlit shader
#[derive(Debug, Clone, PartialEq)]
pub struct UnlitParameters {
    /// Base color (linear RGBA)
    pub base_color: Vec4,
    /// Point size for point primitives
    pub point_size: f32,
}

impl Default for UnlitParameters {
    fn default() -> Self {
        Self {
            base_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            point_size: 3.0,
        }
    }
}

/// Parameters of the normal and depth visualization shaders
#[derive(Debug, Clone, PartialEq)]
pub struct DebugParameters {
    /// Point size for point primitives
    pub point_size: f32,
}

impl Default for DebugParameters {
    fn default() -> Self {
        Self { point_size: 3.0 }
    }
}

/// Shader selection together with the parameters that shader understands
#[derive(Debug, Clone, PartialEq)]
pub enum Shader {
    /// Lit PBR shading
    DefaultLit(LitParameters),
    /// Unlit shading
    DefaultUnlit(UnlitParameters),
    /// Normal visualization
    Normals(DebugParameters),
    /// Depth visualization
    Depth(DebugParameters),
}

impl Shader {
    /// Tag of this shader
    pub fn shading_model(&self) -> ShadingModel {
        match self {
            Self::DefaultLit(_) => ShadingModel::DefaultLit,
            Self::DefaultUnlit(_) => ShadingModel::DefaultUnlit,
            Self::Normals(_) => ShadingModel::Normals,
            Self::Depth(_) => ShadingModel::Depth,
        }
    }
}

/// Named texture references per channel
///
/// Names are resolved against the resource table when a material is bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureRefs(BTreeMap<TextureChannel, String>);

impl TextureRefs {
    /// No textures referenced
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference `name` for `channel`
    pub fn set(&mut self, channel: TextureChannel, name: impl Into<String>) {
        self.0.insert(channel, name.into());
    }

    /// Name referenced for `channel`
    pub fn get(&self, channel: TextureChannel) -> Option<&str> {
        self.0.get(&channel).map(String::as_str)
    }

    /// Number of referenced channels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no channel is referenced
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Material description: shader, its parameters, and texture references
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Shader and parameters
    pub shader: Shader,
    /// Texture references by channel
    pub textures: TextureRefs,
    /// Optional name for debugging
    pub name: Option<String>,
}

impl Material {
    /// Material using `shader` with no textures
    pub fn new(shader: Shader) -> Self {
        Self {
            shader,
            textures: TextureRefs::new(),
            name: None,
        }
    }

    /// Lit material
    pub fn lit(params: LitParameters) -> Self {
        Self::new(Shader::DefaultLit(params))
    }

    /// Unlit material
    pub fn unlit(params: UnlitParameters) -> Self {
        Self::new(Shader::DefaultUnlit(params))
    }

    /// Normal visualization material
    pub fn normals() -> Self {
        Self::new(Shader::Normals(DebugParameters::default()))
    }

    /// Depth visualization material
    pub fn depth() -> Self {
        Self::new(Shader::Depth(DebugParameters::default()))
    }

    /// Set the material name for debugging
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reference a texture by name for `channel`
    pub fn with_texture(mut self, channel: TextureChannel, name: impl Into<String>) -> Self {
        self.textures.set(channel, name);
        self
    }

    /// Shader tag of this material
    pub fn shading_model(&self) -> ShadingModel {
        self.shader.shading_model()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::lit(LitParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_flags_match_slots() {
        for channel in TextureChannel::ALL {
            assert_eq!(channel.flag().bits(), 1 << channel.index());
        }
        assert_eq!(TextureChannels::all().bits().count_ones() as usize, TextureChannel::ALL.len());
    }

    #[test]
    fn test_shader_channels() {
        let unlit = ShadingModel::DefaultUnlit.texture_channels();
        assert!(unlit.contains(TextureChannel::Albedo.flag()));
        assert!(unlit.contains(TextureChannel::AmbientOcclusion.flag()));
        assert!(!unlit.contains(TextureChannel::Normal.flag()));
        assert!(ShadingModel::Depth.texture_channels().is_empty());
    }

    #[test]
    fn test_normal_placeholder() {
        assert_eq!(TextureChannel::Normal.placeholder(), DEFAULT_NORMAL_MAP);
        assert_eq!(TextureChannel::Albedo.placeholder(), DEFAULT_TEXTURE);
    }

    #[test]
    fn test_material_builder() {
        let material = Material::default()
            .with_name("brick")
            .with_texture(TextureChannel::Albedo, "brick_albedo");
        assert_eq!(material.shading_model(), ShadingModel::DefaultLit);
        assert_eq!(material.textures.get(TextureChannel::Albedo), Some("brick_albedo"));
        assert_eq!(material.textures.get(TextureChannel::Normal), None);
        assert_eq!(Material::depth().shading_model(), ShadingModel::Depth);
    }
}
