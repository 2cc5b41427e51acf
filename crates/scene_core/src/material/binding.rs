//! Material binding engine
//!
//! Turns a [`Material`] into a bound [`GeometryMaterialInstance`] and pushes
//! the parameters of its shader. Each shader has its own update path and
//! only touches the parameters and samplers it understands.

use super::{
    DebugParameters, GeometryMaterialInstance, LitParameters, Material, Shader, TextureChannel,
    TextureMaps, UnlitParameters,
};
use crate::resources::{
    lock_table, OwnedHandle, ParameterValue, ResourceDescriptor, ResourceHandle, ResourceResult,
    ResourceTable, SharedResources,
};

/// Create a material instance for `material` and resolve its textures
pub fn bind_material(
    table: &SharedResources,
    material: &Material,
) -> ResourceResult<GeometryMaterialInstance> {
    let shading_model = material.shading_model();
    let instance = OwnedHandle::acquire(
        table,
        ResourceDescriptor::MaterialInstance { shading_model },
    )?;
    let maps = TextureMaps::resolve(table, &material.textures, shading_model.texture_channels());

    let bound = GeometryMaterialInstance {
        maps,
        properties: material.clone(),
        instance,
    };
    update_material_properties(table, &bound)?;

    log::debug!(
        "Bound {} material instance {}",
        shading_model.shader_name(),
        bound.instance_handle()
    );
    Ok(bound)
}

/// Re-bind an existing material instance to `material`
///
/// A shader change releases the old instance before the new one is created;
/// an instance the table evicted is recreated as well. With `shader_only`,
/// the texture maps are kept (evicted textures fall back to placeholders)
/// and only the shader and its parameters are replaced; otherwise the maps
/// are rebuilt.
pub fn override_material(
    table: &SharedResources,
    bound: &mut GeometryMaterialInstance,
    material: &Material,
    shader_only: bool,
) -> ResourceResult<()> {
    let shading_model = material.shading_model();
    let resident = lock_table(table).contains(bound.instance_handle());
    let shader_changed = bound.properties.shading_model() != shading_model;
    if shader_changed || !bound.instance.is_live() || !resident {
        if !resident {
            log::warn!("Material instance {} was evicted, recreating", bound.instance_handle());
        }
        bound
            .instance
            .rebind(ResourceDescriptor::MaterialInstance { shading_model })?;
    }

    if shader_only {
        bound.maps.revalidate(table);
        bound.properties.shader = material.shader.clone();
    } else {
        let channels = shading_model.texture_channels();
        let maps = TextureMaps::resolve(table, &material.textures, channels);
        // Old maps release their textures here
        bound.maps = maps;
        bound.properties = material.clone();
    }

    update_material_properties(table, bound)
}

/// Push every shader parameter of `bound` into its material instance
pub fn update_material_properties(
    table: &SharedResources,
    bound: &GeometryMaterialInstance,
) -> ResourceResult<()> {
    let mut table = lock_table(table);
    let instance = bound.instance_handle();
    match &bound.properties.shader {
        Shader::DefaultLit(params) => {
            update_default_lit(&mut *table, instance, params, &bound.maps)
        }
        Shader::DefaultUnlit(params) => {
            update_default_unlit(&mut *table, instance, params, &bound.maps)
        }
        Shader::Normals(params) => update_normal_shader(&mut *table, instance, params),
        Shader::Depth(params) => update_depth_shader(&mut *table, instance, params),
    }
}

fn push_samplers(
    table: &mut dyn ResourceTable,
    instance: ResourceHandle,
    maps: &TextureMaps,
    channels: &[TextureChannel],
) -> ResourceResult<()> {
    for &channel in channels {
        table.set_parameter(
            instance,
            channel.parameter_name(),
            ParameterValue::Texture(maps.get(channel)),
        )?;
    }
    Ok(())
}

fn update_default_lit(
    table: &mut dyn ResourceTable,
    instance: ResourceHandle,
    params: &LitParameters,
    maps: &TextureMaps,
) -> ResourceResult<()> {
    table.set_parameter(instance, "baseColor", ParameterValue::Float4(params.base_color))?;
    table.set_parameter(instance, "baseMetallic", ParameterValue::Float(params.metallic))?;
    table.set_parameter(instance, "baseRoughness", ParameterValue::Float(params.roughness))?;
    table.set_parameter(instance, "reflectance", ParameterValue::Float(params.reflectance))?;
    table.set_parameter(instance, "clearCoat", ParameterValue::Float(params.clear_coat))?;
    table.set_parameter(
        instance,
        "clearCoatRoughness",
        ParameterValue::Float(params.clear_coat_roughness),
    )?;
    table.set_parameter(instance, "anisotropy", ParameterValue::Float(params.anisotropy))?;
    table.set_parameter(instance, "pointSize", ParameterValue::Float(params.point_size))?;
    push_samplers(table, instance, maps, &TextureChannel::ALL)
}

fn update_default_unlit(
    table: &mut dyn ResourceTable,
    instance: ResourceHandle,
    params: &UnlitParameters,
    maps: &TextureMaps,
) -> ResourceResult<()> {
    table.set_parameter(instance, "baseColor", ParameterValue::Float4(params.base_color))?;
    table.set_parameter(instance, "pointSize", ParameterValue::Float(params.point_size))?;
    push_samplers(
        table,
        instance,
        maps,
        &[TextureChannel::Albedo, TextureChannel::AmbientOcclusion],
    )
}

fn update_normal_shader(
    table: &mut dyn ResourceTable,
    instance: ResourceHandle,
    params: &DebugParameters,
) -> ResourceResult<()> {
    table.set_parameter(instance, "pointSize", ParameterValue::Float(params.point_size))
}

fn update_depth_shader(
    table: &mut dyn ResourceTable,
    instance: ResourceHandle,
    params: &DebugParameters,
) -> ResourceResult<()> {
    table.set_parameter(instance, "pointSize", ParameterValue::Float(params.point_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use crate::material::{ShadingModel, UnlitParameters};
    use crate::resources::{share, ResourceManager, DEFAULT_NORMAL_MAP, DEFAULT_TEXTURE};

    fn setup() -> (std::sync::Arc<std::sync::Mutex<ResourceManager>>, SharedResources) {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        (table, shared)
    }

    #[test]
    fn test_bind_lit_pushes_parameters() {
        let (table, shared) = setup();
        let albedo = table.lock().unwrap().register_texture("albedo").unwrap();
        let material = Material::lit(LitParameters {
            roughness: 0.2,
            ..Default::default()
        })
        .with_texture(TextureChannel::Albedo, "albedo");

        let bound = bind_material(&shared, &material).unwrap();
        let mi = bound.instance_handle();
        let t = table.lock().unwrap();
        assert_eq!(t.shading_model(mi), Some(ShadingModel::DefaultLit));
        assert_eq!(t.parameter(mi, "baseRoughness"), Some(ParameterValue::Float(0.2)));
        assert_eq!(t.parameter(mi, "albedo"), Some(ParameterValue::Texture(albedo)));
        assert_eq!(t.parameter(mi, "normalMap"), Some(ParameterValue::Texture(DEFAULT_NORMAL_MAP)));
    }

    #[test]
    fn test_unlit_ignores_pbr_channels() {
        let (table, shared) = setup();
        table.lock().unwrap().register_texture("n").unwrap();
        let material = Material::unlit(UnlitParameters {
            base_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            ..Default::default()
        })
        .with_texture(TextureChannel::Normal, "n");

        let bound = bind_material(&shared, &material).unwrap();
        assert_eq!(bound.maps.get(TextureChannel::Normal), DEFAULT_NORMAL_MAP);
        let t = table.lock().unwrap();
        assert_eq!(t.parameter(bound.instance_handle(), "normalMap"), None);
        assert_eq!(
            t.parameter(bound.instance_handle(), "baseColor"),
            Some(ParameterValue::Float4(Vec4::new(1.0, 0.0, 0.0, 1.0)))
        );
    }

    #[test]
    fn test_missing_texture_falls_back() {
        let (_table, shared) = setup();
        let material = Material::default().with_texture(TextureChannel::Albedo, "nope");
        let bound = bind_material(&shared, &material).unwrap();
        assert_eq!(bound.maps.get(TextureChannel::Albedo), DEFAULT_TEXTURE);
    }

    #[test]
    fn test_shader_only_override_keeps_maps() {
        let (table, shared) = setup();
        table.lock().unwrap().register_texture("albedo").unwrap();
        let material = Material::default().with_texture(TextureChannel::Albedo, "albedo");
        let mut bound = bind_material(&shared, &material).unwrap();
        let maps_before = bound.maps.handles();
        let old_instance = bound.instance_handle();

        override_material(&shared, &mut bound, &Material::depth(), true).unwrap();

        assert_eq!(bound.maps.handles(), maps_before);
        assert_eq!(bound.properties.shading_model(), ShadingModel::Depth);
        assert_ne!(bound.instance_handle(), old_instance);
        let t = table.lock().unwrap();
        assert!(!t.contains(old_instance));
        assert_eq!(t.shading_model(bound.instance_handle()), Some(ShadingModel::Depth));
    }

    #[test]
    fn test_full_override_rebuilds_maps() {
        let (table, shared) = setup();
        let first = table.lock().unwrap().register_texture("first").unwrap();
        let second = table.lock().unwrap().register_texture("second").unwrap();
        let mut bound = bind_material(
            &shared,
            &Material::default().with_texture(TextureChannel::Albedo, "first"),
        )
        .unwrap();
        let same_instance = bound.instance_handle();

        override_material(
            &shared,
            &mut bound,
            &Material::default().with_texture(TextureChannel::Albedo, "second"),
            false,
        )
        .unwrap();

        assert_eq!(bound.maps.get(TextureChannel::Albedo), second);
        // Same shader, instance reused
        assert_eq!(bound.instance_handle(), same_instance);
        let t = table.lock().unwrap();
        assert_eq!(t.ref_count(first), Some(1));
        assert_eq!(t.ref_count(second), Some(2));
    }

    #[test]
    fn test_override_recreates_evicted_instance() {
        let (table, shared) = setup();
        let mut bound = bind_material(&shared, &Material::default()).unwrap();
        let evicted = bound.instance_handle();
        assert!(table.lock().unwrap().evict(evicted));

        override_material(&shared, &mut bound, &Material::default(), true).unwrap();

        assert_ne!(bound.instance_handle(), evicted);
        let t = table.lock().unwrap();
        assert_eq!(t.shading_model(bound.instance_handle()), Some(ShadingModel::DefaultLit));
        assert_eq!(
            t.parameter(bound.instance_handle(), "baseRoughness"),
            Some(ParameterValue::Float(LitParameters::default().roughness))
        );
    }

    #[test]
    fn test_shader_only_override_drops_evicted_texture() {
        let (table, shared) = setup();
        let albedo = table.lock().unwrap().register_texture("albedo").unwrap();
        let material = Material::default().with_texture(TextureChannel::Albedo, "albedo");
        let mut bound = bind_material(&shared, &material).unwrap();
        assert!(table.lock().unwrap().evict(albedo));

        let unlit = Material::unlit(UnlitParameters::default());
        override_material(&shared, &mut bound, &unlit, true).unwrap();

        assert_eq!(bound.maps.get(TextureChannel::Albedo), DEFAULT_TEXTURE);
        let t = table.lock().unwrap();
        assert_eq!(
            t.parameter(bound.instance_handle(), "albedo"),
            Some(ParameterValue::Texture(DEFAULT_TEXTURE))
        );
    }
}
