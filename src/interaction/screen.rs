use crate::assets::{Asset, ColorSpace};
use crate::config::ScreenPatchConfig;
use crate::scene::{MaterialId, Scene};
use glam::Vec3;
use std::sync::Arc;

/// Put a dropped image on both device screens as an emissive map.
///
/// Only textures are handled. Both screen materials must exist, otherwise
/// nothing is touched. Returns whether the materials were changed.
pub fn apply_dropped_texture(
    scene: &mut Scene,
    asset: &mut Asset,
    config: &ScreenPatchConfig,
) -> bool {
    let Asset::Texture(texture) = asset else {
        return false;
    };
    Arc::make_mut(texture).color_space = ColorSpace::Srgb;
    let texture = Arc::clone(&*texture);

    let (Some(primary), Some(secondary)) = (
        screen_material(scene, &config.primary_node),
        screen_material(scene, &config.secondary_node),
    ) else {
        log::warn!(
            "Screen materials {:?} / {:?} not found, ignoring {}",
            config.primary_node,
            config.secondary_node,
            texture.name
        );
        return false;
    };

    if let Some(material) = scene.material_mut(primary) {
        material.color = Vec3::from_array(config.color);
        material.emissive = Vec3::from_array(config.emissive);
        material.roughness = config.roughness;
        material.metalness = config.metalness;
        material.map = None;
        material.emissive_map = Some(Arc::clone(&texture));
        material.set_dirty();
    }
    if let Some(material) = scene.material_mut(secondary) {
        material.emissive_map = Some(Arc::clone(&texture));
        material.set_dirty();
    }
    log::info!("Screens now show {}", texture.name);
    true
}

fn screen_material(scene: &Scene, node_name: &str) -> Option<MaterialId> {
    let node = scene.find_by_name(node_name)?;
    let material = scene.material_of(node)?;
    scene.material(material).map(|_| material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{png_fixture, AssetManager, EnvironmentMap, Texture};
    use crate::interaction::tests::tabletop_scene;

    fn dropped_png() -> Asset {
        let assets = AssetManager::new(&["png".to_string()]);
        assets.import_bytes("wallpaper.png", &png_fixture(2, 2)).unwrap()
    }

    fn screen(scene: &Scene, node: &str) -> MaterialId {
        scene.material_of(scene.find_by_name(node).unwrap()).unwrap()
    }

    #[test]
    fn image_drop_patches_both_screens() {
        let mut scene = tabletop_scene();
        let config = ScreenPatchConfig::default();
        let laptop = screen(&scene, "Object_7");
        let phone = screen(&scene, "xXDHkMplTIDAXLN");
        let placeholder = match dropped_png() {
            Asset::Texture(texture) => texture,
            Asset::Environment(_) => unreachable!(),
        };
        scene.material_mut(laptop).unwrap().map = Some(placeholder);

        let mut asset = dropped_png();
        assert!(apply_dropped_texture(&mut scene, &mut asset, &config));

        let Asset::Texture(texture) = &asset else {
            panic!("Expected texture");
        };
        assert_eq!(texture.color_space, ColorSpace::Srgb);

        let laptop = scene.material(laptop).unwrap();
        assert_eq!(laptop.color, Vec3::ZERO);
        assert_eq!(laptop.emissive, Vec3::ONE);
        assert_eq!(laptop.roughness, 0.2);
        assert_eq!(laptop.metalness, 0.8);
        assert!(laptop.map.is_none());
        assert!(Arc::ptr_eq(laptop.emissive_map.as_ref().unwrap(), texture));
        assert_eq!(laptop.version(), 1);

        let phone = scene.material(phone).unwrap();
        assert!(Arc::ptr_eq(phone.emissive_map.as_ref().unwrap(), texture));
        assert_eq!(phone.color, Vec3::ONE);
        assert_eq!(phone.version(), 1);
    }

    #[test]
    fn non_image_asset_changes_nothing() {
        let mut scene = tabletop_scene();
        let laptop = screen(&scene, "Object_7");
        let mut asset = Asset::Environment(Arc::new(EnvironmentMap {
            name: "studio.hdr".to_string(),
            source_hash: String::new(),
            pixels: image::Rgb32FImage::new(1, 1),
        }));
        assert!(!apply_dropped_texture(
            &mut scene,
            &mut asset,
            &ScreenPatchConfig::default()
        ));
        let laptop = scene.material(laptop).unwrap();
        assert!(laptop.emissive_map.is_none());
        assert_eq!(laptop.version(), 0);
    }

    #[test]
    fn missing_screen_is_all_or_nothing() {
        let mut scene = tabletop_scene();
        let laptop = screen(&scene, "Object_7");
        let config = ScreenPatchConfig {
            secondary_node: "PhoneGlass".to_string(),
            ..ScreenPatchConfig::default()
        };
        let mut asset = Asset::Texture(Arc::new(Texture {
            name: "wallpaper.png".to_string(),
            color_space: ColorSpace::Linear,
            source_hash: String::new(),
            pixels: image::RgbaImage::new(1, 1),
        }));
        assert!(!apply_dropped_texture(&mut scene, &mut asset, &config));

        let laptop = scene.material(laptop).unwrap();
        assert!(laptop.emissive_map.is_none());
        assert_eq!(laptop.color, Vec3::ONE);
        assert_eq!(laptop.version(), 0);
    }

    #[test]
    fn node_without_material_counts_as_missing() {
        let mut scene = tabletop_scene();
        let config = ScreenPatchConfig {
            secondary_node: "iphone".to_string(),
            ..ScreenPatchConfig::default()
        };
        let mut asset = dropped_png();
        assert!(!apply_dropped_texture(&mut scene, &mut asset, &config));
    }
}
