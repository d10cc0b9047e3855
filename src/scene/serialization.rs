use crate::scene::{Aabb, CameraView, Material, NodeId, Scene, Transform};
use glam::Vec3;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node {node:?} references unknown material {material:?}")]
    UnknownMaterial { node: String, material: String },
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Authored transform - matches what the scene editor exports.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransformData {
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation_deg: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl From<&TransformData> for Transform {
    fn from(data: &TransformData) -> Self {
        Transform::from_euler_deg(data.position, data.rotation_deg, data.scale)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundsData {
    pub center: [f32; 3],
    pub extent: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MaterialData {
    pub name: String,
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeData {
    pub name: String,
    #[serde(default)]
    pub transform: TransformData,
    /// Named target transforms the animation service can move this node to.
    #[serde(default)]
    pub poses: BTreeMap<String, TransformData>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub bounds: Option<BoundsData>,
    #[serde(default)]
    pub children: Vec<NodeData>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    pub materials: Vec<MaterialData>,
    pub nodes: Vec<NodeData>,
    pub views: BTreeMap<String, CameraView>,
}

pub fn load_scene_from_file(path: &Path) -> Result<Scene> {
    let json = std::fs::read_to_string(path)?;
    let document: SceneDocument = serde_json::from_str(&json)?;
    let scene = build_scene(&document)?;
    if scene.is_empty() {
        log::warn!("Scene {:?} has no nodes", path);
    }
    log::info!(
        "Loaded scene {:?}: {} nodes, views {:?}",
        path,
        scene.len(),
        scene.view_names()
    );
    Ok(scene)
}

pub fn build_scene(document: &SceneDocument) -> Result<Scene> {
    let mut scene = Scene::new();
    for data in &document.materials {
        let mut material = Material::new(data.name.clone());
        material.color = Vec3::from_array(data.color);
        material.emissive = Vec3::from_array(data.emissive);
        material.roughness = data.roughness;
        material.metalness = data.metalness;
        scene.add_material(material);
    }
    for node in &document.nodes {
        add_node_recursive(&mut scene, node, None)?;
    }
    for (name, view) in &document.views {
        scene.set_view(name.clone(), *view);
    }
    Ok(scene)
}

fn add_node_recursive(scene: &mut Scene, data: &NodeData, parent: Option<NodeId>) -> Result<()> {
    let material = match &data.material {
        Some(name) => Some(scene.find_material(name).ok_or_else(|| {
            SerializationError::UnknownMaterial {
                node: data.name.clone(),
                material: name.clone(),
            }
        })?),
        None => None,
    };
    let id = scene.add_node(data.name.clone(), parent, Transform::from(&data.transform));
    if let Some(node) = scene.node_mut(id) {
        node.material = material;
        node.bounds = data.bounds.as_ref().map(|bounds| {
            Aabb::from_center_extent(
                Vec3::from_array(bounds.center),
                Vec3::from_array(bounds.extent),
            )
        });
        node.poses = data
            .poses
            .iter()
            .map(|(name, pose)| (name.clone(), Transform::from(pose)))
            .collect();
    }
    for child in &data.children {
        add_node_recursive(scene, child, Some(id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "materials": [
            { "name": "Screen", "roughness": 0.5 }
        ],
        "nodes": [
            {
                "name": "devices",
                "children": [
                    {
                        "name": "macbook",
                        "transform": { "position": [1.0, 0.0, 0.0] },
                        "children": [
                            {
                                "name": "Bevels_2",
                                "poses": {
                                    "closed": { "rotation_deg": [90.0, 0.0, 0.0] },
                                    "open": {}
                                },
                                "children": [
                                    {
                                        "name": "Object_7",
                                        "material": "Screen",
                                        "bounds": { "center": [0.0, 0.0, 0.0], "extent": [0.5, 0.5, 0.01] }
                                    }
                                ]
                            }
                        ]
                    }
                ]
            }
        ],
        "views": {
            "front": { "position": [0.0, 1.0, 5.0], "target": [0.0, 0.0, 0.0] }
        }
    }"#;

    #[test]
    fn test_nested_document_builds_hierarchy() {
        let document: SceneDocument = serde_json::from_str(DOCUMENT).unwrap();
        let scene = build_scene(&document).unwrap();
        assert_eq!(scene.len(), 4);

        let laptop = scene.find_by_name("macbook").unwrap();
        let lid = scene.find_by_name("Bevels_2").unwrap();
        let screen = scene.find_by_name("Object_7").unwrap();
        assert_eq!(scene.parent(lid), Some(laptop));
        assert!(scene.is_ancestor(laptop, screen));

        let lid_node = scene.node(lid).unwrap();
        assert_eq!(lid_node.poses.len(), 2);
        assert!(lid_node.pose("open").unwrap().abs_diff_eq(&Transform::IDENTITY, 1e-6));

        let material = scene.material_of(screen).unwrap();
        assert_eq!(scene.material(material).unwrap().roughness, 0.5);
        assert_eq!(scene.material(material).unwrap().color, Vec3::ONE);
        assert!(scene.world_bounds(screen).is_some());

        let front = scene.view("front").unwrap();
        assert_eq!(front.fov_deg, 45.0);
        assert_eq!(front.position, Vec3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        let document = SceneDocument {
            nodes: vec![NodeData {
                name: "Object_7".to_string(),
                transform: TransformData::default(),
                poses: BTreeMap::new(),
                material: Some("Missing".to_string()),
                bounds: None,
                children: Vec::new(),
            }],
            ..SceneDocument::default()
        };
        match build_scene(&document) {
            Err(SerializationError::UnknownMaterial { node, material }) => {
                assert_eq!(node, "Object_7");
                assert_eq!(material, "Missing");
            }
            other => panic!("Expected UnknownMaterial, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_load_scene_from_file() {
        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "tabletop_scene_{}_{}.json",
            std::process::id(),
            nonce
        ));
        std::fs::write(&path, DOCUMENT).unwrap();

        let scene = load_scene_from_file(&path).unwrap();
        assert!(scene.find_by_name("Object_7").is_some());
        assert_eq!(scene.view_names(), vec!["front"]);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("tabletop_scene_does_not_exist.json");
        assert!(matches!(
            load_scene_from_file(&path),
            Err(SerializationError::Io(_))
        ));
    }

    #[test]
    fn test_bundled_scene_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/tabletop.scene.json");
        let scene = load_scene_from_file(&path).unwrap();
        for name in ["macbook", "iphone", "Bevels_2", "Object_7", "xXDHkMplTIDAXLN"] {
            assert!(scene.find_by_name(name).is_some(), "missing node {name}");
        }
        for view in ["start", "front", "macbook", "iphone", "start2", "front2"] {
            assert!(scene.view(view).is_some(), "missing view {view}");
        }
    }
}
