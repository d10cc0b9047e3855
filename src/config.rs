//! Viewer configuration.
//!
//! Every struct is `#[serde(default)]`, so a config file only needs the
//! fields it changes. The defaults match the bundled tabletop scene.

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scene document, relative to the crate root unless absolute.
    pub scene_path: String,
    pub window: WindowConfig,
    pub picking: PickingConfig,
    pub dropzone: DropzoneConfig,
    pub interaction: InteractionConfig,
    pub screen: ScreenPatchConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scene_path: "assets/tabletop.scene.json".to_string(),
            window: WindowConfig::default(),
            picking: PickingConfig::default(),
            dropzone: DropzoneConfig::default(),
            interaction: InteractionConfig::default(),
            screen: ScreenPatchConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tabletop".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub widget_enabled: bool,
    pub hover_enabled: bool,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            widget_enabled: false,
            hover_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DropzoneConfig {
    pub allowed_extensions: Vec<String>,
    /// Use dropped HDR/EXR images as the scene environment.
    pub auto_set_environment: bool,
}

impl Default for DropzoneConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "jpeg", "jpg", "webp", "svg", "hdr", "exr"]
                .iter()
                .map(|extension| extension.to_string())
                .collect(),
            auto_set_environment: true,
        }
    }
}

/// One selectable device slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub name: String,
    /// Node whose subtree belongs to this device.
    pub root_node: String,
    /// Node under the root that the poses are applied to; the root itself when unset.
    pub pose_node: Option<String>,
    pub idle_pose: String,
    pub hover_pose: String,
    pub active_pose: String,
    /// Camera view shown while this device is focused.
    pub view: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "macbook".to_string(),
            root_node: "macbook".to_string(),
            pose_node: Some("Bevels_2".to_string()),
            idle_pose: "closed".to_string(),
            hover_pose: "hover".to_string(),
            active_pose: "open".to_string(),
            view: "macbook".to_string(),
        }
    }
}

impl DeviceConfig {
    pub fn phone() -> Self {
        Self {
            name: "iphone".to_string(),
            root_node: "iphone".to_string(),
            pose_node: None,
            idle_pose: "facedown".to_string(),
            hover_pose: "tilted".to_string(),
            active_pose: "floating".to_string(),
            view: "iphone".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    /// Startup snap to the resting pose.
    pub snap_ms: u64,
    /// Hover transitions.
    pub short_ms: u64,
    /// Focus transitions.
    pub long_ms: u64,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            snap_ms: 50,
            short_ms: 250,
            long_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ResponsiveConfig {
    /// Logical width at or below which the viewport counts as narrow.
    pub narrow_max_width: f64,
    /// Appended to camera view names on narrow viewports.
    pub variant_suffix: String,
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self {
            narrow_max_width: 768.0,
            variant_suffix: "2".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub primary: DeviceConfig,
    pub secondary: DeviceConfig,
    pub start_view: String,
    pub front_view: String,
    pub durations: DurationConfig,
    pub responsive: ResponsiveConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            primary: DeviceConfig::default(),
            secondary: DeviceConfig::phone(),
            start_view: "start".to_string(),
            front_view: "front".to_string(),
            durations: DurationConfig::default(),
            responsive: ResponsiveConfig::default(),
        }
    }
}

/// Material changes applied when an image is dropped on the viewer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScreenPatchConfig {
    /// Node carrying the screen material that is fully restyled.
    pub primary_node: String,
    /// Node carrying the screen material that only receives the emissive map.
    pub secondary_node: String,
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for ScreenPatchConfig {
    fn default() -> Self {
        Self {
            primary_node: "Object_7".to_string(),
            secondary_node: "xXDHkMplTIDAXLN".to_string(),
            color: [0.0, 0.0, 0.0],
            emissive: [1.0, 1.0, 1.0],
            roughness: 0.2,
            metalness: 0.8,
        }
    }
}
