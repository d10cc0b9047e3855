use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

/// Colour space tag carried by a texture; the renderer decodes sRGB on sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorSpace {
    Linear,
    Srgb,
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub color_space: ColorSpace,
    pub source_hash: String,
    pub pixels: image::RgbaImage,
}

#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub name: String,
    pub source_hash: String,
    pub pixels: image::Rgb32FImage,
}

/// Payload of a load notification.
#[derive(Debug, Clone)]
pub enum Asset {
    Texture(Arc<Texture>),
    Environment(Arc<EnvironmentMap>),
}

impl Asset {
    pub fn name(&self) -> &str {
        match self {
            Asset::Texture(texture) => &texture.name,
            Asset::Environment(environment) => &environment.name,
        }
    }

    /// Hex SHA-256 of the dropped file.
    pub fn source_hash(&self) -> &str {
        match self {
            Asset::Texture(texture) => &texture.source_hash,
            Asset::Environment(environment) => &environment.source_hash,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Asset::Texture(texture) => texture.pixels.dimensions(),
            Asset::Environment(environment) => environment.pixels.dimensions(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("extension {extension:?} is not accepted by the drop zone: {path}")]
    UnsupportedExtension { path: String, extension: String },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

pub struct AssetManager {
    allowed_extensions: Vec<String>,
}

impl AssetManager {
    pub fn new(allowed_extensions: &[String]) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .iter()
                .map(|extension| extension.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn import_path(&self, path: &Path) -> Result<Asset, AssetError> {
        // Check the extension before touching the file.
        self.check_extension(path)?;
        let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("texture")
            .to_string();
        self.import_bytes(&name, &bytes)
    }

    pub fn import_bytes(&self, name: &str, bytes: &[u8]) -> Result<Asset, AssetError> {
        let extension = self.check_extension(Path::new(name))?;
        let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
            path: name.to_string(),
            source,
        })?;
        let source_hash = hash_bytes(bytes);

        let asset = if matches!(extension.as_str(), "hdr" | "exr") {
            let pixels = decoded.to_rgb32f();
            Asset::Environment(Arc::new(EnvironmentMap {
                name: name.to_string(),
                source_hash,
                pixels,
            }))
        } else {
            let pixels = decoded.to_rgba8();
            Asset::Texture(Arc::new(Texture {
                name: name.to_string(),
                color_space: ColorSpace::Linear,
                source_hash,
                pixels,
            }))
        };

        let (width, height) = asset.dimensions();
        log::info!(
            "Imported {} {}x{} ({})",
            asset.name(),
            width,
            height,
            &asset.source_hash()[..12]
        );
        Ok(asset)
    }

    fn check_extension(&self, path: &Path) -> Result<String, AssetError> {
        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            Ok(extension)
        } else {
            Err(AssetError::UnsupportedExtension {
                path: path.display().to_string(),
                extension,
            })
        }
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}
