//! Level layouts
//!
//! A layout lists the cubes ("bloks") of a level in level-local space. Files
//! are RON or JSON, picked by extension. Without a file the game builds a
//! procedural cluster.

use std::fmt;
use std::fs;
use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Error type for layout IO
#[derive(Debug)]
pub enum LayoutError {
    /// IO error during file operations
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// File extension is neither `ron` nor `json`
    UnsupportedFormat(String),
    /// Layout contains no bloks
    Empty,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::SerializeError(msg) => write!(f, "Serialization error: {msg}"),
            Self::DeserializeError(msg) => write!(f, "Deserialization error: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported layout format: {ext}"),
            Self::Empty => write!(f, "Layout has no bloks"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// One cube of a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Cube center relative to the level origin
    pub center: Vec3,
    /// Half of the cube edge length
    pub half_extent: f32,
    #[serde(default = "identity")]
    pub rotation: Quat,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

fn default_scale() -> f32 {
    1.3
}

/// A complete level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub name: String,
    /// Uniform scale applied to centers and sizes when the level is built
    #[serde(default = "default_scale")]
    pub scale: f32,
    pub blocks: Vec<BlockDef>,
}

impl LevelLayout {
    /// Create an empty layout with the default scale
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: default_scale(),
            blocks: Vec::new(),
        }
    }

    /// A ball of unit-sized cubes on a grid with 2 unit spacing
    #[must_use]
    pub fn cluster(radius: f32) -> Self {
        let mut layout = Self::new("cluster");
        let steps = (radius / 2.0).floor() as i32;
        for z in -steps..=steps {
            for y in -steps..=steps {
                for x in -steps..=steps {
                    let center = Vec3::new(x as f32, y as f32, z as f32) * 2.0;
                    if center.length() <= radius {
                        layout.blocks.push(BlockDef {
                            center,
                            half_extent: 0.9,
                            rotation: Quat::IDENTITY,
                        });
                    }
                }
            }
        }
        layout
    }

    /// Bloks with `scale` applied
    pub fn scaled_blocks(&self) -> impl Iterator<Item = BlockDef> + '_ {
        self.blocks.iter().map(|b| BlockDef {
            center: b.center * self.scale,
            half_extent: b.half_extent * self.scale,
            rotation: b.rotation,
        })
    }

    /// Load from a `.ron` or `.json` file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds no bloks
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| LayoutError::IoError(e.to_string()))?;
        let layout = match extension(path).as_str() {
            "ron" => Self::from_ron(&contents)?,
            "json" => Self::from_json(&contents)?,
            other => return Err(LayoutError::UnsupportedFormat(other.to_string())),
        };
        if layout.blocks.is_empty() {
            return Err(LayoutError::Empty);
        }
        log::info!(
            "Loaded level '{}' with {} bloks from {}",
            layout.name,
            layout.blocks.len(),
            path.display()
        );
        Ok(layout)
    }

    /// Save to a `.ron` or `.json` file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let path = path.as_ref();
        let text = match extension(path).as_str() {
            "ron" => self.to_ron()?,
            "json" => self.to_json()?,
            other => return Err(LayoutError::UnsupportedFormat(other.to_string())),
        };
        fs::write(path, text).map_err(|e| LayoutError::IoError(e.to_string()))
    }

    /// Serialize to a pretty RON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron(&self) -> Result<String, LayoutError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LayoutError::SerializeError(e.to_string()))
    }

    /// Serialize to a pretty JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String, LayoutError> {
        serde_json::to_string_pretty(self).map_err(|e| LayoutError::SerializeError(e.to_string()))
    }

    /// Parse from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails
    pub fn from_ron(s: &str) -> Result<Self, LayoutError> {
        ron::from_str(s).map_err(|e| LayoutError::DeserializeError(e.to_string()))
    }

    /// Parse from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails
    pub fn from_json(s: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(s).map_err(|e| LayoutError::DeserializeError(e.to_string()))
    }
}

/// The level played when no layout file is given. It reaches past the
/// default center radius, so it holds both center and outer bloks.
impl Default for LevelLayout {
    fn default() -> Self {
        Self::cluster(4.5)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}
