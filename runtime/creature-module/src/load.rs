//! Creature document loading
//!
//! A [`LoadDataPacket`] owns one parsed creature document. It is produced from
//! a JSON file, a JSON string, any reader, or (with the `zip` feature) a zip
//! archive holding a JSON document, and is then borrowed by
//! [`Creature::new`](crate::Creature::new) and
//! [`CreatureAnimation::new`](crate::CreatureAnimation::new).

use crate::error::{CreatureError, Result};
use crate::mesh_bone::UvWarp;
use glam::Vec2;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parsed creature document
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDataPacket {
    base_node: Value,
}

impl LoadDataPacket {
    /// Wrap an already parsed document; the root must be a JSON object
    pub fn from_value(base_node: Value) -> Result<Self> {
        if !base_node.is_object() {
            return Err(CreatureError::Load(
                "document root must be a JSON object".to_string(),
            ));
        }
        Ok(Self { base_node })
    }

    /// Parse a document from a JSON string
    pub fn from_json_str(source: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    /// Parse a document from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    /// Open and parse a JSON document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading creature document: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a zip archive and parse the first `.json` entry inside it
    #[cfg(feature = "zip")]
    pub fn from_zip_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading zipped creature document: {}", path.display());
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if !entry.is_file() || !entry.name().to_ascii_lowercase().ends_with(".json") {
                continue;
            }
            log::debug!("Reading zip entry: {}", entry.name());
            let mut source = String::new();
            entry.read_to_string(&mut source)?;
            return Self::from_json_str(&source);
        }

        Err(CreatureError::Load(format!(
            "no JSON document found in {}",
            path.display()
        )))
    }

    /// The whole parsed document
    pub fn base_node(&self) -> &Value {
        &self.base_node
    }

    fn section(&self, key: &str) -> Result<&Value> {
        self.base_node
            .get(key)
            .ok_or_else(|| CreatureError::Load(format!("missing '{key}' section")))
    }

    /// The `mesh` section
    pub fn mesh_node(&self) -> Result<&Value> {
        self.section("mesh")
    }

    /// The `skeleton` section
    pub fn skeleton_node(&self) -> Result<&Value> {
        self.section("skeleton")
    }

    /// The keyframe block of one clip
    pub fn animation_node(&self, name: &str) -> Result<&Value> {
        self.section("animation")?
            .get(name)
            .ok_or_else(|| CreatureError::Load(format!("missing animation clip '{name}'")))
    }

    /// Names of every clip in the document, in name order
    pub fn animation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .base_node
            .get("animation")
            .and_then(Value::as_object)
            .map(|clips| clips.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Parse a keyframe key ("0", "12", ...) into a frame time
pub(crate) fn parse_frame_key(key: &str) -> Result<i32> {
    key.trim()
        .parse::<i32>()
        .map_err(|_| CreatureError::Load(format!("invalid frame time '{key}'")))
}

// Document sections as they appear on disk. Validation happens in the
// constructors that consume them.

#[derive(Debug, Deserialize)]
pub(crate) struct MeshSection {
    #[serde(default)]
    pub texture: String,
    pub points: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
    #[serde(default)]
    pub regions: Vec<RegionSection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegionSection {
    pub name: String,
    pub start_pt_index: usize,
    pub end_pt_index: usize,
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default)]
    pub weights: BTreeMap<String, Vec<f32>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoneSection {
    pub id: i32,
    #[serde(default)]
    pub parent: Option<String>,
    pub rest_start_pt: Vec2,
    pub rest_end_pt: Vec2,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoneKeySection {
    pub start_pt: Vec2,
    pub end_pt: Vec2,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DisplacementKeySection {
    pub displacements: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClipSection {
    pub bones: BTreeMap<String, BTreeMap<String, BoneKeySection>>,
    #[serde(default)]
    pub meshes: BTreeMap<String, BTreeMap<String, DisplacementKeySection>>,
    #[serde(default)]
    pub uv_swap: BTreeMap<String, BTreeMap<String, UvWarp>>,
}

/// Split a flat `[x0, y0, x1, y1, ...]` array into 2D points
pub(crate) fn flat_to_vec2(values: &[f32], what: &str) -> Result<Vec<Vec2>> {
    if values.len() % 2 != 0 {
        return Err(CreatureError::Load(format!(
            "{what} has odd length {}",
            values.len()
        )));
    }
    Ok(values
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect())
}
