pub mod guidance;
pub mod mutate;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// --- Types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Difficulty> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node in the mindmap tree. The root node doubles as the course itself;
/// every other node is a module/lesson somewhere below it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MindmapNode {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Depth hint (0 = root). Advisory only — never re-validated on mutation.
    #[serde(default)]
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub children: Vec<MindmapNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl MindmapNode {
    /// A bare node with a fresh random id and empty everything else.
    pub fn new(title: impl Into<String>) -> MindmapNode {
        MindmapNode {
            id: new_node_id(),
            title: title.into(),
            description: None,
            level: 0,
            difficulty: None,
            estimated_hours: None,
            skills: Vec::new(),
            prerequisites: Vec::new(),
            children: Vec::new(),
            position: None,
        }
    }
}

/// Caller-supplied partial data for a module being created. Missing fields
/// take the creation defaults when the node is materialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewModule {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl NewModule {
    pub fn titled(title: impl Into<String>) -> NewModule {
        NewModule {
            title: title.into(),
            ..NewModule::default()
        }
    }

    /// Materialize into a tree node, assigning a fresh id and the
    /// creation defaults: level 1, beginner, one estimated hour.
    pub fn materialize(self) -> MindmapNode {
        MindmapNode {
            id: new_node_id(),
            title: self.title,
            description: self.description,
            level: self.level.unwrap_or(1),
            difficulty: Some(self.difficulty.unwrap_or(Difficulty::Beginner)),
            estimated_hours: Some(self.estimated_hours.unwrap_or(1.0).max(0.0)),
            skills: self.skills,
            prerequisites: self.prerequisites,
            children: Vec::new(),
            position: None,
        }
    }
}

/// Generate a fresh random node id. Random rather than sequential so that
/// duplicated subtrees can be re-keyed without scanning the whole tree.
pub fn new_node_id() -> String {
    format!("node-{}", uuid::Uuid::new_v4())
}

// --- Payload validation ---

/// Recursively validate an untyped outline payload: every node must carry a
/// non-empty `id` and `title`, and `children`, when present, must be an array
/// whose elements all validate in turn.
pub fn validate_outline(value: &serde_json::Value) -> Result<(), String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "outline node is not an object".to_string())?;

    for key in ["id", "title"] {
        match obj.get(key).and_then(|v| v.as_str()) {
            Some(s) if !s.trim().is_empty() => {}
            _ => return Err(format!("outline node is missing a non-empty '{}'", key)),
        }
    }

    if let Some(children) = obj.get("children") {
        let arr = children.as_array().ok_or_else(|| {
            format!(
                "'children' of node '{}' is not an array",
                obj.get("id").and_then(|v| v.as_str()).unwrap_or("?")
            )
        })?;
        for child in arr {
            validate_outline(child)?;
        }
    }

    Ok(())
}

// --- Storage ---

/// Resolve the global mindmaps directory (~/.mindloom/).
pub fn mindmaps_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mindloom")
}

/// List all mindmap names (without .loom extension), sorted.
pub fn list_mindmaps() -> Result<Vec<String>, String> {
    let dir = mindmaps_dir();
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names: Vec<String> = fs::read_dir(&dir)
        .map_err(|e| e.to_string())?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name().to_string_lossy().to_string();
            name.strip_suffix(".loom").map(|n| n.to_string())
        })
        .collect();
    names.sort();
    Ok(names)
}

/// Read a mindmap as raw JSON string.
pub fn read_mindmap_raw(name: &str) -> Result<String, String> {
    let path = mindmaps_dir().join(format!("{}.loom", name));
    fs::read_to_string(&path).map_err(|e| e.to_string())
}

/// Read a mindmap as a typed tree.
pub fn read_mindmap(name: &str) -> Result<MindmapNode, String> {
    let raw = read_mindmap_raw(name)?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

/// Write a mindmap from raw JSON string.
///
/// Uses atomic write (temp file + rename) so external watchers see a single
/// event per save instead of truncate + write.
pub fn write_mindmap_raw(name: &str, data: &str) -> Result<(), String> {
    let dir = mindmaps_dir();
    fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    let tmp = dir.join(format!(".{}.loom.tmp", name));
    let path = dir.join(format!("{}.loom", name));
    fs::write(&tmp, data).map_err(|e| e.to_string())?;
    fs::rename(&tmp, &path).map_err(|e| e.to_string())
}

/// Write a mindmap from a typed tree.
pub fn write_mindmap(name: &str, root: &MindmapNode) -> Result<(), String> {
    let json = serde_json::to_string_pretty(root).map_err(|e| e.to_string())?;
    write_mindmap_raw(name, &json)
}

/// Delete a mindmap by name.
pub fn delete_mindmap(name: &str) -> Result<(), String> {
    let path = mindmaps_dir().join(format!("{}.loom", name));
    if path.exists() {
        fs::remove_file(&path).map_err(|e| e.to_string())
    } else {
        Ok(())
    }
}
