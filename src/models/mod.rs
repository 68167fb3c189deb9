//! Data models for the project manifest
//!
//! These represent the canonical JSON consumed by the portfolio front end

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One project card in the manifest
///
/// Core keys missing from a hand-edited manifest, or set to `null`, read back
/// as empty strings; numbers and booleans keep their JSON text. Any other key (`date`, `tech`, `live`, `sandbox`, ...) is kept in `extra`
/// and written back untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub section: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub folder: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumb: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectEntry {
    /// Folder path used for matching, without trailing slashes
    pub fn folder_key(&self) -> &str {
        normalize_folder(&self.folder)
    }
}

/// Contents of a per-project override file: any subset of [`ProjectEntry`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read a core field written by hand: `null` is empty, scalars become text
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) => Err(serde::de::Error::custom("expected a string, found an array")),
        Value::Object(_) => Err(serde::de::Error::custom("expected a string, found an object")),
    }
}

/// Strip trailing slashes so `/projects/a/` and `/projects/a` match
pub fn normalize_folder(folder: &str) -> &str {
    folder.trim_end_matches('/')
}

/// Manifest I/O error
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Manifest {} is not a valid project list", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize manifest")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write manifest {}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Ordered list of project entries, the site's single source of truth
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<ProjectEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ProjectEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by ID
    pub fn get(&self, id: &str) -> Option<&ProjectEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Load a manifest; `Ok(None)` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, ManifestError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ManifestError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Pretty-printed JSON exactly as written to disk
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the whole manifest in one step
    ///
    /// The document is rendered in memory, written to a sibling temp file and
    /// renamed over `path`, so a failed run leaves the previous file intact.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = self.to_json()?;
        write_atomic(path, json.as_bytes()).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("manifest.json");
    let tmp = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));

    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
