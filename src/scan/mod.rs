//! Project tree scanning
//!
//! Walks `projects/<section-folder>/<project-folder>/` and collects what the
//! builder needs for each project: the inferred section label, the public
//! folder URL, the optional override file and the first usable thumbnail.
//! Problems with a single folder are recorded as warnings and never stop
//! the scan.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use crate::models::ProjectOverride;
use crate::sections;

/// Extensions accepted as thumbnails, compared case-insensitively
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Conventional thumbnail names checked first, in order
const THUMB_STEMS: &[&str] = &["thumb", "cover"];

/// Asset subfolders searched next (the misspelling is common in the tree)
const ASSET_DIRS: &[&str] = &["assets", "assests"];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static WORD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w").unwrap());

/// A project folder found on disk
#[derive(Debug, Clone)]
pub struct ScannedProject {
    pub section_folder: String,
    pub project_folder: String,
    /// Label inferred from the section folder name
    pub section_label: String,
    /// Root-relative URL of the project folder, e.g. `/projects/01-static/landing`
    pub folder: String,
    pub overrides: Option<ProjectOverride>,
    /// First image found by [`discover_thumbnail`]
    pub discovered_thumb: Option<String>,
}

impl ScannedProject {
    pub fn default_id(&self) -> String {
        default_id(&self.section_label, &self.project_folder)
    }

    pub fn default_title(&self) -> String {
        default_title(&self.project_folder)
    }
}

/// Result of a scan: projects in folder order plus soft failures
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub projects: Vec<ScannedProject>,
    pub warnings: Vec<String>,
}

/// Scan options
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// URL prefix for project folders, e.g. `/projects`
    pub projects_url: String,
    /// Override file looked up in each project folder
    pub override_file: String,
}

/// Scan every section folder under `root`
///
/// Sections and projects are visited in name order so repeated runs see the
/// same sequence. Fails only when `root` itself cannot be listed.
pub fn scan_projects(root: &Path, options: &ScanOptions) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    let section_folders = list_subdirs(root)
        .with_context(|| format!("Failed to list projects root {}", root.display()))?;

    for section_name in section_folders {
        let section_path = root.join(&section_name);
        let Some(section_folder) = utf8_name(section_name, &section_path, &mut outcome.warnings)
        else {
            continue;
        };
        let section_label = sections::classify(&section_folder);

        let projects = match list_subdirs(&section_path) {
            Ok(projects) => projects,
            Err(e) => {
                let msg = format!("skipping section {}: {}", section_path.display(), e);
                tracing::warn!("{}", msg);
                outcome.warnings.push(msg);
                continue;
            }
        };

        for project_name in projects {
            let project_path = section_path.join(&project_name);
            let Some(project_folder) =
                utf8_name(project_name, &project_path, &mut outcome.warnings)
            else {
                continue;
            };
            let folder = format!(
                "{}/{}/{}",
                options.projects_url.trim_end_matches('/'),
                section_folder,
                project_folder
            );

            let override_path = project_path.join(&options.override_file);
            let overrides = match load_override(&override_path) {
                Ok(overrides) => overrides,
                Err(msg) => {
                    tracing::warn!("{}", msg);
                    outcome.warnings.push(msg);
                    None
                }
            };

            let discovered_thumb = discover_thumbnail(&project_path, &folder);
            tracing::debug!(
                folder = %folder,
                thumb = ?discovered_thumb,
                has_override = overrides.is_some(),
                "scanned project"
            );

            outcome.projects.push(ScannedProject {
                section_folder: section_folder.clone(),
                project_folder,
                section_label: section_label.clone(),
                folder,
                overrides,
                discovered_thumb,
            });
        }
    }

    Ok(outcome)
}

/// Read a project's override file
///
/// A missing file is `Ok(None)`. An unreadable or malformed file is an
/// `Err` carrying a warning message with the path; callers treat it as absent.
pub fn load_override(path: &Path) -> Result<Option<ProjectOverride>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read override {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| format!("failed to parse override {}: {}", path.display(), e))
}

/// Identifier used when neither the override nor the previous manifest supplies one
pub fn default_id(section_label: &str, project_folder: &str) -> String {
    let raw = format!("{}-{}", section_label, project_folder);
    WHITESPACE.replace_all(&raw, "-").to_lowercase()
}

/// Human-readable title from a folder name: `my-first_site` -> `My First Site`
pub fn default_title(project_folder: &str) -> String {
    let spaced = project_folder.replace(['-', '_'], " ");
    WORD_START
        .replace_all(&spaced, |caps: &regex::Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Find the first usable image for a project
///
/// Order: `thumb.*` / `cover.*` in the project folder, then any image in
/// `assets/` or `assests/`, then any image in the project folder itself.
/// Returns the image's root-relative URL under `folder_url`.
pub fn discover_thumbnail(project_path: &Path, folder_url: &str) -> Option<String> {
    let url = |rel: &str| format!("{}/{}", folder_url.trim_end_matches('/'), rel);

    for stem in THUMB_STEMS {
        for ext in IMAGE_EXTENSIONS {
            let name = format!("{}.{}", stem, ext);
            if project_path.join(&name).is_file() {
                return Some(url(&name));
            }
        }
    }

    for dir in ASSET_DIRS {
        if let Some(name) = first_image_in(&project_path.join(dir)) {
            return Some(url(&format!("{}/{}", dir, name)));
        }
    }

    first_image_in(project_path).map(|name| url(&name))
}

fn first_image_in(dir: &Path) -> Option<String> {
    let mut images: Vec<String> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| is_image(path))
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    images.sort();
    images.into_iter().next()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Names of the immediate subdirectories of `dir`, sorted
fn list_subdirs(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name());
        }
    }
    names.sort();
    Ok(names)
}

/// Folder names end up in URLs, so they must be valid UTF-8
fn utf8_name(name: OsString, path: &Path, warnings: &mut Vec<String>) -> Option<String> {
    match name.into_string() {
        Ok(name) => Some(name),
        Err(_) => {
            let msg = format!("skipping folder with a non UTF-8 name: {}", path.display());
            tracing::warn!("{}", msg);
            warnings.push(msg);
            None
        }
    }
}
