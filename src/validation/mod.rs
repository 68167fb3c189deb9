//! Lint checks for a written manifest

use std::collections::HashSet;

use crate::config::SitePaths;
use crate::models::Manifest;
use crate::sections;

/// Check for common manifest issues
///
/// Nothing here is fatal to the site; the front end renders whatever it is
/// given, so every finding is reported as a warning string.
pub fn lint_manifest(manifest: &Manifest, paths: &SitePaths) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut ids = HashSet::new();

    for (idx, entry) in manifest.entries.iter().enumerate() {
        let label = if entry.id.is_empty() {
            format!("entry #{}", idx + 1)
        } else {
            entry.id.clone()
        };

        if entry.id.is_empty() {
            warnings.push(format!("{}: Missing id", label));
        } else if !ids.insert(entry.id.as_str()) {
            warnings.push(format!("Duplicate id: {}", entry.id));
        }

        if entry.title.trim().is_empty() {
            warnings.push(format!("{}: Empty title", label));
        }

        if !sections::is_canonical(&entry.section) {
            warnings.push(format!(
                "{}: Section '{}' is displayed as '{}'",
                label,
                entry.section,
                sections::classify(&entry.section)
            ));
        }

        if !entry.folder.is_empty() {
            match paths.resolve_url(entry.folder_key()) {
                Some(dir) if dir.is_dir() => {}
                _ => warnings.push(format!(
                    "{}: Folder {} not found (entry is kept as-is)",
                    label, entry.folder
                )),
            }
        }

        if let Some(file) = paths.resolve_url(&entry.thumb) {
            if !file.is_file() {
                warnings.push(format!("{}: Thumbnail {} not found", label, entry.thumb));
            }
        }
    }

    warnings
}
