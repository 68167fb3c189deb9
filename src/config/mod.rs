//! Configuration management for journey-manifest
//!
//! Handles the optional `journey.toml` next to the site and the resolved
//! filesystem layout derived from it

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "journey.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory served as the site root
    pub public_dir: String,
    /// Projects root, relative to `public_dir`
    pub projects_dir: String,
    /// Manifest file name, relative to `public_dir`
    pub manifest_file: String,
    /// Root-relative thumbnail used when a project has no image
    pub default_thumb: String,
    /// Per-project override file name
    pub override_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_dir: "public".to_string(),
            projects_dir: "projects".to_string(),
            manifest_file: "manifest.json".to_string(),
            default_thumb: "/default-thumb.png".to_string(),
            override_file: "meta.json".to_string(),
        }
    }
}

impl Config {
    /// URL prefix every project folder is published under, e.g. `/projects`
    pub fn projects_url(&self) -> String {
        let trimmed = self.projects_dir.replace('\\', "/");
        format!("/{}", trimmed.trim_matches('/'))
    }
}

/// Resolved paths the builder reads from and writes to
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub public: PathBuf,
    pub projects_root: PathBuf,
    pub manifest_file: PathBuf,
}

impl SitePaths {
    /// Resolve paths from a config, relative to `base`
    pub fn from_config(config: &Config, base: &Path) -> Self {
        let public = base.join(&config.public_dir);
        Self {
            projects_root: public.join(&config.projects_dir),
            manifest_file: public.join(&config.manifest_file),
            public,
        }
    }

    /// Resolve a root-relative URL path (`/projects/a/b.png`) to a file on disk
    pub fn resolve_url(&self, url: &str) -> Option<PathBuf> {
        let rel = url.strip_prefix('/')?;
        if rel.is_empty() {
            return None;
        }
        Some(rel.split('/').fold(self.public.clone(), |acc, part| acc.join(part)))
    }
}

/// Load configuration from disk
/// A missing file yields the defaults
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Save configuration to disk
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("public_dir = \"site\"").unwrap();
        assert_eq!(config.public_dir, "site");
        assert_eq!(config.projects_dir, "projects");
        assert_eq!(config.default_thumb, "/default-thumb.png");
    }

    #[test]
    fn test_projects_url_normalizes_slashes() {
        let mut config = Config::default();
        config.projects_dir = "/work\\projects/".to_string();
        assert_eq!(config.projects_url(), "/work/projects");
        assert_eq!(Config::default().projects_url(), "/projects");
    }

    #[test]
    fn test_resolve_url_under_public() {
        let paths = SitePaths::from_config(&Config::default(), Path::new("/srv/site"));
        assert_eq!(
            paths.resolve_url("/projects/static/a/thumb.png"),
            Some(PathBuf::from("/srv/site/public/projects/static/a/thumb.png"))
        );
        assert_eq!(paths.resolve_url("https://example.com/x.png"), None);
        assert_eq!(paths.resolve_url("/"), None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(load_config(&path).unwrap(), Config::default());

        let mut config = Config::default();
        config.override_file = "project.json".to_string();
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
