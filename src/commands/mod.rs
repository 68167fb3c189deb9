//! CLI commands for journey-manifest

use anyhow::{bail, Result};
use std::path::Path;

use crate::builder::{self, BuildReport};
use crate::config::{save_config, Config, SitePaths};
use crate::models::Manifest;
use crate::sections;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Write a default config file
pub fn init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    let config = Config::default();
    save_config(config_path, &config)?;
    println!("Created {}", config_path.display());
    println!();
    println!("  Projects root: {}/{}", config.public_dir, config.projects_dir);
    println!("  Manifest:      {}/{}", config.public_dir, config.manifest_file);
    println!();
    println!("Next steps:");
    println!("  journey-manifest build     Scan projects and write the manifest");
    println!("  journey-manifest check     Lint the written manifest");

    Ok(())
}

/// Rebuild the manifest and print the completion summary
pub fn build(paths: &SitePaths, config: &Config) -> Result<BuildReport> {
    let report = builder::rebuild(paths, config)?;

    if report.bootstrapped {
        println!("Created projects root at {}", paths.projects_root.display());
    }
    if !report.warnings.is_empty() {
        eprintln!("⚠ {} warning(s) while scanning", report.warnings.len());
    }
    println!("manifest written with {} project(s).", report.entries);

    Ok(report)
}

/// Lint the written manifest
pub fn check(paths: &SitePaths, strict: bool) -> Result<()> {
    let manifest = load_existing(paths)?;

    println!("Checking {}", paths.manifest_file.display());
    println!();

    let warnings = crate::validation::lint_manifest(&manifest, paths);
    if warnings.is_empty() {
        println!("✓ {} project(s), no warnings", manifest.len());
        return Ok(());
    }

    println!("⚠ {} warning(s)", warnings.len());
    for warning in &warnings {
        println!("  ⚠ {}", warning);
    }
    if strict {
        bail!("Check failed in strict mode due to warnings");
    }
    Ok(())
}

/// List manifest entries, optionally filtered by section
pub fn list(paths: &SitePaths, section: Option<&str>, format: OutputFormat) -> Result<()> {
    let manifest = load_existing(paths)?;

    let wanted = section.map(sections::classify);
    let entries: Vec<_> = manifest
        .entries
        .iter()
        .filter(|e| match &wanted {
            Some(label) => &sections::classify(&e.section) == label,
            None => true,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No projects found.");
                return Ok(());
            }
            println!("{:<30} {:<30} {:<12}", "ID", "TITLE", "SECTION");
            println!("{}", "-".repeat(74));
            for entry in entries {
                println!(
                    "{:<30} {:<30} {:<12}",
                    truncate(&entry.id, 28),
                    truncate(&entry.title, 28),
                    sections::classify(&entry.section)
                );
            }
        }
    }

    Ok(())
}

fn load_existing(paths: &SitePaths) -> Result<Manifest> {
    match Manifest::load(&paths.manifest_file)? {
        Some(manifest) => Ok(manifest),
        None => bail!(
            "No manifest at {}. Run `journey-manifest build` first.",
            paths.manifest_file.display()
        ),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
