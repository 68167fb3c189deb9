//! Manifest reconciliation
//!
//! Merges freshly scanned project folders with their override files and the
//! previously written manifest:
//! - id: override > previous entry with the computed id > previous entry with
//!   the same folder > computed id
//! - thumb: override > previous by id > previous by folder > discovered image
//!   > configured default
//! - every other field layers computed defaults < previous entry < override
//! - previous entries that were neither re-derived nor used as a merge base
//!   are carried over verbatim after the generated ones

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use crate::config::{Config, SitePaths};
use crate::models::{normalize_folder, Manifest, ProjectEntry, ProjectOverride};
use crate::scan::{self, ScanOptions, ScannedProject};

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Override,
    PriorById,
    PriorByFolder,
    Prior,
    Discovered,
    Computed,
    Fallback,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Override => write!(f, "override"),
            Source::PriorById => write!(f, "prior_by_id"),
            Source::PriorByFolder => write!(f, "prior_by_folder"),
            Source::Prior => write!(f, "prior"),
            Source::Discovered => write!(f, "discovered"),
            Source::Computed => write!(f, "computed"),
            Source::Fallback => write!(f, "fallback"),
        }
    }
}

/// Evaluate an ordered precedence chain
///
/// Returns the first candidate holding a non-empty value, with its source.
pub fn first_present<'a>(candidates: &[(Source, Option<&'a str>)]) -> Option<(Source, &'a str)> {
    candidates.iter().find_map(|&(source, value)| {
        value
            .filter(|v| !v.is_empty())
            .map(|v| (source, v))
    })
}

/// Lookups into the previous manifest
///
/// Keys that appear more than once resolve to their first occurrence.
pub struct PriorIndex<'a> {
    entries: &'a [ProjectEntry],
    by_id: HashMap<&'a str, usize>,
    by_folder: HashMap<&'a str, usize>,
}

impl<'a> PriorIndex<'a> {
    pub fn new(entries: &'a [ProjectEntry]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_folder = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if !entry.id.is_empty() {
                by_id.entry(entry.id.as_str()).or_insert(idx);
            }
            let folder = entry.folder_key();
            if !folder.is_empty() {
                by_folder.entry(folder).or_insert(idx);
            }
        }
        Self {
            entries,
            by_id,
            by_folder,
        }
    }

    pub fn by_id(&self, id: &str) -> Option<(usize, &'a ProjectEntry)> {
        self.by_id.get(id).map(|&idx| (idx, &self.entries[idx]))
    }

    pub fn by_folder(&self, folder: &str) -> Option<(usize, &'a ProjectEntry)> {
        self.by_folder
            .get(normalize_folder(folder))
            .map(|&idx| (idx, &self.entries[idx]))
    }
}

/// Result of merging one scan with the previous manifest
#[derive(Debug, Default)]
pub struct Reconciled {
    pub entries: Vec<ProjectEntry>,
    /// Entries produced from folders on disk
    pub generated: usize,
    /// Previous entries carried over unchanged
    pub orphans: usize,
    pub warnings: Vec<String>,
}

/// Merge scanned projects with the previous manifest
pub fn reconcile(prior: &[ProjectEntry], scanned: &[ScannedProject], default_thumb: &str) -> Reconciled {
    let index = PriorIndex::new(prior);
    let mut entries = Vec::with_capacity(scanned.len() + prior.len());
    let mut consumed = HashSet::new();

    for project in scanned {
        let (entry, base) = merge_project(project, &index, default_thumb);
        if let Some(idx) = base {
            consumed.insert(idx);
        }
        entries.push(entry);
    }

    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.id.as_str()) {
            let msg = format!("duplicate id '{}' generated for {}", entry.id, entry.folder);
            tracing::warn!("{}", msg);
            warnings.push(msg);
        }
    }

    let orphans = carry_over(prior, &seen, &consumed);
    let generated = entries.len();
    let orphan_count = orphans.len();
    entries.extend(orphans);

    Reconciled {
        entries,
        generated,
        orphans: orphan_count,
        warnings,
    }
}

/// Previous entries whose id was not produced and which were not merged into
/// a generated entry, in their original order
fn carry_over(
    prior: &[ProjectEntry],
    produced: &HashSet<&str>,
    consumed: &HashSet<usize>,
) -> Vec<ProjectEntry> {
    prior
        .iter()
        .enumerate()
        .filter(|(idx, entry)| !consumed.contains(idx) && !produced.contains(entry.id.as_str()))
        .map(|(_, entry)| {
            tracing::debug!(id = %entry.id, folder = %entry.folder, "carrying over entry");
            entry.clone()
        })
        .collect()
}

/// Build the entry for one project; also returns the index of the previous
/// entry used as merge base
fn merge_project(
    project: &ScannedProject,
    index: &PriorIndex<'_>,
    default_thumb: &str,
) -> (ProjectEntry, Option<usize>) {
    let no_override = ProjectOverride::default();
    let over = project.overrides.as_ref().unwrap_or(&no_override);

    let default_id = project.default_id();
    let by_id = index.by_id(&default_id);
    let by_folder = index.by_folder(&project.folder);

    let (id_source, id) = first_present(&[
        (Source::Override, over.id.as_deref()),
        (Source::PriorById, by_id.map(|(_, e)| e.id.as_str())),
        (Source::PriorByFolder, by_folder.map(|(_, e)| e.id.as_str())),
        (Source::Computed, Some(default_id.as_str())),
    ])
    .unwrap_or((Source::Computed, default_id.as_str()));

    let (thumb_source, thumb) = first_present(&[
        (Source::Override, over.thumb.as_deref()),
        (Source::PriorById, by_id.map(|(_, e)| e.thumb.as_str())),
        (Source::PriorByFolder, by_folder.map(|(_, e)| e.thumb.as_str())),
        (Source::Discovered, project.discovered_thumb.as_deref()),
        (Source::Fallback, Some(default_thumb)),
    ])
    .unwrap_or((Source::Fallback, default_thumb));

    let base = by_folder.or(by_id);
    let prior = base.map(|(_, e)| e);

    let mut extra = prior.map(|e| e.extra.clone()).unwrap_or_default();
    extra.extend(over.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

    let title = layered(over.title.as_deref(), prior.map(|e| e.title.as_str()), "");
    let section = layered(over.section.as_deref(), prior.map(|e| e.section.as_str()), "");

    let entry = ProjectEntry {
        id: id.to_string(),
        title: non_empty_or(title, project.default_title()),
        section: non_empty_or(section, project.section_label.clone()),
        description: layered(
            over.description.as_deref(),
            prior.map(|e| e.description.as_str()),
            "",
        ),
        folder: project.folder.clone(),
        thumb: first_present(&[
            (Source::Override, over.thumb.as_deref()),
            (Source::Prior, prior.map(|e| e.thumb.as_str())),
        ])
        .map_or(thumb, |(_, value)| value)
        .to_string(),
        extra,
    };

    tracing::debug!(
        id = %entry.id,
        folder = %entry.folder,
        id_source = %id_source,
        thumb_source = %thumb_source,
        merged_prior = base.is_some(),
        "reconciled project"
    );

    (entry, base.map(|(idx, _)| idx))
}

/// One field through the layers: override > previous entry > computed
///
/// An override that is present wins even when empty, so `meta.json` can clear
/// a field. An empty previous value does not shadow the computed one.
fn layered(over: Option<&str>, prior: Option<&str>, computed: &str) -> String {
    over.or_else(|| prior.filter(|v| !v.is_empty()))
        .unwrap_or(computed)
        .to_string()
}

fn non_empty_or(value: String, fallback: String) -> String {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Summary of a rebuild
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest_path: PathBuf,
    pub entries: usize,
    pub generated: usize,
    pub orphans: usize,
    pub warnings: Vec<String>,
    /// The projects root did not exist and was created
    pub bootstrapped: bool,
}

/// Rebuild the manifest from the project tree
///
/// Per-project problems become warnings in the report. Errors are returned
/// only when the projects root cannot be created or listed, the previous
/// manifest exists but cannot be parsed, or the manifest cannot be written.
pub fn rebuild(paths: &SitePaths, config: &Config) -> Result<BuildReport> {
    let mut bootstrapped = false;
    if !paths.projects_root.exists() {
        fs::create_dir_all(&paths.projects_root).with_context(|| {
            format!("Failed to create projects root {}", paths.projects_root.display())
        })?;
        tracing::info!(root = %paths.projects_root.display(), "created projects root");
        bootstrapped = true;
    }

    let prior = Manifest::load(&paths.manifest_file)
        .context("Previous manifest is unreadable; refusing to overwrite it")?
        .unwrap_or_default();

    let options = ScanOptions {
        projects_url: config.projects_url(),
        override_file: config.override_file.clone(),
    };
    let scanned = scan::scan_projects(&paths.projects_root, &options)?;

    let reconciled = reconcile(&prior.entries, &scanned.projects, &config.default_thumb);

    let mut warnings = scanned.warnings;
    warnings.extend(reconciled.warnings);

    let manifest = Manifest::new(reconciled.entries);
    manifest.save(&paths.manifest_file)?;

    tracing::info!(
        path = %paths.manifest_file.display(),
        entries = manifest.len(),
        generated = reconciled.generated,
        carried_over = reconciled.orphans,
        warnings = warnings.len(),
        "manifest written"
    );

    Ok(BuildReport {
        manifest_path: paths.manifest_file.clone(),
        entries: manifest.len(),
        generated: reconciled.generated,
        orphans: reconciled.orphans,
        warnings,
        bootstrapped,
    })
}
