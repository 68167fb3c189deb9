// Integration tests for manifest rebuilds
// Each test builds a small public/projects tree in a temp dir

use anyhow::Result;
use journey_manifest::builder::rebuild;
use journey_manifest::config::{Config, SitePaths};
use journey_manifest::models::{Manifest, ProjectEntry};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Setup test environment
fn setup() -> Result<(TempDir, Config, SitePaths)> {
    let temp_dir = TempDir::new()?;
    let config = Config::default();
    let paths = SitePaths::from_config(&config, temp_dir.path());
    Ok((temp_dir, config, paths))
}

fn add_project(paths: &SitePaths, section: &str, project: &str) -> Result<std::path::PathBuf> {
    let dir = paths.projects_root.join(section).join(project);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), "<!doctype html>")?;
    Ok(dir)
}

fn touch(path: &Path) -> Result<()> {
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, b"img")?;
    Ok(())
}

fn load(paths: &SitePaths) -> Result<Manifest> {
    Ok(Manifest::load(&paths.manifest_file)?.expect("manifest written"))
}

fn find<'a>(manifest: &'a Manifest, folder: &str) -> &'a ProjectEntry {
    manifest
        .entries
        .iter()
        .find(|e| e.folder == folder)
        .unwrap_or_else(|| panic!("no entry for {}", folder))
}

#[test]
fn test_missing_root_bootstraps_empty_manifest() -> Result<()> {
    let (_temp, config, paths) = setup()?;

    let report = rebuild(&paths, &config)?;

    assert!(report.bootstrapped);
    assert_eq!(report.entries, 0);
    assert!(paths.projects_root.is_dir());
    assert_eq!(fs::read_to_string(&paths.manifest_file)?, "[]");
    Ok(())
}

#[test]
fn test_missing_root_keeps_existing_manifest() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    let manual: ProjectEntry = serde_json::from_value(json!({
        "id": "external-blog",
        "title": "Blog",
        "section": "React",
        "description": "",
        "folder": "",
        "thumb": "/default-thumb.png",
        "live": "https://blog.example.com"
    }))?;
    Manifest::new(vec![manual.clone()]).save(&paths.manifest_file)?;

    let report = rebuild(&paths, &config)?;

    assert!(report.bootstrapped);
    assert!(paths.projects_root.is_dir());
    assert_eq!(report.entries, 1);
    assert_eq!(report.orphans, 1);
    assert_ne!(fs::read_to_string(&paths.manifest_file)?, "[]");
    assert_eq!(load(&paths)?.entries, vec![manual]);
    Ok(())
}

#[test]
fn test_null_fields_in_previous_manifest_are_tolerated() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    add_project(&paths, "01-static", "landing")?;
    fs::create_dir_all(&paths.public)?;
    fs::write(
        &paths.manifest_file,
        r#"[{"id":"manual","title":"Manual","section":"Static","description":null,"folder":"","thumb":null,"live":"https://example.com"}]"#,
    )?;

    let report = rebuild(&paths, &config)?;

    assert_eq!(report.generated, 1);
    assert_eq!(report.orphans, 1);
    let manifest = load(&paths)?;
    let manual = manifest.get("manual").expect("manual entry kept");
    assert_eq!(manual.title, "Manual");
    assert_eq!(manual.description, "");
    assert_eq!(manual.extra["live"], json!("https://example.com"));
    Ok(())
}

#[test]
fn test_rebuild_is_idempotent() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    let landing = add_project(&paths, "01-static-websites", "landing page")?;
    touch(&landing.join("thumb.png"))?;
    let cards = add_project(&paths, "02-responsive", "cards_grid")?;
    touch(&cards.join("assests/screen.jpg"))?;
    let weather = add_project(&paths, "03-dynamic", "weather-app")?;
    fs::write(
        weather.join("meta.json"),
        r#"{ "description": "Fetches forecasts", "tech": ["js", "fetch"], "date": "2024-03-01" }"#,
    )?;

    rebuild(&paths, &config)?;
    let first = fs::read(&paths.manifest_file)?;
    rebuild(&paths, &config)?;
    let second = fs::read(&paths.manifest_file)?;
    rebuild(&paths, &config)?;
    let third = fs::read(&paths.manifest_file)?;

    assert_eq!(first, second);
    assert_eq!(second, third);

    let manifest = load(&paths)?;
    assert_eq!(manifest.len(), 3);
    let ids: Vec<_> = manifest.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["static-landing-page", "responsive-cards_grid", "dynamic-weather-app"]
    );
    Ok(())
}

#[test]
fn test_override_id_stays_after_override_removed() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    let dir = add_project(&paths, "01-static", "landing")?;
    fs::write(dir.join("meta.json"), r#"{ "id": "my-landing" }"#)?;

    rebuild(&paths, &config)?;
    assert_eq!(load(&paths)?.entries[0].id, "my-landing");

    fs::remove_file(dir.join("meta.json"))?;
    let report = rebuild(&paths, &config)?;

    let manifest = load(&paths)?;
    assert_eq!(report.entries, 1);
    assert_eq!(manifest.entries[0].id, "my-landing");
    Ok(())
}

#[test]
fn test_orphan_survives_folder_deletion() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    add_project(&paths, "01-static", "keep")?;
    let gone = add_project(&paths, "01-static", "gone")?;

    rebuild(&paths, &config)?;
    let before = find(&load(&paths)?, "/projects/01-static/gone").clone();

    fs::remove_dir_all(&gone)?;
    let report = rebuild(&paths, &config)?;

    let manifest = load(&paths)?;
    assert_eq!(report.generated, 1);
    assert_eq!(report.orphans, 1);
    assert_eq!(find(&manifest, "/projects/01-static/gone"), &before);
    Ok(())
}

#[test]
fn test_hand_edits_and_manual_entries_survive() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    add_project(&paths, "04-react", "todo")?;
    rebuild(&paths, &config)?;

    let mut manifest = load(&paths)?;
    manifest.entries[0].description = "Hooks and context".to_string();
    manifest.entries[0]
        .extra
        .insert("live".to_string(), json!("https://todo.example.com"));
    let manual: ProjectEntry = serde_json::from_value(json!({
        "id": "external-blog",
        "title": "Blog",
        "section": "React",
        "description": "",
        "folder": "",
        "thumb": "/default-thumb.png",
        "live": "https://blog.example.com"
    }))?;
    manifest.entries.push(manual.clone());
    manifest.save(&paths.manifest_file)?;

    rebuild(&paths, &config)?;

    let manifest = load(&paths)?;
    let todo = find(&manifest, "/projects/04-react/todo");
    assert_eq!(todo.description, "Hooks and context");
    assert_eq!(todo.extra["live"], json!("https://todo.example.com"));
    assert_eq!(manifest.get("external-blog"), Some(&manual));
    assert_eq!(manifest.len(), 2);
    Ok(())
}

#[test]
fn test_section_inference_from_folder_names() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    add_project(&paths, "02-Responsive-Layouts", "a")?;
    add_project(&paths, "responsive_cards", "b")?;
    add_project(&paths, "RESPONSIVE", "c")?;
    add_project(&paths, "portfolio-v2", "d")?;

    rebuild(&paths, &config)?;
    let manifest = load(&paths)?;

    assert_eq!(find(&manifest, "/projects/02-Responsive-Layouts/a").section, "Responsive");
    assert_eq!(find(&manifest, "/projects/responsive_cards/b").section, "Responsive");
    assert_eq!(find(&manifest, "/projects/RESPONSIVE/c").section, "Responsive");
    assert_eq!(find(&manifest, "/projects/portfolio-v2/d").section, "Portfolio");
    assert_eq!(find(&manifest, "/projects/portfolio-v2/d").id, "portfolio-d");
    Ok(())
}

#[test]
fn test_thumbnail_fallback_chain() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    let with_cover = add_project(&paths, "02-responsive", "gallery")?;
    touch(&with_cover.join("assets/cover.webp"))?;
    add_project(&paths, "02-responsive", "plain")?;

    rebuild(&paths, &config)?;
    let manifest = load(&paths)?;

    assert_eq!(
        find(&manifest, "/projects/02-responsive/gallery").thumb,
        "/projects/02-responsive/gallery/assets/cover.webp"
    );
    assert_eq!(
        find(&manifest, "/projects/02-responsive/plain").thumb,
        "/default-thumb.png"
    );
    Ok(())
}

#[test]
fn test_title_override_keeps_computed_fields() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    let dir = add_project(&paths, "03-dynamic", "quiz_game")?;
    fs::write(dir.join("meta.json"), r#"{ "title": "Custom Title" }"#)?;

    rebuild(&paths, &config)?;
    let entry = load(&paths)?.entries[0].clone();

    assert_eq!(entry.title, "Custom Title");
    assert_eq!(entry.section, "Dynamic");
    assert_eq!(entry.id, "dynamic-quiz_game");
    assert_eq!(entry.thumb, "/default-thumb.png");
    Ok(())
}

#[test]
fn test_empty_override_description_clears_previous_text() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    let dir = add_project(&paths, "03-dynamic", "clock")?;
    fs::write(dir.join("meta.json"), r#"{ "description": "Old text" }"#)?;
    rebuild(&paths, &config)?;
    assert_eq!(load(&paths)?.entries[0].description, "Old text");

    fs::write(dir.join("meta.json"), r#"{ "description": "" }"#)?;
    rebuild(&paths, &config)?;

    let entry = load(&paths)?.entries[0].clone();
    assert_eq!(entry.description, "");
    assert_eq!(entry.title, "Clock");
    Ok(())
}

#[test]
fn test_malformed_override_soft_fails() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    let broken = add_project(&paths, "01-static", "broken-meta")?;
    fs::write(broken.join("meta.json"), "{ \"title\": \"Oops\", }")?;
    let fine = add_project(&paths, "01-static", "fine")?;
    fs::write(fine.join("meta.json"), r#"{ "title": "Fine Project" }"#)?;

    let report = rebuild(&paths, &config)?;

    assert_eq!(report.entries, 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("broken-meta"));

    let manifest = load(&paths)?;
    let entry = find(&manifest, "/projects/01-static/broken-meta");
    assert_eq!(entry.id, "static-broken-meta");
    assert_eq!(entry.title, "Broken Meta");
    assert_eq!(entry.section, "Static");
    assert!(entry.extra.is_empty());
    assert_eq!(find(&manifest, "/projects/01-static/fine").title, "Fine Project");
    Ok(())
}

#[test]
fn test_malformed_previous_manifest_is_left_alone() -> Result<()> {
    let (_temp, config, paths) = setup()?;
    add_project(&paths, "01-static", "landing")?;
    fs::write(&paths.manifest_file, "[{ broken")?;

    let result = rebuild(&paths, &config);

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&paths.manifest_file)?, "[{ broken");
    Ok(())
}

#[test]
fn test_custom_projects_dir_and_default_thumb() -> Result<()> {
    let temp = TempDir::new()?;
    let config = Config {
        projects_dir: "work".to_string(),
        default_thumb: "/img/placeholder.webp".to_string(),
        ..Config::default()
    };
    let paths = SitePaths::from_config(&config, temp.path());
    add_project(&paths, "react", "counter")?;

    rebuild(&paths, &config)?;
    let entry = load(&paths)?.entries[0].clone();

    assert_eq!(entry.folder, "/work/react/counter");
    assert_eq!(entry.thumb, "/img/placeholder.webp");
    assert_eq!(entry.section, "React");
    Ok(())
}
