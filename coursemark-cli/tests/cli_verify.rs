use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn healthy_content(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    write(
        root,
        "modules/intro.md",
        "---\nslug: intro\ntitle: Introduction\n---\n# Page: Welcome\n## Text\ncontent:: Hello and welcome.\n",
    )?;
    write(
        root,
        "courses/default.md",
        "---\nslug: default\ntitle: Default\n---\n# Module: [[../modules/intro]]\n",
    )?;
    Ok(())
}

#[test]
fn verify_passes_on_healthy_content() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    healthy_content(&dir.path().join("content"))?;
    write(dir.path(), "coursemark.yml", "content_dir: content\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("coursemark")?
        .current_dir(dir.path())
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 modules, 1 courses, 0 errors"));
    Ok(())
}

#[test]
fn verify_fails_and_reports_location() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "modules/intro.md",
        "---\nslug: intro\ntitle: Introduction\n---\n# Uncategorized:\n## Lens:\nsource:: [[../Lenses/missing]]\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("coursemark")?
        .arg("--content")
        .arg(dir.path())
        .arg("verify")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "modules/intro.md:7: error: Referenced lens not found: Lenses/missing",
        ));
    Ok(())
}

#[test]
fn verify_json_counts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    healthy_content(dir.path())?;
    write(dir.path(), "video_transcripts/orphan.timestamps.json", "[]")?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("coursemark")?
        .arg("--content")
        .arg(dir.path())
        .args(["verify", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value["errors"], 0);
    assert_eq!(value["warnings"], 1);
    assert_eq!(value["production"], 1);
    assert_eq!(
        value["diagnostics"][0]["file"],
        "video_transcripts/orphan.timestamps.json"
    );
    Ok(())
}

#[test]
fn verify_fail_on_warnings() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    healthy_content(&dir.path().join("content"))?;
    write(
        &dir.path().join("content"),
        "video_transcripts/orphan.timestamps.json",
        "[]",
    )?;
    write(
        dir.path(),
        "coursemark.yml",
        "content_dir: content\nfail_on_warnings: true\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("coursemark")?
        .current_dir(dir.path())
        .arg("verify")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn build_writes_result_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    healthy_content(&dir.path().join("content"))?;
    write(
        dir.path(),
        "coursemark.yml",
        "content_dir: content\noutput: build/content.json\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("coursemark")?
        .current_dir(dir.path())
        .args(["build", "--pretty"])
        .assert()
        .success();

    let json = fs::read_to_string(dir.path().join("build/content.json"))?;
    let value: Value = serde_json::from_str(&json)?;
    assert!(value["generatedAt"].is_string());
    assert_eq!(value["modules"][0]["slug"], "intro");
    assert_eq!(value["modules"][0]["sections"][0]["type"], "page");
    assert_eq!(value["courses"][0]["progression"][0]["slug"], "intro");
    assert_eq!(value["errors"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[test]
fn urls_lists_sources() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "articles/a.md",
        "---\ntitle: A\nsource_url: https://example.com/a\n---\nBody.\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("coursemark")?
        .arg("--content")
        .arg(dir.path())
        .arg("urls")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://example.com/a\tarticles/a.md:3\tarticle source",
        ));
    Ok(())
}

#[test]
fn missing_config_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    #[allow(deprecated)]
    Command::cargo_bin("coursemark")?
        .current_dir(dir.path())
        .arg("verify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--content"));
    Ok(())
}
