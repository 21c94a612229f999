//! CLI argument and picker validation tests (no network I/O).
//!
//! Every run points `SHOTGEN_REPLAY` at an empty cassette, so any request that
//! slipped past validation would fail with "Cassette exhausted" instead of
//! reaching a live endpoint.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shotgen");
    cmd.env("SHOTGEN_REPLAY", fixtures_dir().join("empty.cassette.yaml"))
        .env("SHOTGEN_CONFIG", "/nonexistent/shotgen/config.toml")
        .env_remove("SHOTGEN_ENDPOINT")
        .env_remove("SHOTGEN_REC")
        .env_remove("RUST_LOG");
    cmd
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn write_png(dir: &std::path::Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::DynamicImage::new_rgb8(16, 16).save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}

#[test]
fn missing_image_is_a_validation_notice() {
    cmd()
        .arg("mug on wooden table")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please upload an image and enter a prompt"))
        .stderr(predicate::str::contains("Cassette exhausted").not());
}

#[test]
fn empty_prompt_is_a_validation_notice() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "mug.png");

    cmd()
        .args(["--image", image.to_str().unwrap(), ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please upload an image and enter a prompt"))
        .stderr(predicate::str::contains("Cassette exhausted").not());
}

#[test]
fn invalid_aspect_ratio_exits_with_error() {
    cmd()
        .args(["--aspect-ratio", "21:9", "a mug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported aspect ratio '21:9'"));
}

#[test]
fn unsupported_file_type_rejected_by_picker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mug.gif");
    std::fs::write(&path, b"GIF89a").unwrap();

    cmd()
        .args(["--image", path.to_str().unwrap(), "a mug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type 'mug.gif'"));
}

#[test]
fn oversized_file_rejected_by_picker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.jpg");
    std::fs::write(&path, vec![0u8; 10 * 1024 * 1024 + 1]).unwrap();

    cmd()
        .args(["--image", path.to_str().unwrap(), "a mug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File is too large"));
}

#[test]
fn zero_timeout_rejected() {
    cmd()
        .args(["--timeout", "0", "a mug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout must be at least 1 second"));
}

#[test]
fn interactive_conflicts_with_prompt() {
    cmd().args(["--interactive", "a mug"]).assert().failure();
}
