//! CLI integration tests for creature-rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../runtime/creature-module/tests/data/hero.json")
}

fn creature_rs() -> Command {
    let mut cmd = Command::cargo_bin("creature-rs").unwrap();
    cmd.env_remove("CREATURE_ANIMATION")
        .env_remove("CREATURE_FRAMES")
        .env_remove("CREATURE_DELTA")
        .env_remove("CREATURE_TIME_SCALE")
        .env_remove("CREATURE_SETTINGS");
    cmd
}

#[test]
fn test_info() {
    creature_rs()
        .arg("info")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("hero.png"))
        .stdout(predicate::str::contains("idle"))
        .stdout(predicate::str::contains("stretch"));
}

#[test]
fn test_info_detailed() {
    creature_rs()
        .args(["info", "--detailed"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Bones ==="))
        .stdout(predicate::str::contains("body"))
        .stdout(predicate::str::contains("arm"));
}

#[test]
fn test_info_missing_file() {
    creature_rs()
        .args(["info", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load creature document"));
}

#[test]
fn test_tree() {
    creature_rs()
        .args(["tree", "--no-color"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("hero.json"))
        .stdout(predicate::str::contains("└── 🦴 arm"));
}

#[test]
fn test_play() {
    creature_rs()
        .args(["play", "--animation", "slide", "--frames", "5"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing 'slide'"))
        .stdout(predicate::str::contains("5.00"));
}

#[test]
fn test_play_writes_frames() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("frames.json");

    creature_rs()
        .args(["play", "-a", "slide", "-n", "3", "--cache", "--mirror-y", "-o"])
        .arg(&output)
        .arg(fixture())
        .assert()
        .success();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["animation"], "slide");
    let frames = written["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2]["points"].as_array().unwrap().len(), 4);
    assert!(frames[2]["points"][0][1].as_f64().unwrap() < 0.0);
}

#[test]
fn test_play_animation_from_env() {
    creature_rs()
        .env("CREATURE_ANIMATION", "wave")
        .args(["play", "--frames", "1"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing 'wave'"));
}

#[test]
fn test_play_settings_file() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.json");
    std::fs::write(
        &settings,
        r#"{ "animation": "idle", "should_loop": false, "custom_time_range": { "start": 2, "end": 4 } }"#,
    )
    .unwrap();

    creature_rs()
        .args(["play", "--frames", "4", "--settings"])
        .arg(&settings)
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing 'idle'"))
        .stdout(predicate::str::contains("4.00"));
}

#[test]
fn test_play_requires_animation() {
    creature_rs()
        .arg("play")
        .arg(fixture())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No animation given"));
}

#[test]
fn test_play_unknown_animation() {
    creature_rs()
        .args(["play", "--animation", "run"])
        .arg(fixture())
        .assert()
        .failure()
        .stderr(predicate::str::contains("run"));
}

#[test]
fn test_contact() {
    creature_rs()
        .args(["contact", "-a", "idle", "-x", "0.5", "-y", "0.1"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact bone: root"));
}

#[test]
fn test_contact_posed() {
    creature_rs()
        .args(["contact", "-a", "wave", "-x", "1.0", "-y", "0.9", "-t", "10", "-r", "0.2"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact bone: arm"));
}

#[test]
fn test_contact_miss() {
    creature_rs()
        .args(["contact", "-a", "idle", "-x", "-3", "-y", "4"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("No bone within"));
}

#[test]
fn test_completions() {
    creature_rs()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("creature-rs"));
}
