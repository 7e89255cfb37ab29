use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("hookah.toml");
    fs::write(
        &config,
        format!(
            "[database]\ndir = {:?}\nname = \"cli\"\n\n[potency]\ndarkside = 7\n",
            dir.path().join("database")
        ),
    )
    .unwrap();
    (dir, config)
}

fn hookah(config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("hookah_store").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_init_creates_store() {
    let (dir, config) = setup();
    hookah(&config).arg("init").assert().success();
    assert!(dir.path().join("database").join("cli.db").exists());
}

#[test]
fn test_add_list_show_brands() {
    let (dir, config) = setup();
    let body = dir.path().join("body.json");
    fs::write(&body, r#"{"darkside": [{"flavour": "mint", "taste": "fresh"}]}"#).unwrap();

    let output = hookah(&config).arg("add").arg(&body).assert().success().get_output().stdout.clone();
    assert!(String::from_utf8(output).unwrap().contains("Tobacco successfully added"));

    // Same body again: duplicates come back as warnings, still a 2xx
    let output = hookah(&config).arg("add").arg(&body).assert().success().get_output().stdout.clone();
    assert!(String::from_utf8(output).unwrap().contains("Some warnings appeared"));

    let output = hookah(&config).arg("list").assert().success().get_output().stdout.clone();
    let listed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(listed["data"][0]["potency"], 7);

    hookah(&config).args(["show", "darkside"]).assert().success();
    hookah(&config).args(["show", "tangiers"]).assert().failure().code(1);

    let output = hookah(&config).arg("brands").assert().success().get_output().stdout.clone();
    let brands: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(brands, serde_json::json!({ "data": ["darkside"] }));
}

#[test]
fn test_add_from_stdin() {
    let (_dir, config) = setup();
    hookah(&config)
        .args(["add", "-"])
        .write_stdin(r#"{"musthave": [{"flavour": "pinkman"}]}"#)
        .assert()
        .success();
}

#[test]
fn test_empty_store_list_fails() {
    let (_dir, config) = setup();
    hookah(&config).arg("list").assert().failure().code(1);
}

#[test]
fn test_unknown_command_prints_usage() {
    let (_dir, config) = setup();
    hookah(&config).arg("smoke").assert().failure().code(2);
}
