use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture() -> PathBuf {
    let path = repo_root().join("fixtures").join("passengers.csv");
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn run_json(args: &[&str], stdin: Option<&str>) -> Value {
    let exe = assert_cmd::cargo_bin!("steerage-cli");
    let mut cmd = Command::new(exe);
    cmd.args(args);
    if let Some(text) = stdin {
        cmd.write_stdin(text);
    }
    let assert = cmd.assert().success();
    serde_json::from_slice(&assert.get_output().stdout).expect("stdout is JSON")
}

#[test]
fn cli_lays_out_fixture_table() {
    let layout = run_json(
        &["layout", "--pretty", fixture().to_string_lossy().as_ref()],
        None,
    );

    let nodes = layout["nodes"].as_array().unwrap();
    let links = layout["links"].as_array().unwrap();
    assert!(!nodes.is_empty());
    assert!(!links.is_empty());

    // Four classes feed into yes/no.
    let sources: Vec<&str> = nodes
        .iter()
        .filter(|n| n["depth"] == 0)
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(sources, ["1st", "2nd", "3rd", "crew"]);

    let total_links: f64 = links.iter().map(|l| l["value"].as_f64().unwrap()).sum();
    assert_eq!(total_links, 14.0);
}

#[test]
fn cli_aggregates_age_buckets_from_stdin() {
    let text = std::fs::read_to_string(fixture()).unwrap();
    let graph = run_json(&["aggregate", "--source", "age", "--target", "survived"], Some(&text));

    let child_total: u64 = graph["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["source"] == "child")
        .map(|l| l["value"].as_u64().unwrap())
        .sum();
    assert_eq!(child_total, 3);
}

#[test]
fn cli_geometry_flags_override_defaults() {
    let layout = run_json(
        &[
            "layout",
            "--width",
            "400",
            "--height",
            "300",
            fixture().to_string_lossy().as_ref(),
        ],
        None,
    );
    assert_eq!(layout["width"], 400.0);
    assert_eq!(layout["height"], 300.0);
}

#[test]
fn cli_reads_config_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config_path = tmp.path().join("flow.json");
    std::fs::write(
        &config_path,
        r#"{"categories":{"child_label":"enfant","adult_label":"adulte"}}"#,
    )
    .unwrap();

    let graph = run_json(
        &[
            "aggregate",
            "--source",
            "age",
            "--target",
            "survived",
            "--config",
            config_path.to_string_lossy().as_ref(),
            fixture().to_string_lossy().as_ref(),
        ],
        None,
    );

    let ids: Vec<&str> = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"enfant"));
    assert!(ids.contains(&"adulte"));
}

#[test]
fn cli_computes_survival_fraction() {
    let out = run_json(
        &["survival", "--child", fixture().to_string_lossy().as_ref()],
        None,
    );
    // Children: ages 8 (yes), 15 (no), 2 (no).
    let p = out["probability"].as_f64().unwrap();
    assert!((p - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn cli_rejects_identical_selectors() {
    let exe = assert_cmd::cargo_bin!("steerage-cli");
    Command::new(exe)
        .args([
            "layout",
            "--source",
            "class",
            "--target",
            "class",
            fixture().to_string_lossy().as_ref(),
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn cli_rejects_unknown_attribute() {
    let exe = assert_cmd::cargo_bin!("steerage-cli");
    Command::new(exe)
        .args(["layout", "--source", "cabin"])
        .write_stdin("class,survived\n1st,yes\n")
        .assert()
        .failure()
        .code(1);
}
