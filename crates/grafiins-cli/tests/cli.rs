//! End-to-end tests for the `grafiins` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Command rooted at `dir`, with the user config directory redirected into it.
fn grafiins_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("grafiins"));
    cmd.current_dir(dir);
    cmd.env("GRAFIINS_LOG", "error");
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg-config"));
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = grafiins_cmd(dir)
        .arg("--json")
        .args(args)
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn demo_exports_reference_graph() {
    let dir = TempDir::new().expect("temp dir");
    let json = run_json(dir.path(), &["demo", "--out-dir", "out"]);

    assert_eq!(json["vertices"], 14);
    assert_eq!(json["edges"], 11);
    assert_eq!(json["cyclic_before"], false);
    assert_eq!(json["cyclic_with_extra_edge"], true);
    assert_eq!(json["cyclic_after_removal"], false);
    assert_eq!(
        json["cycle"],
        serde_json::json!(["v3", "v10", "v11", "v9", "v3"])
    );

    let checks = json["reachability"].as_array().expect("reachability array");
    assert_eq!(checks.len(), 11);
    assert_eq!(checks[0]["connected"], true);
    assert_eq!(checks[5]["connected"], false);

    let vertices = std::fs::read_to_string(dir.path().join("out/vertices.csv")).expect("vertices");
    assert!(vertices.starts_with(
        "vertex_i,label,graphviz_shape,graphviz_cluster,graphviz_width,graphviz_height\n"
    ));
    assert!(vertices.contains("\n4,v4,doublecircle,outputs,0.4,0\n"));

    let edges = std::fs::read_to_string(dir.path().join("out/edges.csv")).expect("edges");
    assert!(edges.starts_with("edge_i,src_vertex_i,dst_vertex_i,label\n0,3,4,e0\n"));
    assert_eq!(edges.lines().count(), 12);
}

#[test]
fn demo_human_output() {
    let dir = TempDir::new().expect("temp dir");
    grafiins_cmd(dir.path())
        .args(["demo", "--out-dir", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reference graph: 14 vertices, 11 edges"))
        .stdout(predicate::str::contains("v3 -> v10 -> v11 -> v9 -> v3"));
}

#[test]
fn project_config_changes_export_format() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("grafiins.toml"),
        "[export]\nedge_file = \"links.csv\"\nedge_handle_column = \"id\"\ndelimiter = \";\"\n",
    )
    .expect("write config");

    let json = run_json(dir.path(), &["demo", "--out-dir", "."]);
    assert!(
        json["export"]["edge_path"]
            .as_str()
            .expect("edge path")
            .ends_with("links.csv")
    );

    let edges = std::fs::read_to_string(dir.path().join("links.csv")).expect("edges");
    assert!(edges.starts_with("id;src_vertex_i;dst_vertex_i;label\n"));
}

#[test]
fn malformed_config_fails_with_code() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("grafiins.toml"), "[graph\n").expect("write config");

    grafiins_cmd(dir.path())
        .args(["churn", "--steps", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().expect("temp dir");
    grafiins_cmd(dir.path())
        .args(["--config", "absent.toml", "churn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn churn_is_deterministic() {
    let dir = TempDir::new().expect("temp dir");
    let a = run_json(dir.path(), &["churn", "--seed", "11", "--steps", "400"]);
    let b = run_json(dir.path(), &["churn", "--seed", "11", "--steps", "400"]);
    assert_eq!(a, b);
    assert_eq!(a["seed"], 11);
    assert_eq!(a["steps"], 400);
}

#[test]
fn dag_churn_never_reports_a_cycle() {
    let dir = TempDir::new().expect("temp dir");
    let json = run_json(dir.path(), &["churn", "--seed", "5", "--steps", "600", "--dag"]);
    assert_eq!(json["dag"], true);
    assert_eq!(json["cyclic"], false);
    assert!(json["cycle"].is_null());
}

#[test]
fn parallel_flag_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let json = run_json(dir.path(), &["churn", "--steps", "50", "--parallel"]);
    assert_eq!(json["allow_parallel_edges"], true);
    assert!(json["rejections"].get("E2001").is_none());
}

#[test]
fn churn_human_output() {
    let dir = TempDir::new().expect("temp dir");
    grafiins_cmd(dir.path())
        .args(["churn", "--seed", "2", "--steps", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Churned graph for 20 steps (seed 2)"));
}

#[cfg(target_os = "linux")]
#[test]
fn user_config_is_read_from_isolated_config_home() {
    let dir = TempDir::new().expect("temp dir");
    let user_dir = dir.path().join("xdg-config/grafiins");
    std::fs::create_dir_all(&user_dir).expect("create user config dir");
    std::fs::write(user_dir.join("config.toml"), "[export]\ndelimiter = \";\"\n")
        .expect("write user config");

    run_json(dir.path(), &["demo", "--out-dir", "out"]);
    let edges = std::fs::read_to_string(dir.path().join("out/edges.csv")).expect("edges");
    assert!(edges.starts_with("edge_i;src_vertex_i;dst_vertex_i;label\n"));

    // A sibling directory without a user config keeps the defaults.
    let clean = TempDir::new().expect("temp dir");
    run_json(clean.path(), &["demo", "--out-dir", "out"]);
    let edges = std::fs::read_to_string(clean.path().join("out/edges.csv")).expect("edges");
    assert!(edges.starts_with("edge_i,src_vertex_i,dst_vertex_i,label\n"));
}
