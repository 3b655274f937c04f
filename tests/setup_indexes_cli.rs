/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::*;

fn engine_config(base_dir: &Path, engine: &MockServer) -> PathBuf {
    write_config(base_dir, &format!(
        r#"
[engine]
url = "{}"
index_prefix = "test"

[[engine.custom_indexes]]
name = "local"

[[engine.custom_indexes]]
name = "archive"
"#,
        engine.url(),
    ))
}

#[test]
fn setup_indexes_creates_fixed_then_custom_indexes() {
    let base_dir = prepare_test_dirs();
    let engine = MockServer::engine(0);
    let config = engine_config(&base_dir, &engine);

    let output = run_cli(&base_dir, &config, &["setup_indexes"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(
        engine.paths("PUT"),
        vec![
            "/test_terms",
            "/test_concepts",
            "/test_resource_relations",
            "/test_resources",
            "/test_local",
            "/test_archive",
        ]
    );

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

#[test]
fn delete_indexes_removes_fixed_then_custom_indexes() {
    let base_dir = prepare_test_dirs();
    let engine = MockServer::engine(0);
    let config = engine_config(&base_dir, &engine);

    let output = run_cli(&base_dir, &config, &["delete_indexes"]);
    assert!(output.status.success());

    assert_eq!(
        engine.paths("DELETE"),
        vec![
            "/test_terms",
            "/test_concepts",
            "/test_resources",
            "/test_resource_relations",
            "/test_local",
            "/test_archive",
        ]
    );

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

#[test]
fn add_and_delete_single_index() {
    let base_dir = prepare_test_dirs();
    let engine = MockServer::engine(0);
    let config = engine_config(&base_dir, &engine);

    let output = run_cli(&base_dir, &config, &["add_index", "-n", "extra"]);
    assert!(output.status.success());

    let output = run_cli(&base_dir, &config, &["delete_index", "--name", "extra"]);
    assert!(output.status.success());

    assert_eq!(engine.paths("PUT"), vec!["/test_extra"]);
    assert_eq!(engine.paths("DELETE"), vec!["/test_extra"]);

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

#[test]
fn add_index_rejects_invalid_name() {
    let base_dir = prepare_test_dirs();
    let engine = MockServer::engine(0);
    let config = engine_config(&base_dir, &engine);

    let output = run_cli(&base_dir, &config, &["add_index", "-n", "Bad/Name"]);
    assert!(!output.status.success());
    assert!(engine.requests().is_empty());

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}
