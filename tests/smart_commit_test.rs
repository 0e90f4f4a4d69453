//! Smart-commit partitioner integration tests against a real git repo.

mod common;

use common::TestEnv;
use distui::cleanup::{CleanupAction, build_items, execute_plan, partition};
use distui::git::GitClient;

fn seed_five_files(env: &TestEnv) {
    env.write_file("a.go", "package main\n");
    env.write_file("README.md", "# demo\n");
    env.write_file("image.png", "\u{89}PNG fake\n");
    env.write_file("notes.txt", "scratch\n");
    env.write_file("b.go", "package main\n");
}

#[test]
fn test_default_actions_commit_only_source() {
    let env = TestEnv::new();
    seed_five_files(&env);

    let git = GitClient::new(env.project_dir.path());
    let items = build_items(&git.status().unwrap(), None);
    assert_eq!(items.len(), 5);

    let plan = partition(&items).unwrap();
    let mut committed: Vec<&str> = plan.to_commit.iter().map(|f| f.path.as_str()).collect();
    committed.sort();
    assert_eq!(committed, vec!["a.go", "b.go"]);
    assert_eq!(plan.message, "Update source code");

    let hash = execute_plan(&git, &plan).unwrap();
    assert!(!hash.is_empty());

    // The docs and unknown files are untouched; the image is ignored.
    let after = git.status().unwrap();
    let mut remaining: Vec<&str> = after.iter().map(|e| e.path.as_str()).collect();
    remaining.sort();
    assert_eq!(remaining, vec![".gitignore", "README.md", "notes.txt"]);

    let ignore = std::fs::read_to_string(env.project_dir.path().join(".gitignore")).unwrap();
    assert!(ignore.lines().any(|l| l == "image.png"));
    assert!(env.project_dir.path().join("image.png").exists());
}

#[test]
fn test_explicit_actions_override_defaults() {
    let env = TestEnv::new();
    seed_five_files(&env);

    let git = GitClient::new(env.project_dir.path());
    let mut items = build_items(&git.status().unwrap(), None);
    for item in &mut items {
        item.action = CleanupAction::Commit;
    }

    let plan = partition(&items).unwrap();
    assert_eq!(plan.to_commit.len(), 5);
    assert!(plan.ignore_additions.is_empty());

    execute_plan(&git, &plan).unwrap();
    assert!(git.status().unwrap().is_empty());
    assert!(git.is_tracked("image.png"));
}

#[test]
fn test_ignoring_tracked_file_stops_reporting_it() {
    let env = TestEnv::new();
    env.write_file("data.bin", "v1");
    env.git(&["add", "data.bin"]);
    env.git(&["commit", "-m", "add data"]);

    // The file changes; the operator decides to ignore it from now on.
    env.write_file("data.bin", "v2");
    env.write_file("a.go", "package main\n");

    let git = GitClient::new(env.project_dir.path());
    let mut items = build_items(&git.status().unwrap(), None);
    for item in &mut items {
        if item.file.path == "data.bin" {
            item.action = CleanupAction::Ignore;
        }
    }

    let plan = partition(&items).unwrap();
    execute_plan(&git, &plan).unwrap();

    // Still on disk, no longer reported as changed.
    assert!(env.project_dir.path().join("data.bin").exists());
    let remaining: Vec<String> = git
        .status()
        .unwrap()
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert!(!remaining.contains(&"data.bin".to_string()));
}

#[test]
fn test_ignore_additions_are_idempotent_across_runs() {
    let env = TestEnv::new();
    env.write_file("image.png", "fake");
    env.write_file("a.go", "package main\n");

    let git = GitClient::new(env.project_dir.path());
    let items = build_items(&git.status().unwrap(), None);
    let plan = partition(&items).unwrap();
    execute_plan(&git, &plan).unwrap();

    // A second run with the same ignore path must not duplicate the entry.
    env.write_file("b.go", "package main\n");
    let mut items = build_items(&git.status().unwrap(), None);
    for item in &mut items {
        if item.file.path == "image.png" {
            item.action = CleanupAction::Ignore;
        }
    }
    // image.png is already ignored so it no longer shows in status; the
    // synthetic decision exercises the idempotent append path instead.
    let mut plan = partition(&items).unwrap();
    plan.ignore_additions.push("image.png".to_string());
    execute_plan(&git, &plan).unwrap();

    let ignore = std::fs::read_to_string(env.project_dir.path().join(".gitignore")).unwrap();
    let count = ignore.lines().filter(|l| *l == "image.png").count();
    assert_eq!(count, 1);
}

#[test]
fn test_deleted_file_is_staged_delete_aware() {
    let env = TestEnv::new();
    env.write_file("old.go", "package main\n");
    env.git(&["add", "old.go"]);
    env.git(&["commit", "-m", "add old"]);

    std::fs::remove_file(env.project_dir.path().join("old.go")).unwrap();

    let git = GitClient::new(env.project_dir.path());
    let items = build_items(&git.status().unwrap(), None);
    assert_eq!(items.len(), 1);

    let plan = partition(&items).unwrap();
    execute_plan(&git, &plan).unwrap();

    assert!(git.status().unwrap().is_empty());
    assert!(!git.is_tracked("old.go"));
}
