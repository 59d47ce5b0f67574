// tests/integration_test.rs
use std::fs;
use std::path::Path;
use std::process::Command;

use git2::{Repository, Signature};
use releaser::git::{Git2Reader, GitReader, BRANCH_NAME_ENV_VAR};
use serial_test::serial;
use tempfile::TempDir;

const RELEASER_BIN: &str = env!("CARGO_BIN_EXE_releaser");

const STRATEGY: &str = r#"
[applications.api]
images = [{ repository = "registry.example.com/api", platforms = ["linux/amd64"] }]

[[applications.api.on_commit_msg]]
match = "*"
tags = [{ type = "git_commit_sha", size = 10 }]

[[applications.api.on_commit_msg]]
match = ["release", "hotfix"]
tags = [{ type = "version", file = "VERSION", prefix = "v" }]
"#;

// Helper function to setup a temporary git repo for testing
fn setup_test_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init(temp_dir.path()).expect("Could not init git repo");
    {
        let mut config = repo.config().expect("Could not get config");
        config
            .set_str("user.name", "Test User")
            .expect("Could not set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Could not set user.email");
    }
    (temp_dir, repo)
}

fn commit_file(repo: &Repository, root: &Path, name: &str, content: &str, message: &str) {
    fs::write(root.join(name), content).expect("Could not write file");

    let mut index = repo.index().expect("Could not get index");
    index
        .add_path(Path::new(name))
        .expect("Could not add file to index");
    index.write().expect("Could not write index");

    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let signature = Signature::now("Test User", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .expect("Could not create commit");
}

fn release_repo() -> (TempDir, Repository) {
    let (dir, repo) = setup_test_repo();
    commit_file(&repo, dir.path(), "releaser.toml", STRATEGY, "chore: add strategy");
    commit_file(&repo, dir.path(), "VERSION", "4.2.0\n", "release 4.2.0");
    (dir, repo)
}

fn releaser(dir: &Path) -> Command {
    let mut command = Command::new(RELEASER_BIN);
    command.current_dir(dir).env_remove("RELEASER_WEBHOOK_URL");
    command
}

#[test]
fn test_releaser_help() {
    let output = Command::new(RELEASER_BIN)
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("create-manifest"));
    assert!(stdout.contains("bake-manifest"));
}

#[test]
fn test_create_manifest_from_repository() {
    let (dir, repo) = release_repo();
    let sha = repo.head().unwrap().peel_to_commit().unwrap().id().to_string();

    let output = releaser(dir.path())
        .arg("create-manifest")
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let manifest: serde_json::Value =
        serde_json::from_str(String::from_utf8(output.stdout).unwrap().trim()).unwrap();
    let images = manifest["applications"]["api"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["tag"], sha[..10]);
    assert_eq!(images[1]["image"], "registry.example.com/api:v4.2.0");
    assert_eq!(
        images[1]["platforms"]["linux/amd64"]["tag"],
        "v4.2.0-amd64"
    );
}

#[test]
fn test_create_manifest_refuses_existing_output() {
    let (dir, _repo) = release_repo();
    fs::write(dir.path().join("manifest.json"), "{}").unwrap();

    let output = releaser(dir.path())
        .args(["create-manifest", "--output", "manifest.json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("already exists"), "stderr: {}", stderr);
    assert_eq!(fs::read_to_string(dir.path().join("manifest.json")).unwrap(), "{}");
}

#[test]
fn test_analyze_manifest_outside_repository() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("manifest.json"),
        r#"{"applications":{"api":{"images":[{"repository":"api","image":"api:1.0","tag":"1.0"},{"repository":"api","image":"api:latest","tag":"latest"}]}}}"#,
    )
    .unwrap();

    let output = releaser(dir.path())
        .args(["analyze-manifest", "-i", "manifest.json", "--list-images"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap().trim(),
        r#"["api:1.0","api:latest"]"#
    );
}

#[test]
fn test_analyze_manifest_exclusive_list_flags() {
    let dir = TempDir::new().unwrap();
    let output = releaser(dir.path())
        .args(["analyze-manifest", "--list-tags", "--list-images"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Cannot combine"), "stderr: {}", stderr);
}

#[test]
fn test_upload_manifest_rejects_invalid_url() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("manifest.json"), r#"{"applications":{}}"#).unwrap();

    let output = releaser(dir.path())
        .args(["upload-manifest", "-i", "manifest.json", "--webhook-url", "not-a-url"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("Invalid webhook URL"));
}

// ============================================================================
// Git2Reader against real repositories
// ============================================================================

#[test]
fn test_history_is_most_recent_first() {
    let (dir, repo) = setup_test_repo();
    commit_file(&repo, dir.path(), "a.txt", "a", "first");
    commit_file(&repo, dir.path(), "b.txt", "b", "second\n\nwith a body");
    commit_file(&repo, dir.path(), "c.txt", "c", "third");

    let git = Git2Reader::open(dir.path()).unwrap();
    assert_eq!(git.commit_message_history(20).unwrap(), vec!["third", "second", "first"]);
    assert_eq!(git.commit_message_history(2).unwrap(), vec!["third", "second"]);
}

#[test]
fn test_empty_repository_has_no_history() {
    let (dir, _repo) = setup_test_repo();
    let git = Git2Reader::open(dir.path()).unwrap();
    assert!(git.commit_message_history(20).unwrap().is_empty());
    assert!(!git.is_dirty().unwrap());
}

#[test]
fn test_dirty_detection_ignores_untracked_files() {
    let (dir, repo) = setup_test_repo();
    commit_file(&repo, dir.path(), "tracked.txt", "v1", "initial");
    let git = Git2Reader::open(dir.path()).unwrap();

    fs::write(dir.path().join("untracked.txt"), "new").unwrap();
    assert!(!git.is_dirty().unwrap());

    fs::write(dir.path().join("tracked.txt"), "v2").unwrap();
    assert!(git.is_dirty().unwrap());
}

#[test]
#[serial]
fn test_branch_name_from_repository() {
    std::env::remove_var(BRANCH_NAME_ENV_VAR);
    let (dir, repo) = setup_test_repo();
    commit_file(&repo, dir.path(), "a.txt", "a", "initial");
    let current = repo.head().unwrap().shorthand().unwrap().to_string();

    let git = Git2Reader::open(dir.path()).unwrap();
    assert_eq!(git.current_branch().unwrap(), current);
}

#[test]
#[serial]
fn test_branch_name_from_environment() {
    let (dir, repo) = setup_test_repo();
    commit_file(&repo, dir.path(), "a.txt", "a", "initial");
    let git = Git2Reader::open(dir.path()).unwrap();

    std::env::set_var(BRANCH_NAME_ENV_VAR, "ci-branch");
    let branch = git.current_branch();
    std::env::remove_var(BRANCH_NAME_ENV_VAR);

    assert_eq!(branch.unwrap(), "ci-branch");
}
