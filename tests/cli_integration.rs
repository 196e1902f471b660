//! CLI integration tests for Flotilla
//!
//! These tests verify the complete workflow from initialization through
//! committing, configuring and planning deployments, ensuring commands work
//! together correctly.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the flotilla binary
fn flotilla_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("flotilla"))
}

/// Create a temporary directory and initialize a flotilla workspace
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    flotilla_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Write a release metadata file into the workspace
fn write_release(dir: &TempDir, file: &str, contents: &str) {
    fs::write(dir.path().join(file), contents).unwrap();
}

/// Parse a command's stdout as JSON
fn json_stdout(assert: &assert_cmd::assert::Assert) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    flotilla_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized flotilla workspace"));

    // Verify directory structure
    assert!(dir.path().join(".flotilla").is_dir());
    assert!(dir.path().join(".flotilla/config.toml").is_file());
    assert!(dir.path().join(".flotilla/.gitignore").is_file());
    assert!(dir.path().join(".flotilla/state.json").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    // First init
    flotilla_cmd().arg("init").arg(dir.path()).assert().success();

    // Second init should also succeed
    flotilla_cmd().arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_init_json_reports_success() {
    let dir = TempDir::new().unwrap();

    let output = flotilla_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert!(json["success"].as_bool().unwrap());
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Initialized flotilla workspace"));
}

// =============================================================================
// Environment Tests
// =============================================================================

#[test]
fn test_env_create() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created environment: staging"));
}

#[test]
fn test_env_create_existing_is_reported() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment 'dev' already exists"));
}

#[test]
fn test_env_create_rejects_invalid_name() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "no spaces!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid environment name"));
}

#[test]
fn test_env_list_shows_environments() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "prod"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("prod"));
}

#[test]
fn test_env_create_with_inputs() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "prod", "-i", "region=eu-west-1", "-i", "replicas=3"])
        .assert()
        .success();

    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "list", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let envs = json.as_array().unwrap();
    assert_eq!(envs.len(), 1);
    assert_eq!(envs[0]["name"].as_str().unwrap(), "prod");
    assert_eq!(envs[0]["inputs"]["region"].as_str().unwrap(), "eu-west-1");
    assert_eq!(envs[0]["inputs"]["replicas"].as_u64().unwrap(), 3);
}

// =============================================================================
// Deployment Tests
// =============================================================================

#[test]
fn test_deployment_create() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "create", "api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created deployment: api"));
}

#[test]
fn test_deployment_create_nested_path() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "create", "api:migrator"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created deployment: api:migrator"));

    // The nested record hangs off the parent's deploy stage
    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "show", "api", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let nested = &json["deployment"]["stages"]["deploy"]["deployments"]["migrator"];
    assert_eq!(nested["name"].as_str().unwrap(), "migrator");
}

#[test]
fn test_deployment_show_resolves_nested_path() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "create", "api:migrator", "--stage", "build"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "show", "api:migrator", "--stage", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployment: migrator"));

    // The same path does not resolve under the deploy stage
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "show", "api:migrator"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("was not created under this stage"));
}

#[test]
fn test_deployment_list_empty() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No deployments in environment 'dev'"));
}

#[test]
fn test_deployment_list_shows_table() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    write_release(&dir, "release.yml", "name: api\nversion: \"1.0\"\n");
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME"))
        .stdout(predicate::str::contains("api"))
        .stdout(predicate::str::contains("_/api"));
}

#[test]
fn test_deployment_list_filters_by_stage() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    write_release(&dir, "release.yml", "name: api\nversion: \"1.0\"\n");
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api", "--stage", "build"])
        .assert()
        .success();

    // Committed into build only, so the deploy filter finds nothing
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "list", "--stage", "deploy"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No deployments with a deploy stage in environment 'dev'",
        ));

    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "list", "--stage", "build", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let deployments = json.as_array().unwrap();
    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments[0]["build"].as_str().unwrap(), "1.0");
    assert!(deployments[0]["deploy"].is_null());
}

#[test]
fn test_deployment_providers_index() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    write_release(
        &dir,
        "postgres.yml",
        "name: postgres\nversion: \"11.0\"\nprovides:\n  - postgres\n",
    );
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "postgres", "--file", "postgres.yml"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "providers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INTERFACE"))
        .stdout(predicate::str::contains("postgres"));

    // Restricted to one interface type
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "providers", "postgres"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres: postgres"));

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "providers", "vault"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No deployments provide 'vault'"));
}

// =============================================================================
// Release Commit Tests
// =============================================================================

#[test]
fn test_release_commit() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    write_release(&dir, "release.yml", "name: archive\nversion: \"0.1\"\n");

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "archive-depl"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Committed _/archive-v0.1 to archive-depl (deploy stage)",
        ));
}

#[test]
fn test_release_commit_json_reports_version() {
    let dir = setup_workspace();

    write_release(
        &dir,
        "release.yml",
        "project: acme\nname: archive\nversion: \"0.1\"\n",
    );

    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "archive-depl", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["environment"].as_str().unwrap(), "dev");
    assert_eq!(json["path"].as_str().unwrap(), "archive-depl");
    assert_eq!(json["stage"].as_str().unwrap(), "deploy");
    assert_eq!(json["release"].as_str().unwrap(), "acme/archive");
    assert_eq!(json["version"].as_str().unwrap(), "0.1");
}

#[test]
fn test_release_commit_into_build_stage() {
    let dir = setup_workspace();

    write_release(&dir, "release.yml", "name: archive\nversion: \"0.2\"\n");

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "archive-depl", "--stage", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(build stage)"));

    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "show", "archive-depl", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let stages = &json["deployment"]["stages"];
    assert_eq!(stages["build"]["version"].as_str().unwrap(), "0.2");
    assert!(stages["deploy"].is_null());
}

#[test]
fn test_release_commit_missing_file() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read release file"));
}

#[test]
fn test_release_commit_rejects_incomplete_metadata() {
    let dir = setup_workspace();

    write_release(&dir, "release.yml", "name: archive\nversion: \"\"\n");

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing version field"));
}

// =============================================================================
// Provider Configuration Tests
// =============================================================================

#[test]
fn test_release_configure_binds_deployment_named_after_type() {
    let dir = setup_workspace();

    write_release(
        &dir,
        "postgres.yml",
        "name: postgres\nversion: \"11.0\"\nprovides:\n  - postgres\n",
    );
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "postgres", "--file", "postgres.yml"])
        .assert()
        .success();

    write_release(
        &dir,
        "api.yml",
        "name: api\nversion: \"1.0\"\nconsumes:\n  - postgres\n",
    );
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api", "--file", "api.yml"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "api", "--file", "api.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configured providers for api"))
        .stdout(predicate::str::contains("postgres -> postgres"));
}

#[test]
fn test_release_configure_explicit_provider_flag() {
    let dir = setup_workspace();

    write_release(
        &dir,
        "k8s.yml",
        "name: k8s\nversion: \"1.28\"\nprovides:\n  - kubernetes\n",
    );
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "k8s-prod", "--file", "k8s.yml"])
        .assert()
        .success();

    write_release(
        &dir,
        "api.yml",
        "name: api\nversion: \"1.0\"\nconsumes:\n  - kubernetes\n",
    );

    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args([
            "release",
            "configure",
            "api",
            "--file",
            "api.yml",
            "-p",
            "kubernetes=k8s-prod",
            "--format",
            "json",
        ])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["providers"]["kubernetes"].as_str().unwrap(), "k8s-prod");
}

#[test]
fn test_release_configure_missing_provider() {
    let dir = setup_workspace();

    write_release(
        &dir,
        "api.yml",
        "name: api\nversion: \"1.0\"\nconsumes:\n  - vault\n",
    );

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "api", "--file", "api.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing provider of type 'vault'"))
        .stderr(predicate::str::contains("-p / --provider"));
}

#[test]
fn test_release_configure_missing_aliased_provider() {
    let dir = setup_workspace();

    write_release(
        &dir,
        "api.yml",
        "name: api\nversion: \"1.0\"\nconsumes:\n  - postgres as db\n",
    );

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "api", "--file", "api.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Missing provider 'db' of type 'postgres'",
        ));
}

#[test]
fn test_release_configure_nothing_to_configure() {
    let dir = setup_workspace();

    write_release(&dir, "api.yml", "name: api\nversion: \"1.0\"\n");

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "api", "--file", "api.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No consumed interfaces to configure for api",
        ));
}

// =============================================================================
// Release Diff Tests
// =============================================================================

#[test]
fn test_release_diff_reports_changes() {
    let dir = setup_workspace();

    write_release(
        &dir,
        "old.yml",
        "name: api\nversion: \"1.0\"\nprovides:\n  - http\n",
    );
    write_release(
        &dir,
        "new.yml",
        "name: api\nversion: \"2.0\"\nprovides:\n  - http\n  - metrics\n",
    );

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "diff", "old.yml", "new.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Changes from _/api-v1.0 to _/api-v2.0:",
        ))
        .stdout(predicate::str::contains(r#"version: "1.0" -> "2.0""#))
        .stdout(predicate::str::contains(r#"provides added: "metrics""#));
}

#[test]
fn test_release_diff_no_changes() {
    let dir = setup_workspace();

    write_release(&dir, "release.yml", "name: api\nversion: \"1.0\"\n");

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "diff", "release.yml", "release.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes between"));
}

#[test]
fn test_release_diff_json_lists_typed_changes() {
    let dir = setup_workspace();

    write_release(&dir, "old.yml", "name: api\nversion: \"1.0\"\n");
    write_release(&dir, "new.yml", "name: api\nversion: \"2.0\"\n");

    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "diff", "old.yml", "new.yml", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let changes = json.as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["field"].as_str().unwrap(), "version");
    assert_eq!(changes[0]["kind"].as_str().unwrap(), "modified");
    assert_eq!(changes[0]["previous"].as_str().unwrap(), "1.0");
    assert_eq!(changes[0]["current"].as_str().unwrap(), "2.0");
}

// =============================================================================
// Plan Tests
// =============================================================================

/// Commit a provider and a consumer release, then bind them
fn setup_provider_consumer(dir: &TempDir) {
    write_release(
        dir,
        "postgres.yml",
        "name: postgres\nversion: \"11.0\"\nprovides:\n  - postgres\n",
    );
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "postgres", "--file", "postgres.yml"])
        .assert()
        .success();

    write_release(
        dir,
        "api.yml",
        "name: api\nversion: \"1.0\"\nconsumes:\n  - postgres\n",
    );
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api", "--file", "api.yml"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "api", "--file", "api.yml"])
        .assert()
        .success();
}

#[test]
fn test_plan_orders_providers_first() {
    let dir = setup_workspace();
    setup_provider_consumer(&dir);

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployment order for 'dev'"))
        .stdout(predicate::str::contains("1. postgres (root)"))
        .stdout(predicate::str::contains("2. api (after postgres)"));
}

#[test]
fn test_plan_json_lists_roots_and_order() {
    let dir = setup_workspace();
    setup_provider_consumer(&dir);

    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["plan", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["roots"].as_array().unwrap().len(), 1);
    assert_eq!(json["roots"][0].as_str().unwrap(), "postgres");

    let order: Vec<&str> = json["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["postgres", "api"]);
}

#[test]
fn test_plan_empty_environment() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No deployments with a deploy stage in environment 'dev'",
        ));
}

#[test]
fn test_plan_skips_providers_without_the_stage() {
    let dir = setup_workspace();

    // vault never gets a release committed, so it holds no deploy stage
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "create", "vault"])
        .assert()
        .success();

    write_release(
        &dir,
        "api.yml",
        "name: api\nversion: \"1.0\"\nconsumes:\n  - vault\n",
    );
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api", "--file", "api.yml"])
        .assert()
        .success();
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "api", "--file", "api.yml"])
        .assert()
        .success();

    // The binding to vault imposes no ordering; api plans as a root
    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["plan", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let order: Vec<&str> = json["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["api"]);
    assert_eq!(json["roots"][0].as_str().unwrap(), "api");
}

#[test]
fn test_plan_detects_cycles() {
    let dir = setup_workspace();

    write_release(
        &dir,
        "a.yml",
        "name: a\nversion: \"1.0\"\nprovides:\n  - type-a\nconsumes:\n  - type-b\n",
    );
    write_release(
        &dir,
        "b.yml",
        "name: b\nversion: \"1.0\"\nprovides:\n  - type-b\nconsumes:\n  - type-a\n",
    );

    for (depl, file) in [("a", "a.yml"), ("b", "b.yml")] {
        flotilla_cmd()
            .current_dir(dir.path())
            .args(["release", "commit", depl, "--file", file])
            .assert()
            .success();
    }

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "a", "--file", "a.yml", "-p", "type-b=b"])
        .assert()
        .success();
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "configure", "b", "--file", "b.yml", "-p", "type-a=a"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency cycle detected"));
}

// =============================================================================
// Inputs Tests
// =============================================================================

#[test]
fn test_inputs_layer_environment_and_deployment() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev", "-i", "region=eu-west-1", "-i", "replicas=1"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "create", "api", "-i", "replicas=3"])
        .assert()
        .success();

    // The deployment's own value wins over the environment default
    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["inputs", "api", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["inputs"]["region"].as_str().unwrap(), "eu-west-1");
    assert_eq!(json["inputs"]["replicas"].as_u64().unwrap(), 3);
}

#[test]
fn test_inputs_text_output() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "create", "api", "-i", "replicas=3"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["inputs", "api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inputs for 'api' (deploy stage):"))
        .stdout(predicate::str::contains("replicas = 3"));
}

#[test]
fn test_inputs_empty() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "create", "api"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["inputs", "api"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No inputs for 'api' in environment 'dev'",
        ));
}

// =============================================================================
// Verbose Flag Tests
// =============================================================================

#[test]
fn test_verbose_flag() {
    let dir = setup_workspace();

    // Verbose should show debug output to stderr
    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["--verbose", "env", "list"])
        .assert()
        .success();

    let stderr = String::from_utf8_lossy(&output.get_output().stderr);
    assert!(stderr.contains("[verbose]"));
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_not_in_workspace_error() {
    let dir = TempDir::new().unwrap();

    // Running commands without init should fail
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a flotilla workspace"));
}

#[test]
fn test_unknown_environment_error() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "list", "-e", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Environment 'ghost' does not exist"));
}

#[test]
fn test_deployment_show_missing_deployment() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "dev"])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Deployment 'ghost' does not exist"));
}

#[test]
fn test_invalid_stage_argument() {
    let dir = setup_workspace();

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["plan", "--stage", "test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid stage 'test'"));
}

// =============================================================================
// Full Workflow Integration Test
// =============================================================================

#[test]
fn test_full_workflow() {
    let dir = setup_workspace();

    // 1. Create a production environment with a region default
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["env", "create", "prod", "-i", "region=eu-west-1"])
        .assert()
        .success();

    // 2. Commit the infrastructure releases
    write_release(
        &dir,
        "k8s.yml",
        "name: k8s\nversion: \"1.28\"\nprovides:\n  - kubernetes\n",
    );
    write_release(
        &dir,
        "postgres.yml",
        "name: postgres\nversion: \"11.0\"\nprovides:\n  - postgres\nconsumes:\n  - kubernetes\n",
    );
    write_release(
        &dir,
        "api.yml",
        "name: api\nversion: \"2.1\"\nconsumes:\n  - kubernetes\n  - postgres as db\n",
    );

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "k8s-prod", "-e", "prod", "--file", "k8s.yml"])
        .assert()
        .success();
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "postgres", "-e", "prod", "--file", "postgres.yml"])
        .assert()
        .success();
    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "commit", "api", "-e", "prod", "--file", "api.yml"])
        .assert()
        .success();

    // 3. Bind providers: postgres runs on the cluster, api uses both
    flotilla_cmd()
        .current_dir(dir.path())
        .args([
            "release",
            "configure",
            "postgres",
            "-e",
            "prod",
            "--file",
            "postgres.yml",
            "-p",
            "kubernetes=k8s-prod",
        ])
        .assert()
        .success();

    flotilla_cmd()
        .current_dir(dir.path())
        .args([
            "release",
            "configure",
            "api",
            "-e",
            "prod",
            "--file",
            "api.yml",
            "-p",
            "kubernetes=k8s-prod",
            "-p",
            "db=postgres",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("db -> postgres"))
        .stdout(predicate::str::contains("kubernetes -> k8s-prod"));

    // 4. The plan puts the cluster first and the api last
    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["plan", "-e", "prod", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let order: Vec<&str> = json["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["k8s-prod", "postgres", "api"]);
    assert_eq!(json["roots"].as_array().unwrap().len(), 1);
    assert_eq!(json["roots"][0].as_str().unwrap(), "k8s-prod");

    // 5. The api inherits the environment's region input
    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["inputs", "api", "-e", "prod", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["inputs"]["region"].as_str().unwrap(), "eu-west-1");

    // 6. A new api release diffs cleanly against the committed one
    write_release(
        &dir,
        "api-next.yml",
        "name: api\nversion: \"2.2\"\nconsumes:\n  - kubernetes\n  - postgres as db\n",
    );

    flotilla_cmd()
        .current_dir(dir.path())
        .args(["release", "diff", "api.yml", "api-next.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"version: "2.1" -> "2.2""#));

    // 7. Every deployment shows its committed version
    let output = flotilla_cmd()
        .current_dir(dir.path())
        .args(["deployment", "list", "-e", "prod", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let deployments = json.as_array().unwrap();
    assert_eq!(deployments.len(), 3);
    for deployment in deployments {
        assert!(deployment["deploy"].as_str().is_some());
    }
}
