use rstest::rstest;

use crate::common::{TestRepo, repo};

#[rstest]
fn test_repo_id_without_remote(mut repo: TestRepo) {
    let id = repo.wtm(&["repo-id"]).stdout.trim().to_string();
    let (name, digest) = id.rsplit_once('-').unwrap();
    assert_eq!(name, "repo");
    assert_eq!(digest.len(), 8);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()), "{id}");

    // Identical from a linked worktree
    let feature = repo.add_worktree("feature");
    let from_worktree = repo
        .wtm_command()
        .args(["-C", feature.to_str().unwrap(), "repo-id"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&from_worktree.stdout).trim(), id);
}

#[rstest]
#[case("git@github.com:acme/widgets.git", "github.com-acme-widgets")]
#[case("https://gitlab.example.com/group/sub/tool", "gitlab.example.com-group-sub-tool")]
fn test_repo_id_from_remote(repo: TestRepo, #[case] url: &str, #[case] expected: &str) {
    repo.run_git(&["remote", "add", "origin", url]);
    assert_eq!(repo.wtm(&["repo-id"]).stdout.trim(), expected);
}

#[rstest]
fn test_config_show_json(repo: TestRepo) {
    repo.run_git(&["remote", "add", "origin", "git@github.com:acme/widgets.git"]);
    repo.write_config(
        r#"{
            "paths": {"strategy": "centralized", "base": "~/trees"},
            "defaults": {"branchPrefix": "me/", "staleDays": 14},
            "repos": {"github.com-acme-widgets": {"comparisonBranch": "develop"}}
        }"#,
    );

    let output = repo.wtm(&["config", "show", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(report["configExists"], true);
    assert_eq!(report["repoId"], "github.com-acme-widgets");
    assert_eq!(report["hasOverride"], true);

    let resolved = &report["resolved"];
    assert_eq!(resolved["strategy"], "centralized");
    assert_eq!(resolved["base"], "~/trees");
    assert_eq!(resolved["branchPrefix"], "me/");
    assert_eq!(resolved["comparisonBranch"], "develop");
    assert_eq!(resolved["staleDays"], 14);
}

#[rstest]
fn test_config_show_table(repo: TestRepo) {
    repo.write_config(r#"{"hooks": {"post-create": "true"}}"#);
    let output = repo.wtm(&["config", "show"]).stdout;
    assert!(output.contains("paths.strategy"), "{output}");
    assert!(output.contains("sibling"), "{output}");
    assert!(output.contains("staleDays"), "{output}");
    assert!(output.contains("post-create"), "{output}");
}

#[rstest]
fn test_invalid_config_falls_back_to_defaults(mut repo: TestRepo) {
    repo.add_worktree("feature");
    repo.write_config("{ not json");

    let output = repo.wtm(&["list", "--format", "json"]);
    assert!(output.stderr.contains("Invalid config"), "{}", output.stderr);
    let items: Vec<serde_json::Value> = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(items.len(), 2);
}

#[rstest]
fn test_invalid_fields_warn_individually(repo: TestRepo) {
    repo.write_config(
        r#"{"paths": {"strategy": "nested"}, "defaults": {"staleDays": -3, "branchPrefix": "me/"}}"#,
    );

    let output = repo.wtm(&["config", "show", "--json"]);
    assert!(output.stderr.contains("paths.strategy must be"), "{}", output.stderr);
    assert!(output.stderr.contains("defaults.staleDays must be"), "{}", output.stderr);

    // Valid fields survive
    let report: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(report["resolved"]["strategy"], "sibling");
    assert_eq!(report["resolved"]["staleDays"], 30);
    assert_eq!(report["resolved"]["branchPrefix"], "me/");
}

#[rstest]
fn test_explicit_missing_config_warns(repo: TestRepo) {
    let missing = repo.parent_path().join("nowhere.json");
    let output = repo.wtm(&["--config", missing.to_str().unwrap(), "config", "show", "--json"]);
    assert!(output.stderr.contains("Config file not found"), "{}", output.stderr);

    let report: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(report["configExists"], false);
}

#[rstest]
fn test_config_flag_overrides_environment(repo: TestRepo) {
    let other = repo.parent_path().join("other.json");
    std::fs::write(&other, r#"{"defaults": {"staleDays": 3}}"#).unwrap();
    repo.write_config(r#"{"defaults": {"staleDays": 9}}"#);

    let output = repo.wtm(&["--config", other.to_str().unwrap(), "config", "show", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(report["resolved"]["staleDays"], 3);
}
