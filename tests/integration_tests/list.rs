use rstest::rstest;

use crate::common::{DAY, TestRepo, conditions, entry, repo, repo_with_remote};

#[rstest]
fn test_list_marks_primary_and_current(mut repo: TestRepo) {
    repo.add_worktree("feature");

    let items = repo.list_json();
    assert_eq!(items.len(), 2);

    let primary = entry(&items, "repo");
    assert_eq!(primary["is_primary"], true);
    assert_eq!(primary["is_current"], true);
    assert_eq!(primary["branch"], "main");

    let feature = entry(&items, "repo.feature");
    assert_eq!(feature["is_primary"], false);
    assert_eq!(feature["is_current"], false);
    assert_eq!(feature["branch"], "feature");
}

#[rstest]
fn test_list_current_follows_directory(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");

    let output = repo
        .wtm_command()
        .args(["-C", feature.to_str().unwrap(), "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let items: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entry(&items, "repo.feature")["is_current"], true);
    assert_eq!(entry(&items, "repo")["is_current"], false);
}

#[rstest]
fn test_list_dirty_worktree(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    std::fs::write(feature.join("untracked.txt"), "x").unwrap();

    let items = repo.list_json();
    assert_eq!(conditions(entry(&items, "repo.feature")), ["dirty"]);
    assert!(conditions(entry(&items, "repo")).is_empty());
}

#[rstest]
fn test_list_merged_branch_behind_main(mut repo: TestRepo) {
    repo.add_worktree("done");
    repo.commit("Advance main");

    let items = repo.list_json();
    let done = entry(&items, "repo.done");
    assert_eq!(conditions(done), ["merged"]);
    assert_eq!(done["status"]["sync"], "behind");
    assert_eq!(done["status"]["ahead"], 0);
    assert_eq!(done["status"]["behind"], 1);
    assert_eq!(done["status"]["comparison_branch"], "main");

    // The mainline compared against its own local branch is not measured
    let primary = entry(&items, "repo");
    assert_eq!(primary["status"]["base"], "self_compare");
    assert!(primary["status"]["sync"].is_null());
}

#[rstest]
fn test_list_unmerged_work_is_not_merged(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.commit_in(&feature, "Feature work");
    repo.commit("Advance main");

    let items = repo.list_json();
    let feature = entry(&items, "repo.feature");
    assert!(conditions(feature).is_empty());
    assert_eq!(feature["status"]["sync"], "diverged");
}

#[rstest]
fn test_list_compares_against_remote(#[from(repo_with_remote)] mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.commit_in(&feature, "One");
    repo.commit_in(&feature, "Two");

    let items = repo.list_json();
    let feature = entry(&items, "repo.feature");
    assert_eq!(feature["status"]["comparison_branch"], "origin/main");
    assert_eq!(feature["status"]["sync"], "ahead");
    assert_eq!(feature["status"]["ahead"], 2);

    // origin/main is remote-qualified, so the mainline is measured too
    let primary = entry(&items, "repo");
    assert_eq!(primary["status"]["sync"], "synced");
}

#[rstest]
fn test_list_stale_threshold(mut repo: TestRepo) {
    let old = repo.add_worktree("old");
    repo.commit_with_age(&old, "Old work", 40 * DAY);

    let items = repo.list_json();
    assert_eq!(conditions(entry(&items, "repo.old")), ["stale"]);

    repo.write_config(r#"{"defaults": {"staleDays": 60}}"#);
    let items = repo.list_json();
    assert!(conditions(entry(&items, "repo.old")).is_empty());
}

#[rstest]
fn test_list_orphaned_worktree(mut repo: TestRepo) {
    let gone = repo.add_worktree("gone");
    std::fs::remove_dir_all(&gone).unwrap();

    let items = repo.list_json();
    let gone = entry(&items, "repo.gone");
    assert_eq!(conditions(gone), ["orphan"]);
    assert!(gone["status"]["base"].is_null());
    assert!(gone["status"]["last_commit"].is_null());
}

#[rstest]
fn test_list_missing_comparison_branch(repo: TestRepo) {
    repo.run_git(&["branch", "-m", "main", "trunk"]);

    let items = repo.list_json();
    let primary = entry(&items, "repo");
    assert_eq!(primary["status"]["base"], "missing");
    assert!(primary["status"]["comparison_branch"].is_null());

    let table = repo.wtm(&["list"]).stdout;
    assert!(table.contains("no base"), "{table}");
}

#[rstest]
fn test_list_configured_comparison_branch(mut repo: TestRepo) {
    repo.create_branch("develop");
    let feature = repo.add_worktree("feature");
    repo.commit_in(&feature, "Work");
    repo.write_config(r#"{"defaults": {"comparisonBranch": "develop"}}"#);

    let items = repo.list_json();
    let feature = entry(&items, "repo.feature");
    assert_eq!(feature["status"]["comparison_branch"], "develop");
    assert_eq!(feature["status"]["ahead"], 1);
}

#[rstest]
fn test_list_table(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    std::fs::write(feature.join("scratch.txt"), "x").unwrap();
    repo.run_git(&["worktree", "lock", feature.to_str().unwrap()]);

    let output = repo.wtm(&["list"]);
    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(lines.len(), 3, "{}", output.stdout);

    let header: Vec<&str> = lines[0].split_whitespace().collect();
    assert_eq!(header, ["Name", "Branch", "Status", "Sync", "Age", "Path"]);
    assert!(lines[1].starts_with("@  repo "), "{}", lines[1]);
    assert!(lines[2].contains("dirty locked"), "{}", lines[2]);
    assert!(lines[2].ends_with("repo.feature"), "{}", lines[2]);
}

#[test]
fn test_list_outside_repository() {
    let repo = TestRepo::new();
    let outside = tempfile::TempDir::new().unwrap();

    let output = repo
        .wtm_command()
        .args(["-C", outside.path().to_str().unwrap(), "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not in a git repository"), "{stderr}");
}
