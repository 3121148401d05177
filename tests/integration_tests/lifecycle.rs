use rstest::rstest;

use crate::common::{TestRepo, canonicalize, conditions, entry, repo};

fn branch_exists(repo: &TestRepo, branch: &str) -> bool {
    repo.git_command()
        .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")])
        .output()
        .unwrap()
        .status
        .success()
}

#[rstest]
fn test_create_places_sibling_worktree(repo: TestRepo) {
    let output = repo.wtm(&["create", "feature"]);

    let expected = repo.parent_path().join("repo.feature");
    assert_eq!(output.stdout.trim(), expected.to_str().unwrap());
    assert!(expected.join("file.txt").exists());
    assert!(branch_exists(&repo, "feature"));
    assert!(output.stderr.contains("Created branch and worktree for feature"), "{}", output.stderr);

    let items = repo.list_json();
    assert_eq!(entry(&items, "repo.feature")["branch"], "feature");
}

#[rstest]
fn test_create_applies_branch_prefix(repo: TestRepo) {
    repo.write_config(r#"{"defaults": {"branchPrefix": "me/"}}"#);
    let output = repo.wtm(&["create", "feature"]);

    let expected = repo.parent_path().join("repo.me-feature");
    assert_eq!(output.stdout.trim(), expected.to_str().unwrap());
    assert!(branch_exists(&repo, "me/feature"));
    assert!(!branch_exists(&repo, "feature"));
}

#[rstest]
fn test_create_existing_branch_skips_prefix(repo: TestRepo) {
    repo.create_branch("topic");
    repo.write_config(r#"{"defaults": {"branchPrefix": "me/"}}"#);

    let output = repo.wtm(&["create", "topic", "--base", "main"]);
    assert_eq!(
        output.stdout.trim(),
        repo.parent_path().join("repo.topic").to_str().unwrap()
    );
    assert!(!branch_exists(&repo, "me/topic"));
    assert!(output.stderr.contains("ignoring --base"), "{}", output.stderr);
}

#[rstest]
fn test_create_from_base(mut repo: TestRepo) {
    let other = repo.add_worktree("other");
    repo.commit_in(&other, "Other work");
    let other_head = repo.git_output(&["rev-parse", "other"]);

    repo.wtm(&["create", "stacked", "--base", "other"]);
    assert_eq!(repo.git_output(&["rev-parse", "stacked"]), other_head);
}

#[rstest]
fn test_create_rejects_checked_out_branch(repo: TestRepo) {
    repo.wtm(&["create", "feature"]);
    let output = repo.wtm_fails(&["create", "feature"]);
    assert!(output.stderr.contains("already checked out"), "{}", output.stderr);
}

#[rstest]
fn test_create_rejects_existing_directory(repo: TestRepo) {
    std::fs::create_dir(repo.parent_path().join("repo.feature")).unwrap();
    let output = repo.wtm_fails(&["create", "feature"]);
    assert!(output.stderr.contains("Directory already exists"), "{}", output.stderr);
}

#[rstest]
fn test_path_matches_create(repo: TestRepo) {
    let predicted = repo.wtm(&["path", "fix/login"]).stdout;
    let created = repo.wtm(&["create", "fix/login"]).stdout;
    assert_eq!(predicted, created);
    assert!(predicted.trim().ends_with("repo.fix-login"));
}

#[rstest]
fn test_centralized_placement(repo: TestRepo) {
    let base = repo.parent_path().join("trees");
    repo.write_config(&format!(
        r#"{{"paths": {{"strategy": "centralized", "base": "{}"}}}}"#,
        base.display()
    ));

    let output = repo.wtm(&["create", "feature"]);
    let expected = base.join("repo").join("feature");
    assert_eq!(output.stdout.trim(), expected.to_str().unwrap());
    assert!(expected.exists());
}

#[rstest]
fn test_centralized_relative_base(repo: TestRepo) {
    repo.write_config(r#"{"paths": {"strategy": "centralized", "base": "../trees"}}"#);
    let output = repo.wtm(&["path", "feature"]);
    let expected = repo.parent_path().join("trees").join("repo").join("feature");
    assert_eq!(output.stdout.trim(), expected.to_str().unwrap());
}

#[rstest]
fn test_remove_with_branch(repo: TestRepo) {
    repo.wtm(&["create", "feature"]);
    let path = repo.parent_path().join("repo.feature");

    let output = repo.wtm(&["remove", "feature", "-D"]);
    assert!(!path.exists());
    assert!(!branch_exists(&repo, "feature"));
    assert!(output.stderr.contains("Deleted branch feature"), "{}", output.stderr);
    assert_eq!(repo.list_json().len(), 1);
}

#[rstest]
fn test_remove_keeps_unmerged_branch(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.commit_in(&feature, "Unmerged");

    // Worktree goes; branch deletion refuses and only warns
    let output = repo.wtm(&["remove", "feature", "-D"]);
    assert!(!feature.exists());
    assert!(branch_exists(&repo, "feature"));
    assert!(output.stderr.contains("--force -D"), "{}", output.stderr);
}

#[rstest]
fn test_remove_dirty_requires_force(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    std::fs::write(feature.join("wip.txt"), "wip").unwrap();

    let output = repo.wtm_fails(&["remove", "feature"]);
    assert!(output.stderr.contains("Failed to remove worktree"), "{}", output.stderr);
    assert!(feature.exists());

    repo.wtm(&["remove", "feature", "--force"]);
    assert!(!feature.exists());
}

#[rstest]
fn test_remove_primary_refused(repo: TestRepo) {
    let output = repo.wtm_fails(&["remove", "repo"]);
    assert!(output.stderr.contains("primary worktree cannot be removed"), "{}", output.stderr);
}

#[rstest]
fn test_remove_unknown_worktree(repo: TestRepo) {
    let output = repo.wtm_fails(&["remove", "nope"]);
    assert!(output.stderr.contains("No worktree named nope"), "{}", output.stderr);
}

#[rstest]
fn test_remove_orphan_prunes(mut repo: TestRepo) {
    let gone = repo.add_worktree("gone");
    std::fs::remove_dir_all(&gone).unwrap();
    assert_eq!(conditions(entry(&repo.list_json(), "repo.gone")), ["orphan"]);

    repo.wtm(&["remove", "repo.gone"]);
    assert_eq!(repo.list_json().len(), 1);
}

#[rstest]
fn test_remove_current_worktree_from_inside(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.write_config(r#"{"hooks": {"post-delete": "pwd -P > deleted.txt"}}"#);

    let output = repo
        .wtm_command()
        .current_dir(&feature)
        .args(["remove", "@", "-D"])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{stderr}");
    assert!(!feature.exists());
    assert!(!branch_exists(&repo, "feature"), "{stderr}");

    // post-delete still fires, from the primary worktree
    let marker = std::fs::read_to_string(repo.root_path().join("deleted.txt")).unwrap();
    assert_eq!(marker.trim(), repo.root_path().to_str().unwrap());
}

#[rstest]
fn test_remove_current_worktree_via_flag(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.write_config(r#"{"hooks": {"post-delete": "touch deleted"}}"#);

    repo.wtm(&["-C", feature.to_str().unwrap(), "remove", "@"]);
    assert!(!feature.exists());
    assert!(repo.root_path().join("deleted").exists());
}

#[rstest]
fn test_rename_moves_directory(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");

    let output = repo.wtm(&["rename", "feature", "login"]);
    let moved = repo.parent_path().join("login");
    assert!(!feature.exists());
    assert!(moved.join("file.txt").exists());
    assert!(output.stderr.contains("Renamed repo.feature to login"), "{}", output.stderr);

    let items = repo.list_json();
    let login = entry(&items, "login");
    assert_eq!(login["branch"], "feature");
    assert_eq!(
        canonicalize(std::path::Path::new(login["path"].as_str().unwrap())).unwrap(),
        canonicalize(&moved).unwrap()
    );
}

#[rstest]
fn test_rename_refuses_primary_and_existing_target(mut repo: TestRepo) {
    let output = repo.wtm_fails(&["rename", "repo", "other"]);
    assert!(output.stderr.contains("Cannot rename the primary worktree"), "{}", output.stderr);

    repo.add_worktree("feature");
    std::fs::create_dir(repo.parent_path().join("taken")).unwrap();
    let output = repo.wtm_fails(&["rename", "feature", "taken"]);
    assert!(output.stderr.contains("Directory already exists"), "{}", output.stderr);
}

#[rstest]
fn test_lock_and_unlock(mut repo: TestRepo) {
    repo.add_worktree("feature");

    repo.wtm(&["lock", "feature", "--reason", "on a usb drive"]);
    let items = repo.list_json();
    assert_eq!(entry(&items, "repo.feature")["locked"], "on a usb drive");

    let output = repo.wtm(&["lock", "feature"]);
    assert!(output.stderr.contains("already locked"), "{}", output.stderr);

    let output = repo.wtm_fails(&["remove", "feature"]);
    assert!(output.stderr.contains("worktree is locked (on a usb drive)"), "{}", output.stderr);

    repo.wtm(&["unlock", "feature"]);
    assert!(entry(&repo.list_json(), "repo.feature")["locked"].is_null());

    let output = repo.wtm(&["unlock", "feature"]);
    assert!(output.stderr.contains("is not locked"), "{}", output.stderr);
}

#[rstest]
fn test_force_removes_locked_worktree(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.wtm(&["lock", "feature"]);

    repo.wtm(&["remove", "feature", "--force"]);
    assert!(!feature.exists());
}
