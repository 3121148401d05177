use std::time::{Duration, Instant};

use rstest::rstest;

use crate::common::{TestRepo, repo};

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
        .trim()
        .to_string()
}

#[rstest]
fn test_post_create_environment(repo: TestRepo) {
    repo.write_config(
        r#"{"hooks": {"post-create": "printf '%s|%s|%s|%s' \"$WT_NAME\" \"$WT_BRANCH\" \"$WT_HOOK\" \"$WT_REPO_ID\" > hook.txt"}}"#,
    );
    let repo_id = repo.wtm(&["repo-id"]).stdout.trim().to_string();

    let output = repo.wtm(&["create", "feature"]);
    // Runs inside the new worktree
    let written = read(&repo.parent_path().join("repo.feature").join("hook.txt"));
    assert_eq!(written, format!("repo.feature|feature|post-create|{repo_id}"));
    assert!(output.stderr.contains("Running post-create hook"), "{}", output.stderr);
}

#[rstest]
fn test_hook_output_is_prefixed(repo: TestRepo) {
    repo.write_config(r#"{"hooks": {"post-create": "echo installing deps"}}"#);
    let output = repo.wtm(&["create", "feature"]);
    assert!(
        output.stderr.contains("[post-create] installing deps"),
        "{}",
        output.stderr
    );
    // stdout carries only the path
    assert_eq!(output.stdout.lines().count(), 1);
}

#[rstest]
fn test_failing_hook_stops_sequence_but_not_command(repo: TestRepo) {
    repo.write_config(r#"{"hooks": {"post-create": ["touch first", "exit 3", "touch third"]}}"#);

    let output = repo.wtm(&["create", "feature"]);
    let worktree = repo.parent_path().join("repo.feature");
    assert!(worktree.join("first").exists());
    assert!(!worktree.join("third").exists());
    assert!(output.stderr.contains("failed (exit 3)"), "{}", output.stderr);
    assert!(output.stderr.contains("Skipped 1 remaining"), "{}", output.stderr);
}

#[rstest]
fn test_continue_on_error(repo: TestRepo) {
    repo.write_config(
        r#"{"hooks": {"post-create": {"commands": ["exit 1", "touch after"], "continueOnError": true}}}"#,
    );
    repo.wtm(&["create", "feature"]);
    assert!(repo.parent_path().join("repo.feature").join("after").exists());
}

#[rstest]
fn test_hook_timeout(repo: TestRepo) {
    repo.write_config(
        r#"{"hooks": {"post-create": {"commands": "sleep 30", "timeoutSeconds": 1}}}"#,
    );
    let start = Instant::now();
    let output = repo.wtm(&["create", "feature"]);
    assert!(start.elapsed() < Duration::from_secs(20));
    assert!(output.stderr.contains("timed out after 1s"), "{}", output.stderr);
}

#[rstest]
fn test_no_hooks_flag(repo: TestRepo) {
    repo.write_config(r#"{"hooks": {"post-create": "touch ran"}}"#);
    repo.wtm(&["create", "feature", "--no-hooks"]);
    assert!(!repo.parent_path().join("repo.feature").join("ran").exists());
}

#[rstest]
fn test_post_delete_runs_in_repository_root(repo: TestRepo) {
    repo.write_config(
        r#"{"hooks": {"post-delete": "printf '%s %s' \"$WT_NAME\" \"$WT_PATH\" > deleted.txt"}}"#,
    );
    repo.wtm(&["create", "feature"]);
    let path = repo.parent_path().join("repo.feature");

    repo.wtm(&["remove", "feature"]);
    assert_eq!(
        read(&repo.root_path().join("deleted.txt")),
        format!("repo.feature {}", path.display())
    );
}

#[rstest]
fn test_post_rename_old_and_new(mut repo: TestRepo) {
    let old = repo.add_worktree("feature");
    repo.write_config(
        r#"{"hooks": {"post-rename": "printf '%s -> %s' \"$WT_OLD_NAME\" \"$WT_NAME\" > renamed.txt"}}"#,
    );

    repo.wtm(&["rename", "feature", "login"]);
    let new = repo.parent_path().join("login");
    assert_eq!(read(&new.join("renamed.txt")), "repo.feature -> login");
    assert!(!old.exists());
}

#[rstest]
fn test_post_select(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.write_config(r#"{"hooks": {"post-select": "pwd -P > selected.txt"}}"#);

    let output = repo.wtm(&["select", "feature"]);
    assert_eq!(output.stdout.trim(), feature.to_str().unwrap());
    assert_eq!(read(&feature.join("selected.txt")), feature.to_str().unwrap());
}

#[rstest]
fn test_repo_override_replaces_global_hook(repo: TestRepo) {
    let repo_id = repo.wtm(&["repo-id"]).stdout.trim().to_string();
    repo.write_config(&format!(
        r#"{{
            "hooks": {{"post-create": "touch global", "post-select": "touch selected"}},
            "repos": {{"{repo_id}": {{"hooks": {{"post-create": "touch override"}}}}}}
        }}"#
    ));

    repo.wtm(&["create", "feature"]);
    let worktree = repo.parent_path().join("repo.feature");
    assert!(worktree.join("override").exists());
    assert!(!worktree.join("global").exists());

    // Hook types the override doesn't name keep the global commands
    repo.wtm(&["select", "feature"]);
    assert!(worktree.join("selected").exists());
}

#[rstest]
fn test_hook_run_command(mut repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    repo.write_config(r#"{"hooks": {"post-create": "echo \"$WT_HOOK\" > manual.txt"}}"#);

    repo.wtm(&["hook", "run", "post-create", "feature"]);
    assert_eq!(read(&feature.join("manual.txt")), "post-create");

    // Defaults to the current worktree
    repo.wtm(&["hook", "run", "post-create"]);
    assert_eq!(read(&repo.root_path().join("manual.txt")), "post-create");

    let output = repo.wtm(&["hook", "run", "post-rename"]);
    assert!(output.stderr.contains("No post-rename hook configured"), "{}", output.stderr);
}

#[rstest]
fn test_hook_show(repo: TestRepo) {
    repo.write_config(
        r#"{"hooks": {"post-create": {"commands": ["npm ci", "npm run build"], "timeoutSeconds": 120}}}"#,
    );
    let output = repo.wtm(&["hook", "show"]).stdout;
    assert!(output.contains("post-create"), "{output}");
    assert!(output.contains("global, timeout 120s"), "{output}");
    assert!(output.contains("npm run build"), "{output}");
    assert!(output.contains("(none)"), "{output}");

    let only = repo.wtm(&["hook", "show", "post-delete"]).stdout;
    assert!(!only.contains("post-create"), "{only}");
}

#[rstest]
fn test_invalid_timeout_warns_and_defaults(repo: TestRepo) {
    repo.write_config(r#"{"hooks": {"post-create": {"commands": "true", "timeoutSeconds": 0}}}"#);
    let output = repo.wtm(&["hook", "show"]);
    assert!(output.stdout.contains("timeout 30s"), "{}", output.stdout);
    assert!(
        output.stderr.contains("hooks.post-create.timeoutSeconds must be positive"),
        "{}",
        output.stderr
    );
}
