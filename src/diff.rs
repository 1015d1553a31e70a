//! Diff source resolution
//!
//! Picks the git comparison that defines the change set for this run, then
//! collects changed and deleted paths from it. A failed git invocation
//! yields an empty list, never an error: the gate treats "nothing reported"
//! as "nothing to check". Failures are still visible at debug level.

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

/// Empty-tree object id for SHA-1 repositories, used when even
/// `git hash-object` is unavailable
const EMPTY_TREE_ID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Which git comparison produces the change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffMode {
    /// Index vs HEAD (`git diff --cached`)
    Staged,
    /// Working tree vs HEAD
    WorkingTree,
    /// Two named revisions
    CommitRange { base: String, head: String },
}

impl DiffMode {
    pub fn label(&self) -> &'static str {
        match self {
            DiffMode::Staged => "staged",
            DiffMode::WorkingTree => "working-tree",
            DiffMode::CommitRange { .. } => "commit-range",
        }
    }
}

fn run_git(args: &[&str], cwd: &Path) -> std::io::Result<Output> {
    Command::new("git").args(args).current_dir(cwd).output()
}

/// Non-empty stdout lines of a git invocation; spawn failure or non-zero
/// exit yields no lines
pub(crate) fn git_lines(args: &[&str], cwd: &Path) -> Vec<String> {
    match run_git(args, cwd) {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Ok(out) => {
            debug!(
                "git {} exited with {:?}: {}",
                args.join(" "),
                out.status.code(),
                String::from_utf8_lossy(&out.stderr).trim()
            );
            Vec::new()
        }
        Err(err) => {
            debug!("git {} could not run: {}", args.join(" "), err);
            Vec::new()
        }
    }
}

/// Resolve the diff mode for this invocation context.
///
/// Priority: explicit `GOVERNANCE_DIFF_MODE` override, then a CI-provided
/// `GITHUB_BASE_SHA`/`GITHUB_SHA` pair, then working-tree outside CI. Under
/// CI with no explicit pair, the previous commit is the base when it exists;
/// on a single-commit branch the empty tree is.
pub fn detect_diff_mode(root: &Path, env: &HashMap<String, String>) -> DiffMode {
    match env.get("GOVERNANCE_DIFF_MODE").map(String::as_str) {
        Some("staged") => return DiffMode::Staged,
        Some("working-tree") => return DiffMode::WorkingTree,
        _ => {}
    }

    let base = env.get("GITHUB_BASE_SHA").filter(|v| !v.is_empty());
    let head = env.get("GITHUB_SHA").filter(|v| !v.is_empty());
    if let (Some(base), Some(head)) = (base, head) {
        return DiffMode::CommitRange {
            base: base.clone(),
            head: head.clone(),
        };
    }

    if env.get("CI").map_or(true, |v| v.is_empty()) {
        return DiffMode::WorkingTree;
    }

    let base = if rev_exists("HEAD~1", root) {
        "HEAD~1".to_string()
    } else {
        empty_tree_id(root)
    };
    DiffMode::CommitRange {
        base,
        head: "HEAD".to_string(),
    }
}

fn rev_exists(rev: &str, cwd: &Path) -> bool {
    run_git(&["rev-parse", "--verify", rev], cwd)
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn empty_tree_id(cwd: &Path) -> String {
    match run_git(&["hash-object", "-t", "tree", "/dev/null"], cwd) {
        Ok(out) if out.status.success() => {
            let id = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if id.is_empty() {
                EMPTY_TREE_ID.to_string()
            } else {
                id
            }
        }
        _ => EMPTY_TREE_ID.to_string(),
    }
}

fn diff_args(mode: &DiffMode, list_flag: &str) -> Vec<String> {
    match mode {
        DiffMode::Staged => vec!["diff".into(), "--cached".into(), list_flag.into()],
        DiffMode::WorkingTree => vec!["diff".into(), list_flag.into(), "HEAD".into()],
        DiffMode::CommitRange { base, head } => {
            vec!["diff".into(), list_flag.into(), base.clone(), head.clone()]
        }
    }
}

/// Changed and deleted paths for `mode`. Two invocations: a name-only list
/// for the changed set and a name-status list to recover deletions.
pub fn collect_changed_and_deleted(root: &Path, mode: &DiffMode) -> (Vec<String>, Vec<String>) {
    let changed_args = diff_args(mode, "--name-only");
    let refs: Vec<&str> = changed_args.iter().map(String::as_str).collect();
    let changed = git_lines(&refs, root);

    let status_args = diff_args(mode, "--name-status");
    let refs: Vec<&str> = status_args.iter().map(String::as_str).collect();
    let deleted = deleted_from_status(&git_lines(&refs, root));

    (changed, deleted)
}

/// All tracked paths in the repository
pub fn tracked_files(root: &Path) -> Vec<String> {
    git_lines(&["ls-files"], root)
}

fn deleted_from_status(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let status = fields.next()?;
            let path = fields.next_back()?;
            if status.starts_with('D') {
                Some(path.to_string())
            } else {
                None
            }
        })
        .collect()
}
