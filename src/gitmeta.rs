use std::path::Path;

use regex::Regex;
use tracing::debug;

/// Remote URL and branch recovered from a repository's metadata files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoInfo {
    pub url: Option<String>,
    pub branch: Option<String>,
}

/// Outcome of probing a directory for git metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoProbe {
    /// No `.git` directory under the root.
    NotARepo,
    /// Metadata files exist but neither a URL nor a branch could be recovered.
    Unparsable,
    Found(RepoInfo),
}

/// Read `<root>/.git/config` and `<root>/.git/HEAD` and recover the origin
/// remote URL and current branch. Used only for building deep links; every
/// degraded outcome means "no deep link available", never a hard failure.
pub fn probe(root: &Path) -> RepoProbe {
    let git_dir = root.join(".git");
    if !git_dir.is_dir() {
        return RepoProbe::NotARepo;
    }

    let url = std::fs::read_to_string(git_dir.join("config"))
        .ok()
        .and_then(|content| origin_url(&content));
    let branch = std::fs::read_to_string(git_dir.join("HEAD"))
        .ok()
        .and_then(|content| head_branch(&content));

    if url.is_none() && branch.is_none() {
        debug!(root = %root.display(), "git metadata present but unparsable");
        return RepoProbe::Unparsable;
    }

    RepoProbe::Found(RepoInfo { url, branch })
}

/// Extract the `origin` remote URL from git config text, sanitized for
/// linking. The scan is bounded to the `[remote "origin"]` section.
pub fn origin_url(config: &str) -> Option<String> {
    let re = Regex::new(r#"\[remote "origin"\][^\[]*?url\s*=\s*(\S+)"#).unwrap();
    re.captures(config).map(|caps| sanitize_url(&caps[1]))
}

/// Extract the branch name from HEAD file content (`ref: refs/heads/<branch>`).
/// A detached HEAD (bare commit SHA) yields `None`.
pub fn head_branch(head: &str) -> Option<String> {
    let re = Regex::new(r"ref:\s*refs/heads/(\S+)").unwrap();
    re.captures(head).map(|caps| caps[1].to_string())
}

/// Normalize a remote URL for linking: `git@host:path` becomes
/// `https://host/path`, a trailing `.git` is stripped.
pub fn sanitize_url(url: &str) -> String {
    let ssh = Regex::new(r"^git@([^:]+):(.+)$").unwrap();
    let https = match ssh.captures(url) {
        Some(caps) => format!("https://{}/{}", &caps[1], &caps[2]),
        None => url.to_string(),
    };
    https.strip_suffix(".git").unwrap_or(&https).to_string()
}

/// Deep link to an exact line: `<url>/blob/<branch>/<path>#L<line>`.
/// Requires both a URL and a branch; anything less degrades to `None`.
pub fn deep_link(info: &RepoInfo, relative_path: &str, line: usize) -> Option<String> {
    let url = info.url.as_ref()?;
    let branch = info.branch.as_ref()?;
    Some(format!("{url}/blob/{branch}/{relative_path}#L{line}"))
}
