use std::env;
use std::path::Path;

use git2::{ErrorCode, Repository, StatusOptions};
use tracing::debug;

use crate::error::Result;
use crate::git::GitReader;

/// Environment variable overriding the detected branch name (set by CI)
pub const BRANCH_NAME_ENV_VAR: &str = "BUILD_BRANCH_NAME";

/// Git reader backed by a libgit2 repository handle
pub struct Git2Reader {
    repo: Repository,
}

impl Git2Reader {
    /// Open the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Git2Reader { repo })
    }

    /// Wrap an already opened repository
    pub fn from_git2(repo: Repository) -> Self {
        Git2Reader { repo }
    }
}

impl GitReader for Git2Reader {
    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.iter().any(|entry| {
            let status = entry.status();
            !status.is_empty() && !status.is_ignored()
        }))
    }

    fn current_branch(&self) -> Result<String> {
        if let Ok(branch) = env::var(BRANCH_NAME_ENV_VAR) {
            if !branch.is_empty() {
                debug!("branch taken from {}: {}", BRANCH_NAME_ENV_VAR, branch);
                return Ok(branch);
            }
        }

        if self.repo.head_detached()? {
            return Ok("HEAD".to_string());
        }

        // An unborn HEAD still names the branch it will create
        let head = self.repo.find_reference("HEAD")?;
        let name = match head.symbolic_target() {
            Some(target) => target.trim_start_matches("refs/heads/").to_string(),
            None => head.shorthand().unwrap_or("HEAD").to_string(),
        };
        Ok(name)
    }

    fn most_recent_commit_sha(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn commit_message_history(&self, depth: usize) -> Result<Vec<String>> {
        match self.repo.head() {
            Ok(_) => {}
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;

        let mut subjects = Vec::new();
        for oid in revwalk.take(depth) {
            let commit = self.repo.find_commit(oid?)?;
            subjects.push(commit.summary().unwrap_or_default().trim().to_string());
        }
        Ok(subjects)
    }
}
