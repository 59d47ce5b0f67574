use crate::error::{ReleaserError, Result};
use crate::git::GitReader;

/// Scripted git reader for tests
#[derive(Debug, Clone, Default)]
pub struct MockGitReader {
    dirty: bool,
    branch: Option<String>,
    sha: Option<String>,
    history: Vec<String>,
}

impl MockGitReader {
    /// Create a clean reader with an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HEAD commit SHA
    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    /// Set the commit subjects, most recent first
    pub fn with_history<I, S>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.history = history.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

impl GitReader for MockGitReader {
    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn current_branch(&self) -> Result<String> {
        self.branch
            .clone()
            .ok_or_else(|| ReleaserError::config("branch not set in mock git reader"))
    }

    fn most_recent_commit_sha(&self) -> Result<String> {
        self.sha
            .clone()
            .ok_or_else(|| ReleaserError::config("sha not set in mock git reader"))
    }

    fn commit_message_history(&self, depth: usize) -> Result<Vec<String>> {
        Ok(self.history.iter().take(depth).cloned().collect())
    }
}
