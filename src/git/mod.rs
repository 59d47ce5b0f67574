//! Git metadata access
//!
//! The manifest generator only needs a handful of read-only facts about the
//! working tree: whether it is dirty, the current branch, the HEAD commit
//! SHA and the recent commit subjects. They are exposed through the
//! [GitReader] trait so the generator can run against a real repository
//! ([Git2Reader]) or a scripted one in tests ([MockGitReader]).

pub mod mock;
pub mod repository;

pub use mock::MockGitReader;
pub use repository::{Git2Reader, BRANCH_NAME_ENV_VAR};

use regex::Regex;

use crate::error::Result;

/// Read-only view of the git metadata used to derive tags
pub trait GitReader {
    /// Whether tracked files have uncommitted changes
    fn is_dirty(&self) -> Result<bool>;

    /// Name of the branch being released
    fn current_branch(&self) -> Result<String>;

    /// Full SHA of the HEAD commit
    fn most_recent_commit_sha(&self) -> Result<String>;

    /// Subject lines of up to `depth` commits, most recent first
    fn commit_message_history(&self, depth: usize) -> Result<Vec<String>>;

    /// Select the commit subject a rule is evaluated against.
    ///
    /// With a filter, this is the most recent subject the filter matches at
    /// its start; without one, the most recent subject. Returns `None` when
    /// the history is empty or nothing matches the filter.
    fn last_commit_message(&self, depth: usize, filter: Option<&Regex>) -> Result<Option<String>> {
        let history = self.commit_message_history(depth)?;
        let message = match filter {
            Some(regex) => history
                .into_iter()
                .find(|subject| regex.find(subject).is_some_and(|m| m.start() == 0)),
            None => history.into_iter().next(),
        };
        Ok(message)
    }
}
