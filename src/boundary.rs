use std::fmt;

/// Non-fatal conditions met while generating a manifest.
/// They never abort a run but should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Tracked files have uncommitted changes
    DirtyWorkingTree { branch: Option<String> },
    /// No commit subject was available for a rule
    EmptyCommitHistory { depth: usize },
    /// The selected commit has a blank subject line
    EmptyCommitSubject { depth: usize },
    /// A rule filter matched none of the inspected commit subjects
    FilterMatchedNothing { filter: String, depth: usize },
    /// Application declares no image, so it cannot produce anything
    NoImagesDeclared { application: String },
    /// Neither the application nor the strategy declares any rule
    NoRulesDeclared { application: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::DirtyWorkingTree { branch } => match branch {
                Some(branch) => write!(
                    f,
                    "Working tree on branch '{}' has uncommitted changes",
                    branch
                ),
                None => write!(f, "Working tree has uncommitted changes"),
            },
            BoundaryWarning::EmptyCommitHistory { depth } => {
                write!(f, "No commit found in the last {} commits, rule skipped", depth)
            }
            BoundaryWarning::EmptyCommitSubject { depth } => write!(
                f,
                "Selected commit within the last {} commits has an empty subject, rule skipped",
                depth
            ),
            BoundaryWarning::FilterMatchedNothing { filter, depth } => write!(
                f,
                "Filter '{}' matched none of the last {} commits, rule skipped",
                filter, depth
            ),
            BoundaryWarning::NoImagesDeclared { application } => {
                write!(f, "Application '{}' declares no image", application)
            }
            BoundaryWarning::NoRulesDeclared { application } => write!(
                f,
                "Application '{}' has no rule and no default rule applies",
                application
            ),
        }
    }
}
