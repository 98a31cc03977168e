// The workflow injected into every target repository.

use std::path::PathBuf;

pub const WORKFLOW_DIR: &str = ".github/workflows";
pub const WORKFLOW_FILE: &str = "dependabot-auto-merge.yml";

pub const WORKFLOW: &str = include_str!("../assets/dependabot-auto-merge.yml");

/// Path of the workflow relative to the repository root.
pub fn workflow_path() -> PathBuf {
    PathBuf::from(WORKFLOW_DIR).join(WORKFLOW_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_path() {
        assert_eq!(
            workflow_path(),
            PathBuf::from(".github/workflows/dependabot-auto-merge.yml")
        );
    }

    #[test]
    fn test_bundled_workflow_targets_dependabot() {
        assert!(WORKFLOW.starts_with("name:"));
        assert!(WORKFLOW.contains("dependabot[bot]"));
        assert!(WORKFLOW.contains("gh pr merge --auto"));
    }
}
