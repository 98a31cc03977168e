use crate::{
    config::Config,
    core::{RepositoryUpdater, UpdateFailure, UpdateOptions, DEFAULT_BRANCH_PREFIX},
    errors::AutomergeError,
    github::{GitHubApi, PullRequestReference},
};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Update {
    /// URL of the repository to update, e.g. https://github.com/acme/widgets
    pub repository_url: String,

    /// Keep the cloned working copy instead of deleting it
    #[arg(long)]
    pub keep_workdir: bool,

    /// Create the temporary working copy inside this directory
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Do not grant write permissions to the repository's workflows
    #[arg(long)]
    pub skip_actions_permissions: bool,

    /// Name of the branch to create; a numeric suffix is added if it is taken
    #[arg(long, value_name = "NAME", default_value = DEFAULT_BRANCH_PREFIX)]
    pub branch: String,
}

impl Update {
    pub fn options(&self) -> UpdateOptions {
        UpdateOptions {
            branch_prefix: self.branch.clone(),
            keep_workdir: self.keep_workdir,
            work_root: self.workdir.clone(),
            grant_actions_permissions: !self.skip_actions_permissions,
        }
    }

    pub fn execute(&self, config: &Config) -> Result<PullRequestReference, UpdateFailure> {
        let api = GitHubApi::new(&config.api_url, &config.credentials.token).map_err(|error| {
            UpdateFailure {
                completed: None,
                branch: None,
                error,
            }
        })?;

        log::info!("🔗 Enabling dependabot auto-merge on {}", self.repository_url);
        RepositoryUpdater::new(api, self.options())
            .update(&self.repository_url, &config.credentials)
    }
}

/// Process exit status for a failed run.
///
/// `2` for configuration problems, `3` when the repository already carries
/// the workflow, `1` otherwise.
pub fn exit_code(error: &AutomergeError) -> i32 {
    match error {
        AutomergeError::Configuration(_) => 2,
        AutomergeError::NothingToCommit(_) => 3,
        _ => 1,
    }
}
