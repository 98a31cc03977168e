use crate::{
    artifact,
    config::Credentials,
    errors::{AutomergeError, Result},
    git::Git,
    github::{NewPullRequest, PullRequestApi, PullRequestReference},
    repository::RepositoryUrl,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DEFAULT_BRANCH_PREFIX: &str = "enable-dependabot-auto-merge";
pub const COMMIT_MESSAGE: &str = "build: enable dependabot auto-merge";
pub const PULL_REQUEST_TITLE: &str = "enable dependabot auto-merge";
pub const PULL_REQUEST_BODY: &str = "This adds `.github/workflows/dependabot-auto-merge.yml`.\n\n\
The workflow approves pull requests opened by Dependabot and enables auto-merge \
on them, except for major version updates. Merging still follows the branch \
protection rules of this repository.";

/// Stages of a run, in the order they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Cloned,
    FolderEnsured,
    ArtifactWritten,
    BranchCreated,
    Committed,
    Pushed,
    PullRequestOpened,
    AssigneeSet,
}

impl Stage {
    const ALL: [Stage; 8] = [
        Stage::Cloned,
        Stage::FolderEnsured,
        Stage::ArtifactWritten,
        Stage::BranchCreated,
        Stage::Committed,
        Stage::Pushed,
        Stage::PullRequestOpened,
        Stage::AssigneeSet,
    ];

    /// The stage a run attempts once `completed` is done.
    pub fn after(completed: Option<Stage>) -> Stage {
        match completed {
            None => Stage::Cloned,
            Some(stage) => Self::ALL
                .iter()
                .copied()
                .find(|candidate| *candidate > stage)
                .unwrap_or(stage),
        }
    }

    /// What the run is doing while heading for this stage.
    pub fn action(self) -> &'static str {
        match self {
            Stage::Cloned => "clone",
            Stage::FolderEnsured => "create workflow folder",
            Stage::ArtifactWritten => "write workflow",
            Stage::BranchCreated => "create branch",
            Stage::Committed => "commit",
            Stage::Pushed => "push",
            Stage::PullRequestOpened => "open pull request",
            Stage::AssigneeSet => "assign pull request",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A run that stopped early.
///
/// Nothing is rolled back: if `completed` is `Pushed` or later the branch
/// exists on the remote and must be cleaned up by hand.
#[derive(Debug)]
pub struct UpdateFailure {
    pub completed: Option<Stage>,
    pub branch: Option<String>,
    pub error: AutomergeError,
}

impl UpdateFailure {
    pub fn failed_stage(&self) -> Stage {
        Stage::after(self.completed)
    }

    /// The branch left on the remote, if the push went through.
    pub fn pushed_branch(&self) -> Option<&str> {
        match self.completed {
            Some(stage) if stage >= Stage::Pushed => self.branch.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.failed_stage().action(), self.error)
    }
}

impl std::error::Error for UpdateFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub branch_prefix: String,
    /// Leave the cloned working copy on disk after the run.
    pub keep_workdir: bool,
    /// Directory in which the temporary working copy is created.
    pub work_root: Option<PathBuf>,
    pub grant_actions_permissions: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            keep_workdir: false,
            work_root: None,
            grant_actions_permissions: true,
        }
    }
}

#[derive(Default)]
struct Progress {
    completed: Option<Stage>,
    branch: Option<String>,
}

impl Progress {
    fn reach(&mut self, stage: Stage) {
        log::info!("✅ {}", stage);
        self.completed = Some(stage);
    }

    fn into_failure(self, error: AutomergeError) -> UpdateFailure {
        UpdateFailure {
            completed: self.completed,
            branch: self.branch,
            error,
        }
    }
}

/// Temporary directory holding the clone; removed on drop unless kept.
struct WorkingCopyDir {
    dir: Option<TempDir>,
    keep: bool,
}

impl WorkingCopyDir {
    fn create(options: &UpdateOptions) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("dependabot-automerge-");
        let dir = match &options.work_root {
            Some(root) => builder
                .tempdir_in(root)
                .map_err(|e| AutomergeError::filesystem(root, e))?,
            None => builder
                .tempdir()
                .map_err(|e| AutomergeError::filesystem(std::env::temp_dir(), e))?,
        };

        Ok(Self {
            dir: Some(dir),
            keep: options.keep_workdir,
        })
    }

    fn path(&self) -> &Path {
        self.dir.as_ref().map_or(Path::new(""), |dir| dir.path())
    }
}

impl Drop for WorkingCopyDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if self.keep {
            let path = dir.keep();
            log::info!("ℹ️  Working copy kept at {}", path.display());
            return;
        }
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => log::debug!("Removed working copy {}", path.display()),
            Err(e) => log::warn!("Cannot remove working copy {}: {}", path.display(), e),
        }
    }
}

/// Runs the clone-to-pull-request workflow against one repository.
pub struct RepositoryUpdater<T: PullRequestApi> {
    pub api: T,
    pub options: UpdateOptions,
}

impl<T: PullRequestApi> RepositoryUpdater<T> {
    pub fn new(api: T, options: UpdateOptions) -> Self {
        Self { api, options }
    }

    /// Clone `repository_url`, add the bundled workflow on a new branch,
    /// push it and open a pull request assigned to `credentials.username`.
    ///
    /// Every stage aborts the run on failure; the returned [`UpdateFailure`]
    /// tells how far it got.
    pub fn update(
        &self,
        repository_url: &str,
        credentials: &Credentials,
    ) -> std::result::Result<PullRequestReference, UpdateFailure> {
        let mut progress = Progress::default();
        match self.run(repository_url, credentials, &mut progress) {
            Ok(pull_request) => Ok(pull_request),
            Err(error) => Err(progress.into_failure(error)),
        }
    }

    fn run(
        &self,
        repository_url: &str,
        credentials: &Credentials,
        progress: &mut Progress,
    ) -> Result<PullRequestReference> {
        let url = RepositoryUrl::parse(repository_url)?;
        let slug = url.slug();

        let workdir = WorkingCopyDir::create(&self.options)?;
        let git = Git::clone_repository(&url, &workdir.path().join(&slug.name), credentials)?;
        log::debug!("Working copy at {}", git.workdir().display());
        progress.reach(Stage::Cloned);

        let base = git.default_branch().to_string();
        log::debug!("Default branch of {} is {}", slug, base);

        git.ensure_folder(Path::new(artifact::WORKFLOW_DIR))?;
        progress.reach(Stage::FolderEnsured);

        let workflow_path = artifact::workflow_path();
        git.write_file(&workflow_path, artifact::WORKFLOW.as_bytes())?;
        progress.reach(Stage::ArtifactWritten);

        let branch = git.unused_branch_name(&self.options.branch_prefix);
        progress.branch = Some(branch.clone());
        git.create_branch(&branch)?;
        progress.reach(Stage::BranchCreated);

        let commit = git.commit_path(&workflow_path, COMMIT_MESSAGE, credentials)?;
        log::debug!("Committed {} as {}", workflow_path.display(), commit);
        progress.reach(Stage::Committed);

        log::info!("pushing origin:{}", branch);
        git.push(&branch)?;
        progress.reach(Stage::Pushed);

        let pull_request = self.api.create_pull_request(
            slug,
            &NewPullRequest {
                title: PULL_REQUEST_TITLE.to_string(),
                head: branch.clone(),
                base,
                body: PULL_REQUEST_BODY.to_string(),
            },
        )?;
        progress.reach(Stage::PullRequestOpened);

        self.api.add_assignees(
            slug,
            pull_request.number,
            std::slice::from_ref(&credentials.username),
        )?;
        progress.reach(Stage::AssigneeSet);

        if self.options.grant_actions_permissions {
            match self.api.grant_workflow_write_permissions(slug) {
                Ok(()) => log::info!("✅ Granted write permissions to workflows of {}", slug),
                Err(e) => log::warn!(
                    "Could not update GitHub Actions permissions of {}: {}",
                    slug,
                    e
                ),
            }
        }

        Ok(pull_request)
    }
}
