use crate::{
    config::Credentials,
    errors::{AutomergeError, Result},
    repository::RepositoryUrl,
};
use auth_git2::GitAuthenticator;
use git2::{
    BranchType, ErrorClass, ErrorCode, Oid, PushOptions, RemoteCallbacks, Repository, Signature,
};
use std::path::{Path, PathBuf};

const ORIGIN: &str = "origin";

/// A local working copy cloned from the target repository.
pub struct Git {
    repo: Repository,
    workdir: PathBuf,
    default_branch: String,
    auth: GitAuthenticator,
}

/// Domain under which the token is registered with auth-git2.
///
/// auth-git2 matches credentials on `host[:port]`, so the port stays.
fn credential_domain(url: &RepositoryUrl) -> Option<&str> {
    url.host()
}

fn authenticator(url: &RepositoryUrl, credentials: &Credentials) -> GitAuthenticator {
    // Never block on a terminal prompt, this tool runs unattended.
    let auth = GitAuthenticator::default().try_password_prompt(0);
    match credential_domain(url) {
        Some(domain) => {
            auth.add_plaintext_credentials(domain, &credentials.username, &credentials.token)
        }
        None => auth,
    }
}

fn git_error(action: &str, e: git2::Error) -> AutomergeError {
    AutomergeError::Git(format!("{}: {}", action, e.message()))
}

/// Map a push failure onto the error taxonomy.
pub fn classify_push_error(e: &git2::Error) -> AutomergeError {
    let message = e.message().to_string();
    let lower = message.to_lowercase();
    let rejected_credentials = lower.contains("401")
        || lower.contains("403")
        || lower.contains("authentication")
        || lower.contains("credentials")
        || lower.contains("permission denied");

    match (e.code(), e.class()) {
        (ErrorCode::Auth, _) => AutomergeError::Authentication(message),
        (_, ErrorClass::Http | ErrorClass::Ssh) if rejected_credentials => {
            AutomergeError::Authentication(message)
        }
        (_, ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssh | ErrorClass::Ssl) => {
            AutomergeError::Network(message)
        }
        _ => AutomergeError::Git(format!("push failed: {}", message)),
    }
}

impl Git {
    /// Clone `url` into `into`, which must not exist or be empty.
    ///
    /// A repository without a resolvable HEAD (e.g. an empty one) has no
    /// default branch to target and is reported as `SourceUnavailable`.
    pub fn clone_repository(
        url: &RepositoryUrl,
        into: &Path,
        credentials: &Credentials,
    ) -> Result<Self> {
        let auth = authenticator(url, credentials);
        log::debug!("Cloning {} into {}", url, into.display());

        let repo = auth.clone_repo(url.clone_url(), into).map_err(|e| {
            AutomergeError::SourceUnavailable(format!("cannot clone {}: {}", url, e.message()))
        })?;

        let default_branch = repo
            .head()
            .ok()
            .and_then(|head| head.shorthand().map(|name| name.to_string()))
            .ok_or_else(|| {
                AutomergeError::SourceUnavailable(format!("{} has no default branch", url))
            })?;

        Ok(Git {
            repo,
            workdir: into.to_path_buf(),
            default_branch,
            auth,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Short name of the branch HEAD pointed at right after cloning, which is
    /// the remote's default branch.
    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Create `relative` (and its parents) inside the working copy.
    pub fn ensure_folder(&self, relative: &Path) -> Result<()> {
        let path = self.workdir.join(relative);
        std::fs::create_dir_all(&path).map_err(|e| AutomergeError::filesystem(&path, e))
    }

    /// Write `content` at `relative`, replacing whatever is there.
    pub fn write_file(&self, relative: &Path, content: &[u8]) -> Result<()> {
        let path = self.workdir.join(relative);
        std::fs::write(&path, content).map_err(|e| AutomergeError::filesystem(&path, e))
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.repo.find_branch(name, BranchType::Local).is_ok()
            || self
                .repo
                .find_branch(&format!("{}/{}", ORIGIN, name), BranchType::Remote)
                .is_ok()
    }

    /// First free branch name: `prefix`, then `prefix-2`, `prefix-3`...
    ///
    /// Both local branches and the branches fetched from origin are taken
    /// into account, so a leftover branch from an earlier run is never reused.
    pub fn unused_branch_name(&self, prefix: &str) -> String {
        if !self.branch_exists(prefix) {
            return prefix.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", prefix, n))
            .find(|candidate| !self.branch_exists(candidate))
            .unwrap_or_else(|| prefix.to_string())
    }

    /// Create `name` at the current HEAD commit and switch to it.
    ///
    /// The working tree is left untouched.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| git_error("cannot resolve HEAD commit", e))?;

        self.repo
            .branch(name, &head, false)
            .map_err(|e| git_error(&format!("cannot create branch '{}'", name), e))?;
        self.repo
            .set_head(&format!("refs/heads/{}", name))
            .map_err(|e| git_error(&format!("cannot switch to branch '{}'", name), e))?;

        log::debug!("Created branch {} at {}", name, head.id());
        Ok(())
    }

    /// Stage exactly `relative` and commit it on HEAD.
    ///
    /// Fails with `NothingToCommit` when the staged tree equals HEAD's tree.
    pub fn commit_path(
        &self,
        relative: &Path,
        message: &str,
        credentials: &Credentials,
    ) -> Result<Oid> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| git_error("cannot open index", e))?;
        index
            .add_path(relative)
            .map_err(|e| git_error(&format!("cannot stage {}", relative.display()), e))?;
        index
            .write()
            .map_err(|e| git_error("cannot write index", e))?;
        let tree_id = index
            .write_tree()
            .map_err(|e| git_error("cannot write tree", e))?;

        let parent = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| git_error("cannot resolve HEAD commit", e))?;

        if parent.tree_id() == tree_id {
            return Err(AutomergeError::NothingToCommit(
                relative.display().to_string(),
            ));
        }

        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| git_error("cannot find tree", e))?;
        let signature = Signature::now(&credentials.commit_name, &credentials.commit_email)
            .map_err(|e| git_error("invalid commit identity", e))?;

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])
            .map_err(|e| git_error("cannot create commit", e))
    }

    /// Push `branch` to origin under the same name.
    pub fn push(&self, branch: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|e| git_error("cannot find remote origin", e))?;
        let git_config = self
            .repo
            .config()
            .map_err(|e| git_error("cannot read git config", e))?;
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);

        let mut rejection: Option<String> = None;
        {
            let mut callbacks = RemoteCallbacks::new();
            callbacks.credentials(self.auth.credentials(&git_config));
            callbacks.push_update_reference(|reference, status| {
                if let Some(status) = status {
                    rejection = Some(format!("{} rejected: {}", reference, status));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|e| classify_push_error(&e))?;
        }

        match rejection {
            Some(reason) => Err(AutomergeError::Git(reason)),
            None => Ok(()),
        }
    }
}
