// Fixtures shared by the unit tests.

use crate::config::Credentials;
use git2::{build::RepoBuilder, BranchType, Repository, RepositoryInitOptions, Signature};
use std::path::{Path, PathBuf};

pub fn credentials() -> Credentials {
    Credentials {
        token: "ghp_test".to_string(),
        username: "octocat".to_string(),
        commit_name: "Octo Cat".to_string(),
        commit_email: "octocat@example.com".to_string(),
    }
}

/// Create a bare repository at `<root>/acme/widgets.git` whose `main` branch
/// holds `files` in a single commit.
pub fn seed_remote(root: &Path, files: &[(&str, &str)]) -> PathBuf {
    seed_remote_on(root, "main", files)
}

/// Same as [`seed_remote`] with `default_branch` as the remote HEAD.
pub fn seed_remote_on(root: &Path, default_branch: &str, files: &[(&str, &str)]) -> PathBuf {
    let seed_path = root.join("seed");
    let mut options = RepositoryInitOptions::new();
    options.initial_head(default_branch);
    let seed = Repository::init_opts(&seed_path, &options).unwrap();

    let mut index = seed.index().unwrap();
    for (path, content) in files {
        let full = seed_path.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let tree = seed.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Seed", "seed@example.com").unwrap();
    seed.commit(Some("HEAD"), &signature, &signature, "initial commit", &tree, &[])
        .unwrap();

    let remote_path = root.join("acme").join("widgets.git");
    RepoBuilder::new()
        .bare(true)
        .clone(seed_path.to_str().unwrap(), &remote_path)
        .unwrap();
    remote_path
}

/// Add a branch to the bare remote pointing at its `main` tip.
pub fn add_remote_branch(remote: &Path, name: &str) {
    let repo = Repository::open_bare(remote).unwrap();
    let main = repo
        .find_branch("main", BranchType::Local)
        .unwrap()
        .get()
        .peel_to_commit()
        .unwrap();
    repo.branch(name, &main, false).unwrap();
}

pub fn remote_branches(remote: &Path) -> Vec<String> {
    let repo = Repository::open_bare(remote).unwrap();
    let mut names: Vec<String> = repo
        .branches(Some(BranchType::Local))
        .unwrap()
        .map(|branch| branch.unwrap().0.name().unwrap().unwrap().to_string())
        .collect();
    names.sort();
    names
}
