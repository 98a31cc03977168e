pub mod api;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use api::{GitHubApi, PullRequestApi};
pub use types::{NewPullRequest, PullRequestReference};
