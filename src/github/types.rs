use serde::{Deserialize, Serialize};

/// Payload of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

/// The pull request a successful run leaves behind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestReference {
    pub number: u64,
    #[serde(rename = "html_url")]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssigneesRequest<'a> {
    pub assignees: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct WorkflowPermissionsRequest {
    pub default_workflow_permissions: &'static str,
    pub can_approve_pull_request_reviews: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
