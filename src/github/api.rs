use crate::errors::{AutomergeError, Result};
use crate::github::types::{
    AssigneesRequest, ErrorBody, NewPullRequest, PullRequestReference,
    WorkflowPermissionsRequest,
};
use crate::repository::RepositorySlug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::Method;
use std::time::Duration;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The subset of the hosting platform's REST API a run needs.
pub trait PullRequestApi {
    fn create_pull_request(
        &self,
        repo: &RepositorySlug,
        request: &NewPullRequest,
    ) -> Result<PullRequestReference>;
    fn add_assignees(&self, repo: &RepositorySlug, number: u64, assignees: &[String])
        -> Result<()>;
    fn grant_workflow_write_permissions(&self, repo: &RepositorySlug) -> Result<()>;
}

pub struct GitHubApi {
    base_url: String,
    token: String,
    http: Client,
}

impl GitHubApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AutomergeError::Network(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().map_err(|e| {
            AutomergeError::Network(format!("request to {} failed: {}", self.base_url, e))
        })?;

        if !response.status().is_success() {
            return Err(api_error(response));
        }
        Ok(response)
    }
}

/// Turn a failed response into `Api`, preferring GitHub's `message` field
/// over the raw body.
fn api_error(response: Response) -> AutomergeError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or(body);

    AutomergeError::Api { status, message }
}

impl PullRequestApi for GitHubApi {
    fn create_pull_request(
        &self,
        repo: &RepositorySlug,
        request: &NewPullRequest,
    ) -> Result<PullRequestReference> {
        log::info!(
            "Creating PR on {}: {} → {} (\"{}\")",
            repo,
            request.head,
            request.base,
            request.title
        );

        let response = self.send(
            self.request(Method::POST, &format!("/repos/{}/pulls", repo))
                .json(request),
        )?;
        let status = response.status().as_u16();

        response
            .json::<PullRequestReference>()
            .map_err(|e| AutomergeError::Api {
                status,
                message: format!("unexpected pull request response: {}", e),
            })
    }

    fn add_assignees(
        &self,
        repo: &RepositorySlug,
        number: u64,
        assignees: &[String],
    ) -> Result<()> {
        log::debug!("Assigning {}#{} to {:?}", repo, number, assignees);

        self.send(
            self.request(
                Method::POST,
                &format!("/repos/{}/issues/{}/assignees", repo, number),
            )
            .json(&AssigneesRequest { assignees }),
        )?;
        Ok(())
    }

    fn grant_workflow_write_permissions(&self, repo: &RepositorySlug) -> Result<()> {
        log::debug!("Granting write permissions to workflows of {}", repo);

        self.send(
            self.request(
                Method::PUT,
                &format!("/repos/{}/actions/permissions/workflow", repo),
            )
            .json(&WorkflowPermissionsRequest {
                default_workflow_permissions: "write",
                can_approve_pull_request_reviews: true,
            }),
        )?;
        Ok(())
    }
}
