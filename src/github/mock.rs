use crate::errors::{AutomergeError, Result};
use crate::github::{NewPullRequest, PullRequestApi, PullRequestReference};
use crate::repository::RepositorySlug;
use std::sync::Mutex;

/// Records every call and answers with canned responses.
pub struct MockPullRequestApi {
    pub create_failure: Option<(u16, String)>,
    pub assign_failure: Option<(u16, String)>,
    pub permissions_failure: Option<(u16, String)>,
    pub created_prs: Mutex<Vec<(String, NewPullRequest)>>,
    pub assignments: Mutex<Vec<(String, u64, Vec<String>)>>,
    pub permission_grants: Mutex<Vec<String>>,
}

impl MockPullRequestApi {
    pub fn new() -> Self {
        Self {
            create_failure: None,
            assign_failure: None,
            permissions_failure: None,
            created_prs: Mutex::new(Vec::new()),
            assignments: Mutex::new(Vec::new()),
            permission_grants: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_create(mut self, status: u16, message: &str) -> Self {
        self.create_failure = Some((status, message.to_string()));
        self
    }

    pub fn failing_assign(mut self, status: u16, message: &str) -> Self {
        self.assign_failure = Some((status, message.to_string()));
        self
    }

    pub fn failing_permissions(mut self, status: u16, message: &str) -> Self {
        self.permissions_failure = Some((status, message.to_string()));
        self
    }

    pub fn get_created_prs(&self) -> Vec<(String, NewPullRequest)> {
        self.created_prs.lock().unwrap().clone()
    }

    pub fn get_assignments(&self) -> Vec<(String, u64, Vec<String>)> {
        self.assignments.lock().unwrap().clone()
    }

    pub fn get_permission_grants(&self) -> Vec<String> {
        self.permission_grants.lock().unwrap().clone()
    }
}

fn failure(canned: &Option<(u16, String)>) -> Result<()> {
    match canned {
        Some((status, message)) => Err(AutomergeError::Api {
            status: *status,
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

impl PullRequestApi for MockPullRequestApi {
    fn create_pull_request(
        &self,
        repo: &RepositorySlug,
        request: &NewPullRequest,
    ) -> Result<PullRequestReference> {
        failure(&self.create_failure)?;

        let mut created = self.created_prs.lock().unwrap();
        created.push((repo.to_string(), request.clone()));
        let number = created.len() as u64;
        Ok(PullRequestReference {
            number,
            url: format!("https://github.com/{}/pull/{}", repo, number),
        })
    }

    fn add_assignees(
        &self,
        repo: &RepositorySlug,
        number: u64,
        assignees: &[String],
    ) -> Result<()> {
        failure(&self.assign_failure)?;
        self.assignments
            .lock()
            .unwrap()
            .push((repo.to_string(), number, assignees.to_vec()));
        Ok(())
    }

    fn grant_workflow_write_permissions(&self, repo: &RepositorySlug) -> Result<()> {
        failure(&self.permissions_failure)?;
        self.permission_grants.lock().unwrap().push(repo.to_string());
        Ok(())
    }
}
