use crate::errors::{AutomergeError, Result};
use std::fmt;

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const USERNAME_VAR: &str = "GITHUB_USERNAME";
pub const COMMIT_USER_VAR: &str = "COMMIT_USER";
pub const COMMIT_EMAIL_VAR: &str = "COMMIT_EMAIL";
pub const API_URL_VAR: &str = "GITHUB_API_URL";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Everything a run needs to authenticate and author its commit.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub username: String,
    pub commit_name: String,
    pub commit_email: String,
}

// Keep the token out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .field("commit_name", &self.commit_name)
            .field("commit_email", &self.commit_email)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub api_url: String,
}

impl Config {
    /// Load the configuration from the process environment.
    ///
    /// A `.env` file in the current directory is read first; variables that
    /// are already set take precedence over it.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded .env file from: {:?}", path),
            Err(_) => log::debug!(".env file not found, relying on environment variables"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// All missing variables are reported at once so the operator can fix
    /// them in one go.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let token = read(TOKEN_VAR);
        let username = read(USERNAME_VAR);
        let commit_name = read(COMMIT_USER_VAR);
        let commit_email = read(COMMIT_EMAIL_VAR);

        let missing: Vec<&str> = [
            (TOKEN_VAR, token.is_none()),
            (USERNAME_VAR, username.is_none()),
            (COMMIT_USER_VAR, commit_name.is_none()),
            (COMMIT_EMAIL_VAR, commit_email.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(token), Some(username), Some(commit_name), Some(commit_email)) =
            (token, username, commit_name, commit_email)
        else {
            return Err(AutomergeError::Configuration(format!(
                "missing or empty environment variable(s): {}",
                missing.join(", ")
            )));
        };

        let api_url = read(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(AutomergeError::Configuration(format!(
                "{} must be an http(s) URL, got '{}'",
                API_URL_VAR, api_url
            )));
        }

        Ok(Config {
            credentials: Credentials {
                token,
                username,
                commit_name,
                commit_email,
            },
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}
