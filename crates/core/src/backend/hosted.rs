//! Hosted file backend over a GitHub-compatible "contents" API.
//!
//! The table lives at `/repos/{owner}/{repo}/contents/{path}`. Reads return
//! base64 content plus the blob sha; writes send the sha last seen and the
//! host rejects them if the file moved on in between.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ContentId, PersistError, PersistenceBackend, Precondition};

/// Hosted file backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedFileConfig {
    /// API base URL (default: https://api.github.com).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path of the CSV file inside the repository.
    #[serde(default = "default_file_path")]
    pub path: String,
    /// Branch to read and commit to (default: repository default branch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Bearer token.
    pub token: String,
    /// Commit message used for every write.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_file_path() -> String {
    "Data.csv".to_string()
}

fn default_commit_message() -> String {
    "Update project tickets".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Stores the table as a file in a hosted repository.
pub struct HostedFileBackend {
    client: Client,
    contents_url: String,
    branch: Option<String>,
    commit_message: String,
    location: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: PutContentsEntry,
}

#[derive(Debug, Deserialize)]
struct PutContentsEntry {
    sha: String,
}

impl HostedFileBackend {
    /// Create a new hosted file backend.
    ///
    /// The token goes into the client's default headers; request code never
    /// handles it.
    pub fn new(config: HostedFileConfig) -> Result<Self, PersistError> {
        if config.token.is_empty() {
            return Err(PersistError::NotConfigured(
                "hosted backend token is required".to_string(),
            ));
        }
        if config.owner.is_empty() || config.repo.is_empty() || config.path.is_empty() {
            return Err(PersistError::NotConfigured(
                "hosted backend owner, repo and path are required".to_string(),
            ));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| PersistError::NotConfigured("token is not a valid header".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ticketdesk/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        let path = config.path.trim_matches('/');
        let encoded_path = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let contents_url = format!(
            "{}/repos/{}/{}/contents/{}",
            config.api_url.trim_end_matches('/'),
            urlencoding::encode(&config.owner),
            urlencoding::encode(&config.repo),
            encoded_path
        );
        let location = format!("{}/{}:{}", config.owner, config.repo, path);

        Ok(Self {
            client,
            contents_url,
            branch: config.branch,
            commit_message: config.commit_message,
            location,
        })
    }

    async fn fetch(&self) -> Result<Option<ContentsResponse>, PersistError> {
        debug!("GET {}", self.contents_url);

        let mut request = self.client.get(&self.contents_url);
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Unauthorized(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let contents: ContentsResponse = response.json().await.map_err(|e| {
            PersistError::Decode(format!("Failed to parse contents response: {}", e))
        })?;
        Ok(Some(contents))
    }
}

#[async_trait]
impl PersistenceBackend for HostedFileBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, PersistError> {
        let Some(contents) = self.fetch().await? else {
            return Ok(None);
        };

        if let Some(encoding) = contents.encoding.as_deref() {
            if encoding != "base64" {
                return Err(PersistError::Decode(format!(
                    "unsupported content encoding: {}",
                    encoding
                )));
            }
        }

        // The API wraps base64 at 60 columns.
        let compact: String = contents
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| PersistError::Decode(format!("invalid base64 content: {}", e)))?;

        Ok(Some(bytes))
    }

    async fn probe(&self) -> Result<Option<ContentId>, PersistError> {
        Ok(self.fetch().await?.map(|c| ContentId::new(c.sha)))
    }

    async fn write(
        &self,
        content: &[u8],
        precondition: Precondition,
    ) -> Result<ContentId, PersistError> {
        let sha = match &precondition {
            Precondition::Absent => None,
            Precondition::Matches(id) => Some(id.as_str()),
        };
        let body = PutContentsRequest {
            message: &self.commit_message,
            content: STANDARD.encode(content),
            sha,
            branch: self.branch.as_deref(),
        };

        debug!("PUT {} (sha: {:?})", self.contents_url, sha);

        let response = self.client.put(&self.contents_url).json(&body).send().await?;

        let status = response.status();
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Conflict(format!("{}: {}", self.location, body)));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Unauthorized(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let written: PutContentsResponse = response.json().await.map_err(|e| {
            PersistError::Decode(format!("Failed to parse write response: {}", e))
        })?;
        Ok(ContentId::new(written.content.sha))
    }

    fn name(&self) -> &'static str {
        "hosted"
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HostedFileConfig {
        HostedFileConfig {
            api_url: "https://api.example.com/".to_string(),
            owner: "acme".to_string(),
            repo: "tickets".to_string(),
            path: "/data/Project Tickets.csv".to_string(),
            branch: None,
            token: "t0ken".to_string(),
            commit_message: default_commit_message(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let backend = HostedFileBackend::new(config()).unwrap();
        assert_eq!(
            backend.contents_url,
            "https://api.example.com/repos/acme/tickets/contents/data/Project%20Tickets.csv"
        );
        assert_eq!(backend.location(), "acme/tickets:data/Project Tickets.csv");
    }

    #[test]
    fn test_missing_token_rejected() {
        let result = HostedFileBackend::new(HostedFileConfig {
            token: String::new(),
            ..config()
        });
        assert!(matches!(result, Err(PersistError::NotConfigured(_))));
    }

    #[test]
    fn test_missing_owner_rejected() {
        let result = HostedFileBackend::new(HostedFileConfig {
            owner: String::new(),
            ..config()
        });
        assert!(matches!(result, Err(PersistError::NotConfigured(_))));
    }

    #[test]
    fn test_put_request_omits_sha_for_create() {
        let body = PutContentsRequest {
            message: "m",
            content: STANDARD.encode(b"ID\n"),
            sha: None,
            branch: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["content"], "SUQK");
        assert!(json.get("sha").is_none());
        assert!(json.get("branch").is_none());
    }
}
