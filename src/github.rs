//! GitHub REST client for repository metadata, history and content

use crate::aggregator::ContentFetcher;
use crate::config::NetworkConfig;
use crate::error::{InventoryError, Result};
use crate::types::{Commit, Contributor, RepoInfo, TreeEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "GitHub";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    full_name: String,
    description: Option<String>,
    html_url: String,
    stargazers_count: u32,
    forks_count: u32,
    open_issues_count: u32,
    #[serde(default)]
    archived: bool,
    default_branch: String,
    created_at: String,
    pushed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitDetail,
    author: Option<GitHubUser>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitDetail {
    message: String,
    author: Option<GitHubSignature>,
}

#[derive(Debug, Deserialize)]
struct GitHubSignature {
    name: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubContributor {
    login: Option<String>,
    contributions: u32,
}

#[derive(Debug, Deserialize)]
struct GitHubTree {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubContent {
    #[serde(default)]
    content: String,
}

/// Client for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    config: NetworkConfig,
}

impl GitHubClient {
    /// Build a client with GitHub authentication if a token is configured
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        if let Some(token) = &config.github_token {
            let value: reqwest::header::HeaderValue = format!("token {}", token)
                .parse()
                .map_err(|_| InventoryError::config("GitHub token is not a valid header value"))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| InventoryError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    /// Repository metadata
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        debug!("Fetching repository metadata for {}/{}", owner, repo);
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        let data: GitHubRepo = self.get_json(&url).await?;

        let created_at = parse_github_datetime(&data.created_at)?;
        let pushed_at = match data.pushed_at.as_deref() {
            Some(s) => parse_github_datetime(s)?,
            None => created_at,
        };

        Ok(RepoInfo {
            full_name: data.full_name,
            description: data.description,
            stars: data.stargazers_count,
            forks: data.forks_count,
            open_issues: data.open_issues_count,
            is_archived: data.archived,
            default_branch: data.default_branch,
            html_url: data.html_url,
            created_at,
            pushed_at,
        })
    }

    /// Commits since `since`, newest first, up to the configured page limit
    pub async fn get_commits(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Commit>> {
        let since = since.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let mut commits = Vec::new();

        for page in 1..=self.config.commit_page_limit.max(1) {
            let url = format!(
                "{}/repos/{}/{}/commits?since={}&per_page={}&page={}",
                self.base_url,
                owner,
                repo,
                urlencoding::encode(&since),
                PER_PAGE,
                page
            );
            let batch: Vec<GitHubCommit> = match self.get_json(&url).await {
                Ok(batch) => batch,
                Err(e) if page > 1 => {
                    warn!(
                        "Commit page {} for {}/{} failed, keeping {} commits: {}",
                        page,
                        owner,
                        repo,
                        commits.len(),
                        e
                    );
                    break;
                }
                Err(e) => return Err(e),
            };
            let len = batch.len();

            for item in batch {
                let signature = item.commit.author;
                let date = match signature
                    .as_ref()
                    .and_then(|s| s.date.as_deref())
                    .map(parse_github_datetime)
                {
                    Some(Ok(date)) => date,
                    Some(Err(e)) => {
                        debug!("Skipping commit {}: {}", item.sha, e);
                        continue;
                    }
                    None => continue,
                };
                commits.push(Commit {
                    sha: item.sha,
                    author: item
                        .author
                        .map(|u| u.login)
                        .or_else(|| signature.and_then(|s| s.name)),
                    message: item.commit.message,
                    date,
                });
            }

            if len < PER_PAGE as usize {
                break;
            }
        }

        debug!("Fetched {} commits for {}/{}", commits.len(), owner, repo);
        Ok(commits)
    }

    /// Contributors with commit counts, in API order (most commits first)
    pub async fn get_contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>> {
        let mut contributors = Vec::new();

        for page in 1..=self.config.contributor_page_limit.max(1) {
            let url = format!(
                "{}/repos/{}/{}/contributors?per_page={}&page={}",
                self.base_url, owner, repo, PER_PAGE, page
            );
            // Empty repositories answer 204 with no body
            let batch: Vec<GitHubContributor> = match self.get_json_optional(&url).await {
                Ok(batch) => batch.unwrap_or_default(),
                Err(e) if page > 1 => {
                    warn!(
                        "Contributor page {} for {}/{} failed, keeping {} contributors: {}",
                        page,
                        owner,
                        repo,
                        contributors.len(),
                        e
                    );
                    break;
                }
                Err(e) => return Err(e),
            };
            let len = batch.len();

            contributors.extend(batch.into_iter().filter_map(|c| {
                c.login.map(|login| Contributor {
                    login,
                    commits: c.contributions,
                })
            }));

            if len < PER_PAGE as usize {
                break;
            }
        }

        debug!("Fetched {} contributors for {}/{}", contributors.len(), owner, repo);
        Ok(contributors)
    }

    /// Bytes of code per language
    pub async fn get_languages(&self, owner: &str, repo: &str) -> Result<BTreeMap<String, u64>> {
        let url = format!("{}/repos/{}/{}/languages", self.base_url, owner, repo);
        self.get_json(&url).await
    }

    /// Recursive tree listing for a branch
    pub async fn get_tree(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<TreeEntry>> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.base_url,
            owner,
            repo,
            urlencoding::encode(branch)
        );
        let tree: GitHubTree = self.get_json(&url).await?;
        if tree.truncated {
            warn!("Tree listing for {}/{}@{} was truncated by GitHub", owner, repo, branch);
        }
        Ok(tree.tree)
    }

    /// GET a JSON document, retrying transport failures with backoff
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send_with_retry(url).await?;
        let response = check_status(response)?;
        Ok(response.json().await?)
    }

    async fn get_json_optional<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self.send_with_retry(url).await?;
        let response = check_status(response)?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    async fn send_with_retry(&self, url: &str) -> Result<Response> {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay();

        loop {
            match self.client.get(url).send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        return Err(InventoryError::network(format!(
                            "GitHub request failed: {}",
                            e
                        )));
                    }
                    warn!("GitHub request failed, retrying: {}", e);
                    tokio::time::sleep(delay).await;
                    attempts += 1;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl ContentFetcher for GitHubClient {
    /// Single attempt; the caller skips the file on any error
    async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<String> {
        let encoded_path = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.base_url,
            owner,
            repo,
            encoded_path,
            urlencoding::encode(reference)
        );

        let response = self.client.get(&url).send().await?;
        let content: GitHubContent = check_status(response)?.json().await?;
        Ok(content.content)
    }
}

/// Map error statuses to inventory errors
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok());
        if status == StatusCode::TOO_MANY_REQUESTS || remaining == Some("0") {
            let retry_after = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<i64>().ok())
                .map(|reset| {
                    let wait = reset - Utc::now().timestamp();
                    Duration::from_secs(wait.max(0) as u64)
                });

            return Err(InventoryError::RateLimitExceeded {
                service: SERVICE.to_string(),
                retry_after,
            });
        }
    }

    if status == StatusCode::NOT_FOUND {
        return Err(InventoryError::NotFound(response.url().path().to_string()));
    }

    Err(InventoryError::api(SERVICE, format!("HTTP {}", status)))
}

/// Split `owner/repo` or a GitHub URL into owner and repository name
pub fn parse_repo_ref(input: &str) -> Result<(String, String)> {
    // Accepted forms:
    // - owner/repo
    // - https://github.com/owner/repo(.git)
    // - git://github.com/owner/repo
    // - git@github.com:owner/repo.git

    let trimmed = input.trim().trim_end_matches('/');
    let trimmed = trimmed.trim_end_matches(".git");

    let rest = if let Some(rest) = trimmed.split("github.com:").nth(1) {
        rest
    } else if let Some(rest) = trimmed.split("github.com/").nth(1) {
        rest
    } else if !trimmed.contains("://") && !trimmed.contains('@') {
        trimmed
    } else {
        return Err(InventoryError::parse(format!("Invalid GitHub repository: {}", input)));
    };

    let parts: Vec<&str> = rest.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() == 2 {
        Ok((parts[0].to_string(), parts[1].to_string()))
    } else if parts.len() > 2 && trimmed.contains("github.com") {
        // e.g. https://github.com/owner/repo/tree/main
        Ok((parts[0].to_string(), parts[1].to_string()))
    } else {
        Err(InventoryError::parse(format!("Invalid GitHub repository: {}", input)))
    }
}

/// Parse GitHub datetime format
fn parse_github_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| InventoryError::parse(format!("Invalid GitHub datetime: {}", e)))
}
