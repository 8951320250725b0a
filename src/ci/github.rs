//! Pull request comments through the GitHub REST API
//!
//! A run owns at most one comment per toolchain: the first comment written by
//! the bot account whose body mentions the toolchain label is updated in
//! place, otherwise a new comment is created.

use crate::config::Repository;
use crate::error::BloatCiError;
use crate::report::truncate_report;
use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::LINK;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
/// Page size for comment listing, also the number of comments consulted
pub const COMMENTS_PER_PAGE: usize = 100;

/// Author of a comment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentAuthor {
    /// Account login
    pub login: String,
}

/// Comment on an issue or pull request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueComment {
    /// Comment id, used for updates
    pub id: u64,
    /// Markdown body
    #[serde(default)]
    pub body: Option<String>,
    /// Author; absent for deleted accounts
    #[serde(default)]
    pub user: Option<CommentAuthor>,
}

impl IssueComment {
    /// Whether this comment was written by `bot_login` for `toolchain`
    pub fn is_owned_by(&self, bot_login: &str, toolchain: &str) -> bool {
        let by_bot = self.user.as_ref().is_some_and(|u| u.login == bot_login);
        let for_toolchain = self.body.as_deref().is_some_and(|b| b.contains(toolchain));
        by_bot && for_toolchain
    }
}

/// What happened to the report comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// A new comment was posted
    Created,
    /// The existing comment with this id was replaced
    Updated(u64),
}

/// Place that holds pull request comments
pub trait CommentHost {
    /// The most recent comments on an issue, up to 100, oldest first
    fn list_comments(&self, issue: u64) -> Result<Vec<IssueComment>>;

    /// Post a new comment
    fn create_comment(&self, issue: u64, body: &str) -> Result<()>;

    /// Replace the body of an existing comment
    fn update_comment(&self, comment_id: u64, body: &str) -> Result<()>;
}

/// Publish `report` on the pull request, reusing this toolchain's comment
pub fn create_or_update_comment<H: CommentHost + ?Sized>(
    host: &H,
    issue: u64,
    toolchain: &str,
    bot_login: &str,
    report: &str,
) -> Result<CommentAction> {
    info!("Find comments for issue: {}", issue);
    let comments = host.list_comments(issue)?;
    info!(
        "Found {} comments. Searching for comments containing {}",
        comments.len(),
        toolchain
    );

    let body = truncate_report(report.to_string());
    match comments.iter().find(|c| c.is_owned_by(bot_login, toolchain)) {
        Some(existing) => {
            info!("Updating comment with ID {}", existing.id);
            host.update_comment(existing.id, &body)?;
            Ok(CommentAction::Updated(existing.id))
        }
        None => {
            info!("No existing comment found, creating a new comment");
            host.create_comment(issue, &body)?;
            Ok(CommentAction::Created)
        }
    }
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// REST client scoped to one repository
pub struct GitHubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for `repository` at `api_url`
    pub fn new(
        api_url: impl Into<String>,
        repository: &Repository,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bloat-ci/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for the GitHub API")?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            owner: repository.owner.clone(),
            repo: repository.name.clone(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        debug!("GitHub API: {}", operation);
        let response = self
            .authorized(request)
            .send()
            .map_err(|e| BloatCiError::Api {
                operation: operation.to_string(),
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BloatCiError::Api {
                operation: operation.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status, body),
            }
            .into());
        }

        Ok(response)
    }

    /// One page of issue comments plus the last page number, if paginated
    fn comments_page(&self, issue: u64, page: u32) -> Result<(Vec<IssueComment>, Option<u32>)> {
        let per_page = COMMENTS_PER_PAGE.to_string();
        let page = page.to_string();
        let request = self
            .client
            .get(self.url(&format!("issues/{}/comments", issue)))
            .query(&[("per_page", per_page.as_str()), ("page", page.as_str())]);
        let response = self.send("list comments", request)?;

        let last = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(last_page);

        let comments = response.json().map_err(|e| BloatCiError::Api {
            operation: "list comments".to_string(),
            status: None,
            message: format!("invalid response: {}", e),
        })?;

        Ok((comments, last))
    }
}

/// Page number of the `rel="last"` entry of a `Link` header
///
/// ```
/// use bloat_ci::ci::github::last_page;
///
/// let link = r#"<https://api.github.com/repositories/1/issues/7/comments?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/issues/7/comments?per_page=100&page=4>; rel="last""#;
/// assert_eq!(last_page(link), Some(4));
/// assert_eq!(last_page(""), None);
/// ```
pub fn last_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="last""#) {
            return None;
        }

        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

impl CommentHost for GitHubClient {
    fn list_comments(&self, issue: u64) -> Result<Vec<IssueComment>> {
        let (first, last) = self.comments_page(issue, 1)?;
        let last = match last {
            Some(last) if last > 1 => last,
            _ => return Ok(first),
        };

        // Comments come oldest first, so the newest ones sit on the last page
        let (mut recent, _) = self.comments_page(issue, last)?;
        if recent.len() < COMMENTS_PER_PAGE {
            let previous = if last == 2 {
                first
            } else {
                self.comments_page(issue, last - 1)?.0
            };
            recent = previous.into_iter().chain(recent).collect();
            let excess = recent.len().saturating_sub(COMMENTS_PER_PAGE);
            recent.drain(..excess);
        }
        debug!("Consulting {} comments from page {}", recent.len(), last);

        Ok(recent)
    }

    fn create_comment(&self, issue: u64, body: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url(&format!("issues/{}/comments", issue)))
            .json(&CommentBody { body });
        self.send("create comment", request)?;
        Ok(())
    }

    fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        let request = self
            .client
            .patch(self.url(&format!("issues/comments/{}", comment_id)))
            .json(&CommentBody { body });
        self.send("update comment", request)?;
        Ok(())
    }
}
