use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use std::fmt;
use std::fmt::Write as _;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::github::model::{GraphQlRequest, GraphQlResponse};
use crate::humanize::relative_time;
use crate::model::{ReleaseInfo, ReleaseQueryResult};

pub mod model;

pub const GITHUB_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

/// A tracked repository; `key` is the GraphQL alias and the label in replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    pub key: &'static str,
    pub owner: &'static str,
    pub name: &'static str,
}

pub const PROJECTS: &[Project] = &[
    Project { key: "selenoid", owner: "aerokube", name: "selenoid" },
    Project { key: "moon", owner: "aerokube", name: "moon" },
    Project { key: "cm", owner: "aerokube", name: "cm" },
    Project { key: "selenoid_ui", owner: "aerokube", name: "selenoid-ui" },
    Project { key: "ggr", owner: "aerokube", name: "ggr" },
    Project { key: "ggr_ui", owner: "aerokube", name: "ggr-ui" },
];

const RELEASE_FRAGMENT: &str = "fragment release on Repository {
  releases(first: 1, orderBy: {field: CREATED_AT, direction: DESC}) {
    nodes {
      url
      publishedAt
      tag {
        name
      }
    }
  }
}
";

/// Produces the `/releases` reply text.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn fetch_releases(&self) -> Result<String>;
}

#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    endpoint: Url,
    token: String,
    projects: &'static [Project],
}

impl fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubClient")
            .field("endpoint", &self.endpoint)
            .field("projects", &self.projects.len())
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    pub fn new(token: String, endpoint: Url) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("tg-releasebot/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build GitHub HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            token,
            projects: PROJECTS,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let endpoint = Url::parse(&cfg.github.endpoint).context("invalid GitHub endpoint")?;
        Self::new(cfg.github.token.clone(), endpoint)
    }

    pub fn with_projects(mut self, projects: &'static [Project]) -> Self {
        self.projects = projects;
        self
    }

    pub fn build_request(&self) -> Result<reqwest::Request> {
        let query = build_query(self.projects);
        self.http
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .json(&GraphQlRequest { query: &query })
            .build()
            .context("failed to build GitHub request")
    }

    /// One GraphQL round trip for all tracked projects.
    #[instrument(skip_all)]
    pub async fn latest_releases(&self) -> Result<ReleaseQueryResult> {
        let request = self.build_request()?;
        debug!(url=%request.url(), projects = self.projects.len(), "querying GitHub releases");

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach GitHub")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("github error {}: {}", status, body));
        }

        let body = res.text().await.context("failed to read GitHub response")?;
        let payload: GraphQlResponse =
            serde_json::from_str(&body).context("invalid GitHub response JSON")?;
        collect_releases(payload)
    }
}

#[async_trait]
impl ReleaseSource for GithubClient {
    async fn fetch_releases(&self) -> Result<String> {
        let releases = self.latest_releases().await?;
        info!(projects = releases.len(), "fetched releases");
        Ok(format_releases(&releases, Utc::now()))
    }
}

pub fn build_query(projects: &[Project]) -> String {
    let mut query = String::from(RELEASE_FRAGMENT);
    query.push_str("\nquery repos {\n");
    for project in projects {
        let _ = writeln!(
            query,
            "  {}: repository(owner: \"{}\", name: \"{}\") {{\n    ...release\n  }}",
            project.key, project.owner, project.name
        );
    }
    query.push_str("}\n");
    query
}

/// Keep one release per project; projects without a usable release are
/// skipped with a warning instead of failing the whole reply.
pub fn collect_releases(payload: GraphQlResponse) -> Result<ReleaseQueryResult> {
    for err in &payload.errors {
        warn!(error = %err, "GitHub GraphQL error");
    }
    let data = payload
        .data
        .ok_or_else(|| anyhow!("GitHub response has no data"))?;

    let mut releases = ReleaseQueryResult::new();
    for (key, repo) in data {
        let Some(repo) = repo else {
            warn!(project = %key, "repository not found; skipping");
            continue;
        };
        let Some(node) = repo.releases.nodes.into_iter().next() else {
            warn!(project = %key, "no releases published; skipping");
            continue;
        };
        let (Some(tag), Some(published_at)) = (node.tag, node.published_at) else {
            warn!(project = %key, url = %node.url, "latest release has no tag or publish date; skipping");
            continue;
        };
        releases.insert(
            key,
            ReleaseInfo {
                tag_name: tag.name,
                url: node.url,
                published_at,
            },
        );
    }
    Ok(releases)
}

pub fn format_releases(releases: &ReleaseQueryResult, now: DateTime<Utc>) -> String {
    releases
        .iter()
        .map(|(key, rel)| {
            format!(
                "*{}*: [{}]({}) - {}",
                key,
                rel.tag_name,
                rel.url,
                relative_time(rel.published_at, now)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
