//! GitHub repository ingestion over the REST contents API

use anyhow::{Context, Result};
use codeatlas_core::{AnalysisError, FileDescriptor, FileTree};
use futures_util::stream::{self, StreamExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("codeatlas/", env!("CARGO_PKG_VERSION"));

static URL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoLocator {
    pub owner: String,
    pub repo: String,
}

impl RepoLocator {
    /// Parse a repository URL, failing with [`AnalysisError::InvalidLocator`].
    pub fn parse(url: &str) -> Result<Self, AnalysisError> {
        parse_github_url(url).ok_or_else(|| AnalysisError::InvalidLocator(url.to_string()))
    }

    /// Stable identity used to key cached graphs.
    pub fn cache_key(&self) -> String {
        format!("github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Extract owner and repository from anything containing `github.com/<owner>/<repo>`.
pub fn parse_github_url(url: &str) -> Option<RepoLocator> {
    let pattern = URL_PATTERN.get_or_init(|| {
        Regex::new(r"github\.com/([^/]+)/([^/]+)(/|$)").expect("github url pattern is valid")
    });
    let captures = pattern.captures(url)?;
    let owner = captures.get(1)?.as_str();
    let repo = captures.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }
    Some(RepoLocator {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Repository facts reported alongside the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    #[serde(rename = "forks_count")]
    pub forks: u64,
    #[serde(rename = "open_issues_count")]
    pub open_issues: u64,
    #[serde(default, deserialize_with = "license_name")]
    pub license: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Bytes of code per language.
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u64,
}

fn license_name<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum License {
        Name(String),
        Object {
            spdx_id: Option<String>,
            name: Option<String>,
        },
    }
    let license = Option::<License>::deserialize(deserializer)?;
    Ok(license.and_then(|license| match license {
        License::Name(name) => Some(name),
        License::Object { spdx_id, name } => spdx_id.filter(|id| id != "NOASSERTION").or(name),
    }))
}

/// One item of a contents API listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }

    /// Map to a tree entry. Folders get `children`; everything else is a file.
    pub fn into_descriptor(self, children: Vec<FileDescriptor>) -> FileDescriptor {
        if self.is_dir() {
            let mut folder = FileDescriptor::folder(self.path, children);
            folder.name = self.name;
            folder
        } else {
            let mut file = FileDescriptor::file(self.path, self.size);
            file.name = self.name;
            file.content_handle = self.download_url;
            file
        }
    }
}

pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Client authenticated with `GITHUB_TOKEN` when it is set.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error ({}): {}", status, error_text);
        }
        response
            .json()
            .await
            .with_context(|| format!("Failed to decode response from {}", url))
    }

    /// Repository metadata, languages and top contributors. Only the
    /// repository lookup itself is fatal.
    pub async fn metadata(&self, locator: &RepoLocator) -> Result<RepositoryMetadata> {
        let base = format!("{}/repos/{}/{}", self.api_url, locator.owner, locator.repo);
        let mut metadata: RepositoryMetadata = self.get_json(&base).await?;

        match self.get_json(&format!("{base}/languages")).await {
            Ok(languages) => metadata.languages = languages,
            Err(e) => tracing::warn!("Failed to fetch languages for {}: {:#}", locator, e),
        }
        match self.get_json(&format!("{base}/contributors?per_page=10")).await {
            Ok(contributors) => metadata.contributors = contributors,
            Err(e) => tracing::warn!("Failed to fetch contributors for {}: {:#}", locator, e),
        }
        Ok(metadata)
    }

    /// Entries of one folder; a folder that cannot be listed is empty.
    async fn list_folder(&self, locator: &RepoLocator, path: &str) -> Vec<ContentEntry> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, locator.owner, locator.repo, path
        );
        match self.get_json(&url).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to list \"{}\" in {}: {:#}", path, locator, e);
                Vec::new()
            }
        }
    }

    /// List the repository tree level by level, descending at most
    /// `max_depth` folders. At most `max_parallel` listings are in flight.
    pub async fn list_tree(
        &self,
        locator: &RepoLocator,
        max_depth: Option<usize>,
        max_parallel: usize,
    ) -> Vec<FileDescriptor> {
        let mut listings: HashMap<String, Vec<ContentEntry>> = HashMap::new();
        let mut frontier = vec![String::new()];
        let mut depth = 0;

        while !frontier.is_empty() {
            let level: Vec<(String, Vec<ContentEntry>)> = stream::iter(frontier)
                .map(|path| async move {
                    let entries = self.list_folder(locator, &path).await;
                    (path, entries)
                })
                .buffered(max_parallel.max(1))
                .collect()
                .await;

            frontier = if max_depth.is_some_and(|max| depth >= max) {
                Vec::new()
            } else {
                level
                    .iter()
                    .flat_map(|(_, entries)| entries.iter().filter(|e| e.is_dir()))
                    .map(|e| e.path.clone())
                    .collect()
            };
            listings.extend(level);
            depth += 1;
        }

        assemble_listing(&mut listings, "")
    }

    /// Metadata and file tree of one repository.
    pub async fn fetch_repository(
        &self,
        locator: &RepoLocator,
        max_depth: Option<usize>,
        max_parallel: usize,
    ) -> Result<(RepositoryMetadata, FileTree)> {
        tracing::info!("Fetching {} from GitHub", locator);
        let metadata = self.metadata(locator).await?;
        let entries = self.list_tree(locator, max_depth, max_parallel).await;
        tracing::debug!("Listed {} top-level entries of {}", entries.len(), locator);
        Ok((metadata, FileTree::new(entries)))
    }
}

/// Nest the folder listings under `path`. Folders never listed have no children.
fn assemble_listing(listings: &mut HashMap<String, Vec<ContentEntry>>, path: &str) -> Vec<FileDescriptor> {
    let entries = listings.remove(path).unwrap_or_default();
    entries
        .into_iter()
        .map(|entry| {
            let children = if entry.is_dir() {
                assemble_listing(listings, &entry.path)
            } else {
                Vec::new()
            };
            entry.into_descriptor(children)
        })
        .collect()
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::from_env()
    }
}
