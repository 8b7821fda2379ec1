//! Remote ingestion: GitHub repository listing and HTTP content fetching

pub mod github;
pub mod http;


pub use github::{GithubClient, RepoLocator, RepositoryMetadata, parse_github_url};
pub use http::HttpFetcher;
