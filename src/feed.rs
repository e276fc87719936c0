//! Release feed access: paginated listing plus by-tag detail lookup.

use anyhow::{Context, Result};
use serde::Deserialize;

/// One entry of the paginated releases listing.
#[derive(Clone, Debug, Deserialize)]
pub struct ReleaseSummary {
    pub tag_name: String,
}

/// Full release detail as returned by the by-tag lookup.
#[derive(Clone, Debug, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub body: Option<String>,
}

/// Read access to a reverse-chronological release feed. Page 1 is newest;
/// an empty page signals the end of history.
pub trait ReleaseFeed {
    fn page(&self, page: u32) -> Result<Vec<ReleaseSummary>>;
    fn by_tag(&self, tag: &str) -> Result<Release>;
}

pub struct GithubFeed {
    base_url: String,
    owner: String,
    repo: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl GithubFeed {
    pub fn new(
        base_url: &str,
        owner: &str,
        repo: &str,
        token: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("relnotes")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token,
            client,
        })
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/{}/releases", self.base_url, self.owner, self.repo)
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        let req = self.client.get(url);
        match &self.token {
            Some(token) => req.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token),
            ),
            None => req,
        }
    }
}

impl ReleaseFeed for GithubFeed {
    fn page(&self, page: u32) -> Result<Vec<ReleaseSummary>> {
        let resp = self
            .get(&self.releases_url())
            .query(&[("page", page)])
            .send()
            .with_context(|| format!("fetch releases page {}", page))?;
        let resp = ensure_ok(resp, "list releases")?;
        resp.json().context("parse releases page")
    }

    fn by_tag(&self, tag: &str) -> Result<Release> {
        let url = format!("{}/tags/{}", self.releases_url(), tag);
        let resp = self
            .get(&url)
            .send()
            .with_context(|| format!("fetch release {}", tag))?;
        let resp = ensure_ok(resp, "get release by tag")?;
        resp.json().with_context(|| format!("parse release {}", tag))
    }
}

pub(crate) fn ensure_ok(
    resp: reqwest::blocking::Response,
    label: &str,
) -> Result<reqwest::blocking::Response> {
    if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
        anyhow::bail!("unauthorized (token invalid or expired)");
    }
    if resp.status() == reqwest::StatusCode::FORBIDDEN {
        anyhow::bail!("forbidden (check token permissions or rate limit)");
    }
    resp.error_for_status()
        .with_context(|| format!("{} status", label))
}
