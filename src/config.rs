use std::path::PathBuf;

use anyhow::{Result, bail};

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const OPENAI_API_URL: &str = "https://api.openai.com";

/// Everything a sync run needs, validated up front so a misconfigured
/// invocation fails before the first network call.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub owner: String,
    pub repo: String,
    pub tag_file: PathBuf,
    pub notes_file: PathBuf,
    pub openai_api_key: String,
    pub target_language: String,
    pub model: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub openai_api_url: String,
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            bail!("owner is empty (set --owner or OWNER)");
        }
        if self.repo.trim().is_empty() {
            bail!("repo is empty (set --repo or REPO)");
        }
        if self.openai_api_key.trim().is_empty() {
            bail!("translation credential is empty (set --openai-api-key or OPENAI_API_KEY)");
        }
        if self.target_language.trim().is_empty() {
            bail!("target language is empty");
        }
        if self.model.trim().is_empty() {
            bail!("model is empty");
        }
        Ok(())
    }
}
