mod admin;
pub mod blocks;
mod client;
pub mod timeline;
mod workspace;

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::config::NotionConfig;
use crate::error::{QuestlogError, Result};
use crate::store::{WorkspaceConnector, WorkspaceStore};

pub use admin::{user_from_blocks, NotionAdmin};
pub use client::{page_url, Block, DatabaseQuery, NotionClient, Page, NOTION_VERSION};
pub use workspace::NotionWorkspace;

/// Opens per-user workspaces against the configured Notion API.
#[derive(Debug, Clone)]
pub struct NotionConnector {
    base_url: String,
    timeout_secs: u64,
}

impl NotionConnector {
    pub fn new(config: &NotionConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl WorkspaceConnector for NotionConnector {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn WorkspaceStore>> {
        let client = NotionClient::new(api_key, &self.base_url, self.timeout_secs)?;
        Ok(Arc::new(NotionWorkspace::new(client)))
    }
}

fn page_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-f0-9]{32}").expect("page id pattern compiles"))
}

/// Pull the 32-hex-digit page id out of a Notion page URL.
pub fn extract_page_id(url: &str) -> Result<String> {
    page_id_pattern()
        .find(url)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| QuestlogError::Validation(format!("Invalid Notion URL: {url}")))
}
