use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::error::{QuestlogError, Result};

pub const NOTION_VERSION: &str = "2022-06-28";

/// Notion caps `children` arrays and page sizes at 100 entries.
pub const MAX_BATCH: usize = 100;

/// A database row or standalone page.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A content block. The type-specific payload stays as raw JSON under
/// `content[kind]`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Block {
    pub fn payload(&self) -> Option<&Value> {
        self.content.get(&self.kind)
    }
}

#[derive(Debug, Deserialize)]
struct PaginatedList<T> {
    results: Vec<T>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Filter, sort and limit for a database query.
#[derive(Debug, Clone, Default)]
pub struct DatabaseQuery {
    pub filter: Option<Value>,
    pub sorts: Vec<Value>,
    /// Stop after this many rows. `None` reads every page of results.
    pub limit: Option<usize>,
}

impl DatabaseQuery {
    pub fn filtered(filter: Value) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }

    pub fn sorted_by(mut self, sort: Value) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Thin client over the Notion REST endpoints this service uses.
#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl NotionClient {
    pub fn new(token: &str, base_url: &str, timeout_secs: u64) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(QuestlogError::Validation(
                "Notion integration token is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| QuestlogError::Notion(format!("Failed to create HTTP client: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| QuestlogError::Validation(format!("Invalid Notion token: {e}")))?,
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    pub async fn query_database(&self, database_id: &str, query: &DatabaseQuery) -> Result<Vec<Page>> {
        let path = format!("databases/{database_id}/query");
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let remaining = query.limit.map(|limit| limit.saturating_sub(pages.len()));
            if remaining == Some(0) {
                break;
            }

            let mut body = Map::new();
            if let Some(filter) = &query.filter {
                body.insert("filter".to_string(), filter.clone());
            }
            if !query.sorts.is_empty() {
                body.insert("sorts".to_string(), Value::Array(query.sorts.clone()));
            }
            let page_size = remaining.unwrap_or(MAX_BATCH).min(MAX_BATCH);
            body.insert("page_size".to_string(), json!(page_size));
            if let Some(cursor) = &cursor {
                body.insert("start_cursor".to_string(), json!(cursor));
            }

            let list: PaginatedList<Page> = self
                .send(Method::POST, &path, Some(Value::Object(body)))
                .await?;
            pages.extend(list.results);

            match (list.has_more, list.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        if let Some(limit) = query.limit {
            pages.truncate(limit);
        }
        tracing::debug!(database_id, count = pages.len(), "Queried Notion database");
        Ok(pages)
    }

    /// Create a page under a database. Children beyond the first batch are
    /// appended afterwards.
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Value,
        children: Vec<Value>,
    ) -> Result<Page> {
        let mut children = children;
        let rest = if children.len() > MAX_BATCH {
            children.split_off(MAX_BATCH)
        } else {
            Vec::new()
        };

        let body = json!({
            "parent": {"database_id": database_id},
            "properties": properties,
            "children": children,
        });
        let page: Page = self.send(Method::POST, "pages", Some(body)).await?;

        if !rest.is_empty() {
            self.append_block_children(&page.id, rest).await?;
        }

        tracing::debug!(database_id, page_id = %page.id, "Created Notion page");
        Ok(page)
    }

    pub async fn update_page(&self, page_id: &str, properties: Value) -> Result<Page> {
        let body = json!({ "properties": properties });
        self.send(Method::PATCH, &format!("pages/{page_id}"), Some(body))
            .await
    }

    pub async fn list_block_children(&self, block_id: &str) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut path = format!("blocks/{block_id}/children?page_size={MAX_BATCH}");
            if let Some(cursor) = &cursor {
                path.push_str(&format!("&start_cursor={cursor}"));
            }

            let list: PaginatedList<Block> = self.send(Method::GET, &path, None).await?;
            blocks.extend(list.results);

            match (list.has_more, list.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(blocks)
    }

    pub async fn append_block_children(&self, block_id: &str, children: Vec<Value>) -> Result<()> {
        let path = format!("blocks/{block_id}/children");
        for batch in children.chunks(MAX_BATCH) {
            let body = json!({ "children": batch });
            let _: Value = self.send(Method::PATCH, &path, Some(body)).await?;
        }
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.headers.clone());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| QuestlogError::Notion(format!("Failed to parse response: {e}")));
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<NotionErrorBody>(&text)
            .ok()
            .map(|body| {
                format!(
                    "{}: {}",
                    body.code.unwrap_or_else(|| "error".to_string()),
                    body.message.unwrap_or_default()
                )
            })
            .unwrap_or(text);

        tracing::warn!(%method, path, status = status.as_u16(), %detail, "Notion request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => QuestlogError::ApiAuth(detail),
            StatusCode::NOT_FOUND => QuestlogError::NotFound(detail),
            StatusCode::TOO_MANY_REQUESTS => QuestlogError::ApiRateLimit { retry_after },
            _ => QuestlogError::Notion(format!("API error {status}: {detail}")),
        })
    }
}

/// Public URL of a page, preferring the one Notion returned.
pub fn page_url(page: &Page) -> String {
    page.url
        .clone()
        .unwrap_or_else(|| format!("https://notion.so/{}", page.id.replace('-', "")))
}
