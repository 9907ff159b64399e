// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::Once;

use serde_json::{json, Value};

use questlog::config::LlmConfig;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn llm_config(model: &str, base_url: String, max_retries: u32) -> LlmConfig {
    LlmConfig {
        model: model.to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        timeout_secs: 5,
        max_retries,
    }
}

/// OpenAI chat-completions response carrying `content`.
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

pub fn api_error_body(message: &str, error_type: &str, code: &str) -> Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": Value::Null,
            "code": code
        }
    })
}

/// Gemini `generateContent` response with one candidate made of `parts`.
pub fn gemini_body(parts: Vec<Value>) -> Value {
    json!({
        "candidates": [
            {
                "content": {"role": "model", "parts": parts},
                "finishReason": "STOP"
            }
        ]
    })
}

pub fn gemini_text(text: &str) -> Value {
    gemini_body(vec![json!({"text": text})])
}

fn rich_text(text: &str) -> Value {
    json!([{"type": "text", "text": {"content": text}, "plain_text": text}])
}

/// Database row as returned by Notion, with the given properties.
pub fn notion_page(id: &str, properties: Value) -> Value {
    json!({
        "object": "page",
        "id": id,
        "url": format!("https://www.notion.so/{}", id.replace('-', "")),
        "properties": properties
    })
}

pub fn title_prop(text: &str) -> Value {
    json!({"type": "title", "title": rich_text(text)})
}

pub fn text_prop(text: &str) -> Value {
    json!({"type": "rich_text", "rich_text": rich_text(text)})
}

pub fn select_prop(name: &str) -> Value {
    json!({"type": "select", "select": {"name": name}})
}

pub fn number_prop(value: f64) -> Value {
    json!({"type": "number", "number": value})
}

pub fn text_block(id: &str, kind: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "id": id,
        "type": kind,
        "has_children": false,
        kind: {"rich_text": rich_text(text)}
    })
}

pub fn child_database(id: &str, title: &str) -> Value {
    json!({
        "object": "block",
        "id": id,
        "type": "child_database",
        "has_children": false,
        "child_database": {"title": title}
    })
}

pub fn list(results: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": results,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor
    })
}
