//! Builders and readers for Notion blocks and page properties.

use serde_json::{json, Map, Value};

use super::client::{Block, Page};

/// Notion rejects rich-text segments longer than this.
const MAX_TEXT_LEN: usize = 2000;

pub fn rich_text(content: &str) -> Value {
    let chars: Vec<char> = content.chars().collect();
    if chars.is_empty() {
        return json!([]);
    }
    let segments: Vec<Value> = chars
        .chunks(MAX_TEXT_LEN)
        .map(|chunk| {
            let text: String = chunk.iter().collect();
            json!({"type": "text", "text": {"content": text}})
        })
        .collect();
    Value::Array(segments)
}

fn text_block(kind: &str, content: &str) -> Value {
    json!({
        "object": "block",
        "type": kind,
        kind: {"rich_text": rich_text(content)}
    })
}

pub fn heading_1(content: &str) -> Value {
    text_block("heading_1", content)
}

pub fn heading_2(content: &str) -> Value {
    text_block("heading_2", content)
}

pub fn heading_3(content: &str) -> Value {
    text_block("heading_3", content)
}

pub fn paragraph(content: &str) -> Value {
    text_block("paragraph", content)
}

pub fn bulleted_item(content: &str) -> Value {
    text_block("bulleted_list_item", content)
}

pub fn callout(content: &str, emoji: &str) -> Value {
    json!({
        "object": "block",
        "type": "callout",
        "callout": {
            "rich_text": rich_text(content),
            "icon": {"type": "emoji", "emoji": emoji}
        }
    })
}

pub fn divider() -> Value {
    json!({"object": "block", "type": "divider", "divider": {}})
}

pub fn code(content: &str, language: &str) -> Value {
    json!({
        "object": "block",
        "type": "code",
        "code": {"language": language, "rich_text": rich_text(content)}
    })
}

pub fn title_property(content: &str) -> Value {
    json!({"title": rich_text(content)})
}

pub fn text_property(content: &str) -> Value {
    json!({"rich_text": rich_text(content)})
}

pub fn select_property(name: &str) -> Value {
    json!({"select": {"name": name}})
}

pub fn date_property(start: &str) -> Value {
    json!({"date": {"start": start}})
}

pub fn number_property(value: f64) -> Value {
    json!({"number": value})
}

/// Concatenate a rich-text array, preferring `plain_text` over `text.content`.
pub fn plain_text(rich: &Value) -> String {
    rich.as_array()
        .map(|segments| {
            segments
                .iter()
                .filter_map(|segment| {
                    segment
                        .get("plain_text")
                        .and_then(Value::as_str)
                        .or_else(|| segment.pointer("/text/content").and_then(Value::as_str))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Text of a text-bearing block, `None` for blocks without rich text.
pub fn block_text(block: &Block) -> Option<String> {
    block
        .payload()
        .and_then(|payload| payload.get("rich_text"))
        .map(plain_text)
}

pub fn code_language(block: &Block) -> Option<&str> {
    block
        .payload()
        .and_then(|payload| payload.get("language"))
        .and_then(Value::as_str)
}

/// Read a property as text. Handles title, rich_text, select, number and
/// date properties. Empty values read as `None`.
pub fn property_text(properties: &Map<String, Value>, name: &str) -> Option<String> {
    let property = properties.get(name)?;
    let kind = property.get("type").and_then(Value::as_str).or_else(|| {
        ["title", "rich_text", "select", "number", "date"]
            .into_iter()
            .find(|kind| property.get(*kind).is_some())
    })?;

    let text = match kind {
        "title" | "rich_text" => property.get(kind).map(plain_text),
        "select" => property
            .pointer("/select/name")
            .and_then(Value::as_str)
            .map(str::to_string),
        "number" => property
            .get("number")
            .and_then(Value::as_f64)
            .map(|n| n.to_string()),
        "date" => property
            .pointer("/date/start")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }?;

    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

pub fn property_number(properties: &Map<String, Value>, name: &str) -> Option<f64> {
    properties.get(name)?.get("number")?.as_f64()
}

/// Title of a database row, whatever its title property is called.
pub fn page_title(page: &Page) -> Option<String> {
    page.properties.iter().find_map(|(_, property)| {
        let title = property.get("title")?;
        let text = plain_text(title);
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(value: Value) -> Block {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn long_text_is_split_into_segments() {
        let long = "가".repeat(MAX_TEXT_LEN + 5);
        let segments = rich_text(&long);
        assert_eq!(segments.as_array().unwrap().len(), 2);
        assert_eq!(plain_text(&segments), long);
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert_eq!(rich_text(""), json!([]));
    }

    #[test]
    fn builders_nest_payload_under_type() {
        let heading = heading_3("09:00 - 10:00");
        assert_eq!(heading["type"], "heading_3");
        assert_eq!(
            heading["heading_3"]["rich_text"][0]["text"]["content"],
            "09:00 - 10:00"
        );
        assert_eq!(callout("생각", "💭")["callout"]["icon"]["emoji"], "💭");
    }

    #[test]
    fn block_text_reads_plain_text() {
        let b = block(json!({
            "id": "1",
            "type": "quote",
            "quote": {"rich_text": [
                {"plain_text": "첫 ", "text": {"content": "첫 "}},
                {"plain_text": "문장"}
            ]}
        }));
        assert_eq!(block_text(&b).as_deref(), Some("첫 문장"));

        let d = block(json!({"id": "2", "type": "divider", "divider": {}}));
        assert_eq!(block_text(&d), None);
    }

    #[test]
    fn property_text_handles_each_kind() {
        let properties = json!({
            "Name": {"type": "title", "title": [{"plain_text": "Hero"}]},
            "MBTI": {"type": "rich_text", "rich_text": [{"plain_text": "INFP"}]},
            "Status": {"type": "select", "select": {"name": "Active"}},
            "Duration": {"type": "number", "number": 30.0},
            "Date": {"type": "date", "date": {"start": "2024-05-01"}},
            "Goals": {"type": "rich_text", "rich_text": []}
        });
        let properties = properties.as_object().unwrap();

        assert_eq!(property_text(properties, "Name").as_deref(), Some("Hero"));
        assert_eq!(property_text(properties, "MBTI").as_deref(), Some("INFP"));
        assert_eq!(property_text(properties, "Status").as_deref(), Some("Active"));
        assert_eq!(property_text(properties, "Date").as_deref(), Some("2024-05-01"));
        assert_eq!(property_number(properties, "Duration"), Some(30.0));
        assert_eq!(property_text(properties, "Goals"), None);
        assert_eq!(property_text(properties, "Missing"), None);
    }

    #[test]
    fn page_title_finds_title_property() {
        let page: Page = serde_json::from_value(json!({
            "id": "p",
            "properties": {"Title": {"type": "title", "title": [{"plain_text": "2024-05-01 일기"}]}}
        }))
        .unwrap();
        assert_eq!(page_title(&page).as_deref(), Some("2024-05-01 일기"));
    }
}
