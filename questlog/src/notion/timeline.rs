//! Timeline page layout.
//!
//! A timeline page is a `🕒 하루 활동 기록` heading followed by one group per
//! activity: a `start - end` heading_3, the activity title as a paragraph,
//! an optional `💭` callout with the user's thoughts, and a divider.

use serde_json::Value;

use crate::models::{ActivityLog, TimelineEntry};

use super::blocks::{self, block_text};
use super::client::Block;

pub const TIMELINE_HEADING: &str = "🕒 하루 활동 기록";
pub const THOUGHTS_EMOJI: &str = "💭";

/// Sort activities by start time, keeping input order for ties.
pub fn sort_activities(activities: &[ActivityLog]) -> Vec<ActivityLog> {
    let mut sorted = activities.to_vec();
    sorted.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    sorted
}

pub fn timeline_blocks(activities: &[ActivityLog]) -> Vec<Value> {
    let mut content = vec![blocks::heading_1(TIMELINE_HEADING)];

    for activity in sort_activities(activities) {
        content.push(blocks::heading_3(&activity.time_range()));
        content.push(blocks::paragraph(&activity.title));
        if let Some(thoughts) = activity.thoughts.as_deref().filter(|t| !t.trim().is_empty()) {
            content.push(blocks::callout(thoughts, THOUGHTS_EMOJI));
        }
        content.push(blocks::divider());
    }

    content
}

#[derive(Default)]
struct PendingEntry {
    time: String,
    activity: Option<String>,
    thoughts: Option<String>,
}

impl PendingEntry {
    fn finish(self) -> Option<TimelineEntry> {
        if self.time.is_empty() {
            return None;
        }
        Some(TimelineEntry {
            time: self.time,
            activity: self.activity.unwrap_or_default(),
            thoughts: self.thoughts,
        })
    }
}

/// Rebuild timeline entries from a timeline page's blocks.
///
/// A heading_3 opens an entry, the first paragraph after it is the activity,
/// a callout holds the thoughts, and a divider (or the next heading_3)
/// closes it. Blocks outside an open entry are ignored.
pub fn entries_from_blocks(blocks: &[Block]) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<PendingEntry> = None;

    for block in blocks {
        match block.kind.as_str() {
            "heading_3" => {
                if let Some(entry) = pending.take().and_then(PendingEntry::finish) {
                    entries.push(entry);
                }
                let time = block_text(block).unwrap_or_default().trim().to_string();
                pending = Some(PendingEntry {
                    time,
                    ..Default::default()
                });
            }
            "paragraph" => {
                if let Some(entry) = pending.as_mut() {
                    if entry.activity.is_none() {
                        entry.activity = block_text(block).map(|t| t.trim().to_string());
                    }
                }
            }
            "callout" => {
                if let Some(entry) = pending.as_mut() {
                    entry.thoughts = block_text(block)
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty());
                }
            }
            "divider" => {
                if let Some(entry) = pending.take().and_then(PendingEntry::finish) {
                    entries.push(entry);
                }
            }
            _ => {}
        }
    }

    if let Some(entry) = pending.and_then(PendingEntry::finish) {
        entries.push(entry);
    }

    entries
}
