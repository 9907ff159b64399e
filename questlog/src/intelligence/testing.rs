use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{QuestlogError, Result};
use crate::llm::{GenerationOptions, GenerativeModel, JsonSchemaSpec};

/// Provider double with one fixed reply per call kind.
pub(crate) struct ScriptedModel {
    text: Option<String>,
    json: Option<Value>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(text: Option<String>, json: Option<Value>) -> Self {
        Self {
            text,
            json,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn text(reply: &str) -> Self {
        Self::new(Some(reply.to_string()), None)
    }

    pub(crate) fn json(reply: Value) -> Self {
        Self::new(None, Some(reply))
    }

    pub(crate) fn failing() -> Self {
        Self::new(None, None)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_prompt(&self) -> String {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _options: &GenerationOptions,
    ) -> Result<String> {
        self.record(prompt);
        self.text
            .clone()
            .ok_or_else(|| QuestlogError::Llm("scripted failure".to_string()))
    }

    async fn complete_json(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _schema: &JsonSchemaSpec,
        _options: &GenerationOptions,
    ) -> Result<Value> {
        self.record(prompt);
        self.json
            .clone()
            .ok_or_else(|| QuestlogError::Llm("scripted failure".to_string()))
    }
}
