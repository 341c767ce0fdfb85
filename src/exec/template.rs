// src/exec/template.rs

//! Prompt template handed to command-backed task functions.
//!
//! A template is a JSON document. Its `Action` string may contain `{query}`
//! and `{template}` placeholders. Rendering for a task:
//! - replaces `{query}` with the user query;
//! - replaces `{template}` with the task's field skeleton
//!   (`{"task": {"field": ""}}`), telling the backend which fields to fill;
//! - sets `Template` to `{"task": <current record>}`;
//! - sets `Context` to the predecessor records plus the task's own record,
//!   when the task has predecessors.
//!
//! ```json
//! {
//!   "Role": "query planner",
//!   "Action": "Refine the sub-task for: {query}. Return {template} as JSON."
//! }
//! ```

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::{QueryDagError, Result};
use crate::exec::task_fn::TaskContext;
use crate::types::Record;

const ACTION_KEY: &str = "Action";
const TEMPLATE_KEY: &str = "Template";
const CONTEXT_KEY: &str = "Context";

const DEFAULT_ACTION: &str = "User query: {query}\n\
Fill in the JSON object {template} for this sub-task. Use the records in \
Context when present. Reply with a single JSON object keyed by the task name.";

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    doc: Record,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        let mut doc = Record::new();
        doc.insert(ACTION_KEY.to_string(), Value::String(DEFAULT_ACTION.to_string()));
        Self { doc }
    }
}

impl PromptTemplate {
    pub fn from_record(doc: Record) -> Self {
        Self { doc }
    }

    /// Load a template from a JSON file containing an object.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(doc) => Ok(Self { doc }),
            _ => Err(QueryDagError::ConfigError(format!(
                "prompt template {} must contain a JSON object",
                path.display()
            ))),
        }
    }

    /// Render the prompt document for one task.
    pub fn render(&self, ctx: &TaskContext) -> Result<String> {
        let mut doc = self.doc.clone();

        let skeleton: Record = ctx
            .template
            .keys()
            .map(|k| (k.clone(), Value::String(String::new())))
            .collect();
        let skeleton = serde_json::to_string(&ctx.output(skeleton))?;

        if let Some(Value::String(action)) = doc.get_mut(ACTION_KEY) {
            *action = action
                .replace("{query}", &ctx.query)
                .replace("{template}", &skeleton)
                .replace("{Template}", &skeleton);
        }

        doc.insert(
            TEMPLATE_KEY.to_string(),
            Value::Object(ctx.output(ctx.template.clone())),
        );

        if !ctx.dependencies.is_empty() {
            doc.insert(CONTEXT_KEY.to_string(), Value::Object(ctx.combined()));
        }

        Ok(serde_json::to_string_pretty(&doc)?)
    }
}
