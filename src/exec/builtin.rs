// src/exec/builtin.rs

//! Built-in task functions selectable from configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::errors::{QueryDagError, Result};
use crate::exec::command::{extract_json_block, run_command};
use crate::exec::task_fn::{TaskContext, TaskFunction, TaskFunctions, TaskFuture};
use crate::exec::template::PromptTemplate;
use crate::types::{Record, TaskFnKind};

/// Returns the task's own record unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTaskFn;

impl TaskFunction for EchoTaskFn {
    fn call(&self, ctx: TaskContext) -> TaskFuture<'_> {
        Box::pin(async move { Ok(ctx.output(ctx.template.clone())) })
    }
}

/// Renders the prompt template, pipes it into an external command and
/// parses the JSON object in the reply.
///
/// A reply without a JSON object yields an empty output (nothing merged);
/// a failing command fails the task.
#[derive(Debug, Clone)]
pub struct CommandTaskFn {
    cmd: String,
    template: PromptTemplate,
    timeout: Option<Duration>,
}

impl CommandTaskFn {
    pub fn new(cmd: impl Into<String>, template: PromptTemplate) -> Self {
        Self {
            cmd: cmd.into(),
            template,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl TaskFunction for CommandTaskFn {
    fn call(&self, ctx: TaskContext) -> TaskFuture<'_> {
        Box::pin(async move {
            let prompt = self.template.render(&ctx)?;
            let reply = run_command(&self.cmd, &prompt, self.timeout).await?;

            match extract_json_block(&reply) {
                Some(Value::Object(output)) => Ok(output),
                Some(_) | None => {
                    warn!(task = %ctx.task, "command reply has no JSON object; nothing to merge");
                    debug!(task = %ctx.task, reply = %reply, "unparsed command reply");
                    Ok(Record::new())
                }
            }
        })
    }
}

impl TaskFunctions {
    /// Build the registry described by `[workflow]` and `[task.<name>]`.
    ///
    /// Relative template paths are resolved against `base_dir` (normally the
    /// directory holding the config file).
    pub fn from_config(cfg: &ConfigFile, base_dir: &Path) -> Result<Self> {
        let template = match cfg.workflow.template.as_ref() {
            Some(path) => PromptTemplate::load(base_dir.join(path))?,
            None => PromptTemplate::default(),
        };

        let build = |kind: TaskFnKind| -> Result<Arc<dyn TaskFunction>> {
            match kind {
                TaskFnKind::Echo => Ok(Arc::new(EchoTaskFn)),
                TaskFnKind::Command => {
                    let command = cfg.workflow.command.as_ref().ok_or_else(|| {
                        QueryDagError::ConfigError(
                            "task_fn = \"command\" requires [workflow.command]".to_string(),
                        )
                    })?;
                    Ok(Arc::new(
                        CommandTaskFn::new(command.cmd.clone(), template.clone())
                            .with_timeout(command.timeout()),
                    ))
                }
            }
        };

        let mut functions = TaskFunctions::new();
        functions.set_default(build(cfg.workflow.task_fn)?);
        for (name, task) in cfg.task.iter() {
            if let Some(kind) = task.task_fn {
                functions.insert(name.clone(), build(kind)?);
            }
        }

        Ok(functions)
    }
}
