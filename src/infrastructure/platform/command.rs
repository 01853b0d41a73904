//! Host command templates.
//!
//! A template is split on whitespace first and placeholders are substituted
//! per token, so substituted values never split into extra arguments. A token
//! naming a placeholder with no value is dropped. A token consisting solely of
//! a list placeholder expands into zero or more arguments.

use std::collections::HashMap;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Parsed command template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    tokens: Vec<String>,
}

/// Values substituted into a [`CommandTemplate`]
#[derive(Debug, Default, Clone)]
pub struct TemplateVars {
    values: HashMap<&'static str, String>,
    lists: HashMap<&'static str, Vec<String>>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `{name}` to `value`
    #[must_use]
    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Bind `{name}` when `value` is present; tokens using it are dropped otherwise
    #[must_use]
    pub fn set_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    /// Bind a whole-token `{name}` to a list of arguments
    #[must_use]
    pub fn set_list(mut self, name: &'static str, values: Vec<String>) -> Self {
        self.lists.insert(name, values);
        self
    }
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Self {
        Self {
            tokens: template.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Substitute `vars` and return the argument vector
    pub fn render(&self, vars: &TemplateVars) -> Vec<String> {
        let mut args = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            if let Some(list) = whole_placeholder(token).and_then(|name| vars.lists.get(name)) {
                args.extend(list.iter().cloned());
                continue;
            }
            if let Some(rendered) = render_token(token, vars) {
                args.push(rendered);
            }
        }
        args
    }

    /// Render and build a command ready to spawn
    ///
    /// Returns `None` when the rendered template has no program.
    pub fn command(&self, vars: &TemplateVars) -> Option<Command> {
        let args = self.render(vars);
        let (program, rest) = args.split_first()?;
        let mut command = Command::new(program);
        command.args(rest).stdin(Stdio::null()).kill_on_drop(false);
        Some(command)
    }
}

fn whole_placeholder(token: &str) -> Option<&str> {
    token.strip_prefix('{')?.strip_suffix('}')
}

/// Substitute every `{name}` in `token`; `None` if any of them is unbound
fn render_token(token: &str, vars: &TemplateVars) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        out.push_str(&rest[..start]);
        match vars.lists.get(name) {
            Some(list) => out.push_str(&list.join(",")),
            None => out.push_str(vars.values.get(name)?),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// Run a command to completion, capturing its output
pub async fn run_captured(mut command: Command) -> std::io::Result<Output> {
    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
}
