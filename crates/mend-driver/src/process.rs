//! Template engine running as an external command.
//!
//! The command is invoked once per parse or execute call, with the mode
//! appended to its arguments and a JSON request on stdin:
//!
//! ```text
//! <command...> parse   {"name": .., "text": .., "functions": [..]}
//! <command...> exec    {"name": .., "text": .., "functions": [..], "data": ..}
//! ```
//!
//! Exit status 0 is success, and for `exec` stdout is the rendered output.
//! Any other status is a failure whose message is the trimmed stderr.

use crate::{DriverError, Result};
use mend_core::{BaseTemplate, DiagnosticGrammar, EngineFailure, GoTextTemplate, TemplateEngine};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::process::{Command, Stdio};

/// A template the external engine accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimTemplate {
    pub name: String,
    pub text: String,
    pub functions: Vec<String>,
}

#[derive(Serialize)]
struct ExecRequest<'a> {
    #[serde(flatten)]
    template: &'a ShimTemplate,
    data: &'a Value,
}

/// Engine that delegates to an external command.
#[derive(Debug, Clone)]
pub struct ProcessEngine<G = GoTextTemplate> {
    program: String,
    args: Vec<String>,
    grammar: G,
}

impl ProcessEngine {
    /// Engine for `command` whose messages follow Go's text/template.
    pub fn new(command: &[String]) -> Result<Self> {
        Self::with_grammar(command, GoTextTemplate)
    }
}

impl<G: DiagnosticGrammar> ProcessEngine<G> {
    /// Engine for `command` whose messages follow `grammar`.
    pub fn with_grammar(command: &[String], grammar: G) -> Result<Self> {
        let (program, args) = command.split_first().ok_or(DriverError::NoEngine)?;
        if program.trim().is_empty() {
            return Err(DriverError::NoEngine);
        }

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            grammar,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the command in `mode` with `input` on stdin; stdout on success.
    fn run(&self, mode: &str, input: Vec<u8>) -> std::result::Result<String, EngineFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(mode)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(program = %self.program, args = ?self.args, mode, "running template engine");

        let mut child = cmd.spawn().map_err(|e| {
            EngineFailure::new(format!(
                "failed to run template engine \"{}\": {}",
                self.program, e
            ))
        })?;

        // stdin is written while stdout and stderr are drained
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || {
                // the engine may exit before reading all of it
                let _ = stdin.write_all(&input);
            })
        });

        let output = child.wait_with_output().map_err(|e| {
            EngineFailure::new(format!(
                "failed to wait for template engine \"{}\": {}",
                self.program, e
            ))
        })?;
        if let Some(writer) = writer {
            let _ = writer.join();
        }

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr.trim();
        if message.is_empty() {
            return Err(EngineFailure::new(format!(
                "template engine \"{}\" {} exited with {}",
                self.program, mode, output.status
            )));
        }
        Err(EngineFailure::new(message))
    }
}

fn encode<T: Serialize>(request: &T) -> std::result::Result<Vec<u8>, EngineFailure> {
    serde_json::to_vec(request)
        .map_err(|e| EngineFailure::new(format!("failed to encode engine request: {e}")))
}

impl<G: DiagnosticGrammar> TemplateEngine for ProcessEngine<G> {
    type Template = ShimTemplate;

    fn grammar(&self) -> &dyn DiagnosticGrammar {
        &self.grammar
    }

    fn name<'t>(&self, template: &'t ShimTemplate) -> &'t str {
        &template.name
    }

    fn parse(&self, base: &BaseTemplate, text: &str) -> std::result::Result<ShimTemplate, EngineFailure> {
        let template = ShimTemplate {
            name: base.name().to_string(),
            text: text.to_string(),
            functions: base.functions().names().map(str::to_string).collect(),
        };
        self.run("parse", encode(&template)?)?;
        Ok(template)
    }

    fn execute(
        &self,
        template: &ShimTemplate,
        data: &Value,
        sink: &mut String,
    ) -> std::result::Result<(), EngineFailure> {
        let output = self.run("exec", encode(&ExecRequest { template, data })?)?;
        sink.push_str(&output);
        Ok(())
    }
}
