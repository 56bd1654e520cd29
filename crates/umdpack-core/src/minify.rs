use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, warn};

use crate::Minifier;
use crate::config::MinifyConfig;
use crate::error::CollaboratorError;

/// Minifies by piping the artifact through an external program
/// (`terser`, `uglifyjs`, `esbuild --minify`, ...) and reading stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMinifier {
    program: String,
    args: Vec<String>,
}

impl CommandMinifier {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from `[program, args...]`. Returns `None` for an empty command.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    pub fn from_config(config: &MinifyConfig) -> Option<Self> {
        Self::from_command(&config.command)
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Minifier for CommandMinifier {
    fn minify(&self, source: &[u8]) -> Result<Vec<u8>, CollaboratorError> {
        debug!("running {} {}", self.program, self.args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CollaboratorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let Some(mut stdin) = child.stdin.take() else {
            return Err(CollaboratorError::Io {
                program: self.program.clone(),
                source: io::Error::other("stdin was not captured"),
            });
        };

        // stdin is fed from a separate thread so a tool that streams its
        // output cannot deadlock against a full stdout pipe.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(source));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(|source| CollaboratorError::Io {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(CollaboratorError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(|source| CollaboratorError::Io {
            program: self.program.clone(),
            source,
        })?;
        if output.stdout.is_empty() {
            return Err(CollaboratorError::EmptyOutput {
                program: self.program.clone(),
            });
        }
        if !output.stderr.is_empty() {
            warn!(
                "{}: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(output.stdout)
    }
}
