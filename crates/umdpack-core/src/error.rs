use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::pipeline::Stage;

/// A listed input file is missing or unreadable.
#[derive(Debug, Error)]
#[error("failed to read {}: {source}", .path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// An artifact could not be written to its destination.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid export path `{path}`: {reason}")]
    InvalidExportPath { path: String, reason: String },

    #[error("invalid module id `{0}`: expected letters, digits, `-`, `_`, `.`, `/` or `@`")]
    InvalidModuleId(String),

    #[error("invalid global alias `{0}`: not a JavaScript identifier")]
    InvalidGlobalAlias(String),

    #[error("a `minify` section requires a `wrap` section")]
    MinifyWithoutWrap,

    #[error("minify command is empty")]
    EmptyMinifyCommand,

    #[error("stages `{first}` and `{second}` both write {}", .path.display())]
    OutputCollision {
        first: Stage,
        second: Stage,
        path: PathBuf,
    },

    #[error("stage `{stage}` would overwrite its input {}", .path.display())]
    OutputOverwritesInput { stage: Stage, path: PathBuf },

    #[error("full mode requires a module wrapper")]
    MissingWrapper,
}

impl ConfigError {
    /// The stage whose settings are at fault. `None` when the file itself
    /// could not be read or parsed.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Io { .. } | Self::Yaml(_) => None,
            Self::MissingField(field) if field.starts_with("wrap.") => Some(Stage::Wrap),
            Self::MissingField(_) => Some(Stage::Concat),
            Self::InvalidExportPath { .. }
            | Self::InvalidModuleId(_)
            | Self::InvalidGlobalAlias(_)
            | Self::MissingWrapper => Some(Stage::Wrap),
            Self::MinifyWithoutWrap | Self::EmptyMinifyCommand => Some(Stage::Minify),
            Self::OutputCollision { second, .. } => Some(*second),
            Self::OutputOverwritesInput { stage, .. } => Some(*stage),
        }
    }
}

/// An external wrapping or minification tool reported failure.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("I/O error while talking to `{program}`: {source}")]
    Io { program: String, source: io::Error },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{program}` produced no output")]
    EmptyOutput { program: String },

    #[error("template error: {0}")]
    Template(String),
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Failure of a pipeline run, tagged with the stage that failed.
#[derive(Debug, Error)]
#[error("stage `{stage}` failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
