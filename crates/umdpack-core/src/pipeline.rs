use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::concat::FsConcatenator;
use crate::config::{BuildPlan, PipelineMode};
use crate::error::{ConfigError, PipelineError, WriteError};
use crate::minify::CommandMinifier;
use crate::{Concatenator, Minifier, ModuleWrapper};

/// One step of the build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Concat,
    Wrap,
    Minify,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::Wrap => "wrap",
            Self::Minify => "minify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A file written by a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub stage: Stage,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Artifacts written by a successful run, in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub artifacts: Vec<Artifact>,
}

impl BuildReport {
    /// The artifact consumers should use: the last one written.
    pub fn final_artifact(&self) -> Option<&Artifact> {
        self.artifacts.last()
    }
}

/// Runs concatenation, then wrapping and minification in full mode.
///
/// Stages run strictly in sequence; each artifact is fully written before
/// the next stage starts. The first failure aborts the run. Artifacts already
/// written by earlier stages are left in place.
///
/// There is no locking: two runs writing the same destinations at the same
/// time race, and the result is unspecified.
pub struct Pipeline {
    plan: BuildPlan,
    concatenator: Box<dyn Concatenator>,
    wrapper: Option<Box<dyn ModuleWrapper>>,
    minifier: Option<Box<dyn Minifier>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("plan", &self.plan)
            .field("wrapper", &self.wrapper.is_some())
            .field("minifier", &self.minifier.is_some())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// A pipeline reading inputs from disk. Full mode also needs a wrapper;
    /// the minifier defaults to the configured command.
    pub fn new(plan: BuildPlan) -> Self {
        Self {
            plan,
            concatenator: Box::new(FsConcatenator),
            wrapper: None,
            minifier: None,
        }
    }

    pub fn with_concatenator(mut self, concatenator: impl Concatenator + 'static) -> Self {
        self.concatenator = Box::new(concatenator);
        self
    }

    pub fn with_wrapper(mut self, wrapper: impl ModuleWrapper + 'static) -> Self {
        self.wrapper = Some(Box::new(wrapper));
        self
    }

    pub fn with_minifier(mut self, minifier: impl Minifier + 'static) -> Self {
        self.minifier = Some(Box::new(minifier));
        self
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    pub fn run(&self) -> Result<BuildReport, PipelineError> {
        self.check()?;

        let plan = &self.plan;
        let mut report = BuildReport::default();

        let bundle = self
            .concatenator
            .concatenate(&plan.files, &plan.concat)
            .map_err(|e| PipelineError::new(Stage::Concat, e))?;
        write_artifact(Stage::Concat, &plan.output, &bundle, &mut report)?;

        match &plan.mode {
            PipelineMode::Simple => {}
            PipelineMode::Full(wrap, minify) => {
                let wrapper = self
                    .wrapper
                    .as_deref()
                    .ok_or_else(|| PipelineError::new(Stage::Wrap, ConfigError::MissingWrapper))?;
                let wrapped = wrapper
                    .wrap(&bundle, wrap)
                    .map_err(|e| PipelineError::new(Stage::Wrap, e))?;
                write_artifact(Stage::Wrap, &wrap.destination, &wrapped, &mut report)?;

                let minified = match &self.minifier {
                    Some(minifier) => minifier.minify(&wrapped),
                    None => {
                        let minifier = CommandMinifier::from_config(minify)
                            .ok_or(ConfigError::EmptyMinifyCommand)
                            .map_err(|e| PipelineError::new(Stage::Minify, e))?;
                        info!("minify: running {}", minifier.program());
                        minifier.minify(&wrapped)
                    }
                }
                .map_err(|e| PipelineError::new(Stage::Minify, e))?;
                write_artifact(Stage::Minify, &minify.destination, &minified, &mut report)?;
            }
        }

        Ok(report)
    }

    /// Configuration problems surface before any file is read or written.
    fn check(&self) -> Result<(), PipelineError> {
        self.plan.validate().map_err(|e| {
            let stage = e.stage().unwrap_or(Stage::Concat);
            PipelineError::new(stage, e)
        })?;

        if let PipelineMode::Full(_, minify) = &self.plan.mode {
            if self.wrapper.is_none() {
                return Err(PipelineError::new(Stage::Wrap, ConfigError::MissingWrapper));
            }
            if self.minifier.is_none() && minify.command.is_empty() {
                return Err(PipelineError::new(
                    Stage::Minify,
                    ConfigError::EmptyMinifyCommand,
                ));
            }
        }
        Ok(())
    }
}

/// Write an artifact, creating parent directories and replacing any existing
/// file at `path`.
fn write_artifact(
    stage: Stage,
    path: &Path,
    content: &[u8],
    report: &mut BuildReport,
) -> Result<(), PipelineError> {
    let to_error = |source: std::io::Error| {
        PipelineError::new(
            stage,
            WriteError {
                path: path.to_path_buf(),
                source,
            },
        )
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, content).map_err(to_error)?;

    info!("{stage}: wrote {} ({} bytes)", path.display(), content.len());
    report.artifacts.push(Artifact {
        stage,
        path: path.to_path_buf(),
        bytes: content.len(),
    });
    Ok(())
}
