use std::fs;
use std::path::{Path, PathBuf};

use heck::ToLowerCamelCase;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::export_path::{ExportPath, is_identifier};
use crate::file_list::FileList;
use crate::pipeline::Stage;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".umdpack.yaml";

/// Minifier invoked when the `minify` section does not name one.
pub const DEFAULT_MINIFY_COMMAND: [&str; 5] = ["npx", "--yes", "terser", "--compress", "--mangle"];

/// Top-level project configuration loaded from `.umdpack.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Input files, joined in the order listed.
    pub files: Vec<String>,
    /// Destination of the concatenated bundle.
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub concat: ConcatOptions,
    /// Presence of this section selects full mode.
    #[serde(default)]
    pub wrap: Option<WrapSection>,
    #[serde(default)]
    pub minify: Option<MinifySection>,
}

/// Text placed around and between the joined files. All empty by default,
/// which yields an exact byte-for-byte join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConcatOptions {
    pub banner: String,
    pub separator: String,
    pub footer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WrapSection {
    pub output: String,
    /// Dotted path of the object to export, e.g. `org.cometd`.
    pub export: String,
    /// Identifier the module registers under with an AMD loader.
    pub module_id: String,
    /// Global variable assigned when no loader is present. Defaults to the
    /// camel-cased module id.
    pub global_alias: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifySection {
    /// Defaults to the wrapped output with `-min` before the extension.
    pub output: Option<String>,
    /// Program and arguments; the artifact is piped through stdin/stdout.
    pub command: Option<Vec<String>>,
}

/// Validated settings for the wrapping stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapConfig {
    /// The concatenated artifact this stage consumes. The pipeline hands the
    /// bytes over in memory once that file is written; the path is recorded
    /// for reporting.
    pub source: PathBuf,
    pub destination: PathBuf,
    pub export: ExportPath,
    pub module_id: String,
    pub global_alias: String,
}

/// Validated settings for the minification stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyConfig {
    /// The wrapped artifact this stage consumes, recorded for reporting.
    pub source: PathBuf,
    pub destination: PathBuf,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineMode {
    /// Concatenation only.
    Simple,
    /// Concatenation, wrapping, then minification.
    Full(WrapConfig, MinifyConfig),
}

/// Everything a pipeline run needs, with paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub files: FileList,
    pub output: PathBuf,
    pub concat: ConcatOptions,
    pub mode: PipelineMode,
}

impl BuildPlan {
    /// A concatenation-only plan with default options.
    pub fn simple(files: FileList, output: impl Into<PathBuf>) -> Self {
        Self {
            files,
            output: output.into(),
            concat: ConcatOptions::default(),
            mode: PipelineMode::Simple,
        }
    }

    /// Drop the wrapping and minification stages.
    pub fn into_simple(self) -> Self {
        Self {
            mode: PipelineMode::Simple,
            ..self
        }
    }

    /// Destination of every stage, in execution order.
    pub fn outputs(&self) -> Vec<(Stage, &Path)> {
        let mut outputs = vec![(Stage::Concat, self.output.as_path())];
        if let PipelineMode::Full(wrap, minify) = &self.mode {
            outputs.push((Stage::Wrap, wrap.destination.as_path()));
            outputs.push((Stage::Minify, minify.destination.as_path()));
        }
        outputs
    }

    /// Check invariants that span stages. Runs before any file I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("output"));
        }
        let outputs = self.outputs();
        for (i, (first, path)) in outputs.iter().enumerate() {
            if let Some((second, _)) = outputs[i + 1..].iter().find(|(_, p)| p == path) {
                return Err(ConfigError::OutputCollision {
                    first: *first,
                    second: *second,
                    path: path.to_path_buf(),
                });
            }
            if self.files.iter().any(|input| input == *path) {
                return Err(ConfigError::OutputOverwritesInput {
                    stage: *first,
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

impl BundleConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Validate the configuration and resolve its paths against `base_dir`.
    pub fn plan(&self, base_dir: &Path) -> Result<BuildPlan, ConfigError> {
        if self.output.trim().is_empty() {
            return Err(ConfigError::MissingField("output"));
        }
        let output = base_dir.join(&self.output);

        let mode = match (&self.wrap, &self.minify) {
            (None, None) => PipelineMode::Simple,
            (None, Some(_)) => return Err(ConfigError::MinifyWithoutWrap),
            (Some(wrap), minify) => {
                let wrap = wrap.validate(&output, base_dir)?;
                let minify = validate_minify(minify.as_ref(), &wrap.destination, base_dir)?;
                PipelineMode::Full(wrap, minify)
            }
        };

        let plan = BuildPlan {
            files: FileList::new(&self.files).resolve(base_dir),
            output,
            concat: self.concat.clone(),
            mode,
        };
        plan.validate()?;
        Ok(plan)
    }
}

impl WrapSection {
    fn validate(&self, source: &Path, base_dir: &Path) -> Result<WrapConfig, ConfigError> {
        if self.output.trim().is_empty() {
            return Err(ConfigError::MissingField("wrap.output"));
        }
        if self.export.trim().is_empty() {
            return Err(ConfigError::MissingField("wrap.export"));
        }
        if self.module_id.trim().is_empty() {
            return Err(ConfigError::MissingField("wrap.module_id"));
        }

        let export = ExportPath::parse(&self.export)?;

        if !is_module_id(&self.module_id) {
            return Err(ConfigError::InvalidModuleId(self.module_id.clone()));
        }

        let global_alias = self
            .global_alias
            .clone()
            .unwrap_or_else(|| self.module_id.to_lower_camel_case());
        if !is_identifier(&global_alias) {
            return Err(ConfigError::InvalidGlobalAlias(global_alias));
        }

        Ok(WrapConfig {
            source: source.to_path_buf(),
            destination: base_dir.join(&self.output),
            export,
            module_id: self.module_id.clone(),
            global_alias,
        })
    }
}

fn validate_minify(
    section: Option<&MinifySection>,
    wrapped: &Path,
    base_dir: &Path,
) -> Result<MinifyConfig, ConfigError> {
    let section = section.cloned().unwrap_or_default();

    let destination = match section.output {
        Some(ref output) if !output.trim().is_empty() => base_dir.join(output),
        _ => minified_path(wrapped),
    };

    let command = section
        .command
        .unwrap_or_else(|| DEFAULT_MINIFY_COMMAND.iter().map(|s| s.to_string()).collect());
    if command.first().is_none_or(|program| program.trim().is_empty()) {
        return Err(ConfigError::EmptyMinifyCommand);
    }

    Ok(MinifyConfig {
        source: wrapped.to_path_buf(),
        destination,
        command,
    })
}

/// Insert `-min` before the extension: `target/cometd.js` → `target/cometd-min.js`.
pub fn minified_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-min.{}", ext.to_string_lossy()),
        None => format!("{stem}-min"),
    };
    path.with_file_name(name)
}

/// Module ids end up inside a JavaScript string literal, so only a
/// conservative character set is accepted.
fn is_module_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '@'))
}

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<BundleConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    BundleConfig::from_yaml(&content).map(Some)
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# umdpack configuration
# Files are joined byte-for-byte in the order listed. Paths are relative to
# this file.
files:
  - src/core.js
  - src/transport.js
  - src/extensions.js

# Simple mode writes only this file. In full mode it is an intermediate
# artifact that consumers should not depend on.
output: target/bundle-tmp.js

concat:
  banner: ""
  separator: ""
  footer: ""

# Uncomment to wrap the bundle as a universal module and minify it.
# wrap:
#   output: target/bundle.js
#   export: org.example      # dotted path of the object to export
#   module_id: bundle        # AMD module id
#   global_alias: bundle     # global set when no loader is present
#
# minify:
#   output: target/bundle-min.js
#   command: [npx, --yes, terser, --compress, --mangle]
"#
}
