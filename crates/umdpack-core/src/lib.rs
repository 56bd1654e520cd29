pub mod concat;
pub mod config;
pub mod error;
pub mod export_path;
pub mod file_list;
pub mod minify;
pub mod pipeline;

pub use config::{BuildPlan, ConcatOptions, MinifyConfig, PipelineMode, WrapConfig};
pub use error::{
    CollaboratorError, ConfigError, PipelineError, ReadError, StageError, WriteError,
};
pub use export_path::ExportPath;
pub use file_list::FileList;
pub use pipeline::{Artifact, BuildReport, Pipeline, Stage};

/// Joins the contents of every file in a list into a single artifact.
pub trait Concatenator {
    fn concatenate(&self, files: &FileList, options: &ConcatOptions) -> Result<Vec<u8>, ReadError>;
}

/// Rewrites a concatenated artifact so it loads under AMD, CommonJS and a
/// plain `<script>` tag.
pub trait ModuleWrapper {
    fn wrap(&self, source: &[u8], config: &WrapConfig) -> Result<Vec<u8>, CollaboratorError>;
}

/// Produces a smaller, semantically equivalent rewrite of an artifact.
pub trait Minifier {
    fn minify(&self, source: &[u8]) -> Result<Vec<u8>, CollaboratorError>;
}
