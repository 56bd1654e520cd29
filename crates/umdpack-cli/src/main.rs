use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::warn;

use umdpack_core::config::{self, BundleConfig, CONFIG_FILE_NAME};
use umdpack_core::{BuildPlan, Pipeline, PipelineMode};
use umdpack_umd::UmdWrapper;

#[derive(Parser)]
#[command(
    name = "umdpack",
    about = "Concatenate JavaScript sources into a universal module bundle",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate, wrap and minify as configured
    Build {
        /// Path to the configuration file
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Only concatenate, even if wrapping is configured
        #[arg(long)]
        simple: bool,
    },

    /// Check the configuration and input files without writing anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Output format for the build plan summary
        #[arg(long, default_value = "yaml")]
        format: SummaryFormat,
    },

    /// Initialize a new umdpack configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum SummaryFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, simple } => cmd_build(&config, simple),

        Commands::Validate { config, format } => cmd_validate(&config, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "umdpack", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config and resolve it against the directory that contains it.
fn load_plan(config_path: &Path) -> Result<BuildPlan> {
    let cfg: BundleConfig = config::load_config(config_path)?.with_context(|| {
        format!(
            "{} not found. Run `umdpack init` to create one.",
            config_path.display()
        )
    })?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
    let plan = cfg
        .plan(base_dir)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    for dup in plan.files.duplicates() {
        warn!("{} is listed more than once", dup.display());
    }
    Ok(plan)
}

fn cmd_build(config_path: &Path, simple: bool) -> Result<()> {
    let mut plan = load_plan(config_path)?;
    if simple {
        plan = plan.into_simple();
    }

    let pipeline = Pipeline::new(plan).with_wrapper(UmdWrapper);
    let mode = match pipeline.plan().mode {
        PipelineMode::Simple => "simple",
        PipelineMode::Full(..) => "full",
    };
    eprintln!(
        "Building {} files ({mode} mode)",
        pipeline.plan().files.len()
    );

    let report = pipeline.run()?;

    for artifact in &report.artifacts {
        eprintln!(
            "  {:<7} wrote {} ({} bytes)",
            artifact.stage,
            artifact.path.display(),
            artifact.bytes
        );
    }
    if let Some(last) = report.final_artifact() {
        eprintln!("Bundle ready: {}", last.path.display());
    }
    Ok(())
}

fn cmd_validate(config_path: &Path, format: SummaryFormat) -> Result<()> {
    let plan = load_plan(config_path)?;

    let missing = plan.files.missing();
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(|p| format!("  {}", p.display())).collect();
        anyhow::bail!("{} input file(s) not found:\n{}", missing.len(), list.join("\n"));
    }

    let summary = build_plan_summary(&plan);
    match format {
        SummaryFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        SummaryFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn build_plan_summary(plan: &BuildPlan) -> serde_json::Value {
    let files: Vec<String> = plan.files.iter().map(|p| p.display().to_string()).collect();
    let outputs: Vec<serde_json::Value> = plan
        .outputs()
        .into_iter()
        .map(|(stage, path)| {
            serde_json::json!({
                "stage": stage.as_str(),
                "path": path.display().to_string(),
            })
        })
        .collect();

    let wrap = match &plan.mode {
        PipelineMode::Simple => serde_json::Value::Null,
        PipelineMode::Full(wrap, minify) => serde_json::json!({
            "source": wrap.source.display().to_string(),
            "export": wrap.export.to_string(),
            "module_id": wrap.module_id,
            "global_alias": wrap.global_alias,
            "minify_source": minify.source.display().to_string(),
            "minify_command": minify.command,
        }),
    };

    serde_json::json!({
        "mode": if wrap.is_null() { "simple" } else { "full" },
        "files": files,
        "outputs": outputs,
        "wrap": wrap,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
