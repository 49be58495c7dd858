#![deny(missing_docs)]

//! # Generate Command
//!
//! Renders the demo service's Swagger document as JSON or YAML.

use std::fs;
use std::path::PathBuf;

use swagplus_core::config::{ENV_BASE_PATH, ENV_HOST, ENV_TITLE, ENV_VERSION};
use swagplus_core::SpecConfig;
use tracing::info;

use crate::demo;
use crate::error::CliResult;

/// Output format.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Pretty printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Output format.
    #[clap(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// File to write; stdout when omitted.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Document title (`info.title`).
    #[clap(long, env = ENV_TITLE)]
    pub title: Option<String>,

    /// API version (`info.version`).
    #[clap(long = "api-version", env = ENV_VERSION)]
    pub api_version: Option<String>,

    /// Host serving the API.
    #[clap(long, env = ENV_HOST)]
    pub host: Option<String>,

    /// Prefix of every path, starting with `/`.
    #[clap(long, env = ENV_BASE_PATH)]
    pub base_path: Option<String>,
}

impl GenerateArgs {
    /// Document settings: defaults overridden by flags (or their variables).
    pub fn config(&self) -> CliResult<SpecConfig> {
        let mut config = SpecConfig::default();
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if let Some(version) = &self.api_version {
            config.version = version.clone();
        }
        config.host = self.host.clone().or(config.host);
        config.base_path = self.base_path.clone().or(config.base_path);
        config.validate()?;
        Ok(config)
    }
}

/// Renders the document in the requested format.
pub fn render(args: &GenerateArgs) -> CliResult<String> {
    let service = demo::service(args.config()?)?;
    let document = service.specification();
    info!(
        operations = document.operation_count(),
        definitions = document.definitions.len(),
        "Rendering document"
    );
    let text = match args.format {
        Format::Json => document.to_json_pretty()?,
        Format::Yaml => document.to_yaml()?,
    };
    Ok(text)
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let text = render(args)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text)?;
            println!("Generated Swagger document at {:?}", path);
        }
        None => println!("{}", text),
    }
    Ok(())
}
