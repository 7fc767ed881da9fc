pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::FieldsConfig;

#[derive(Parser)]
#[command(name = "kc-fields")]
#[command(about = "Replay login-theme field behaviors against page fixtures")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Build a page from a fixture, run a script and print the result")]
    Render(commands::render::RenderArgs),

    #[command(about = "Format a value with a number pattern")]
    Format(commands::format::FormatArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub fn run(cli: Cli, config: &FieldsConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Render(args) => commands::render::handle(args, config, output_format),
        Commands::Format(args) => commands::format::handle(args, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_render_with_script() {
        let cli = Cli::parse_from([
            "kc-fields",
            "render",
            "page.yaml",
            "--script",
            "steps.json",
            "--json",
        ]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.fixture.to_str(), Some("page.yaml"));
                assert_eq!(args.script.as_deref().and_then(|p| p.to_str()), Some("steps.json"));
            }
            Commands::Format(_) => panic!("expected render"),
        }
    }

    #[test]
    fn test_parses_format() {
        let cli = Cli::parse_from(["kc-fields", "format", "({3}) {3}-{4}", "5551234567"]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
        assert!(matches!(
            cli.command,
            Commands::Format(args) if args.pattern == "({3}) {3}-{4}" && args.value == "5551234567"
        ));
    }
}
