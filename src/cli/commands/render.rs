use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use crate::cli::utils::{output_result, success_payload};
use crate::cli::OutputFormat;
use crate::config::FieldsConfig;
use crate::fixture::{load_script, run_script, PageFixture};

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[arg(help = "Page fixture (.json, .yaml or .yml)")]
    pub fixture: PathBuf,
    #[arg(long, help = "Script of user actions to replay after install")]
    pub script: Option<PathBuf>,
}

pub fn handle(args: RenderArgs, config: &FieldsConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixture = PageFixture::load(&args.fixture)
        .with_context(|| format!("loading fixture {}", args.fixture.display()))?;
    let mut page = fixture.into_page(config)?;

    if let Some(path) = &args.script {
        let script = load_script(path).with_context(|| format!("loading script {}", path.display()))?;
        tracing::info!("Replaying {} actions from {}", script.len(), path.display());
        run_script(&mut page, &script)?;
    }

    let html = page.to_html()?;
    let snapshot = page.snapshot()?;
    output_result(output_format, &html, success_payload("body", &snapshot)?)
}
