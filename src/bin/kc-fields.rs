use clap::Parser;
use kc_login_fields::cli::Cli;
use kc_login_fields::config::config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load .env if present so KC_FIELDS_* overrides apply to local runs
    let _ = dotenvy::dotenv();

    let config = config();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.default_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Running kc-fields in {:?} mode", config.environment);

    let cli = Cli::parse();

    if let Err(e) = kc_login_fields::cli::run(cli, config) {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
