use clap::Args;
use serde_json::json;

use crate::cli::utils::output_result;
use crate::cli::OutputFormat;
use crate::format::format_number;

#[derive(Debug, Args)]
pub struct FormatArgs {
    #[arg(help = "Pattern such as '#,##0.00' or '({3}) {3}-{4}'")]
    pub pattern: String,
    #[arg(help = "Value to format")]
    pub value: String,
}

pub fn handle(args: FormatArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let formatted = format_number(&args.value, &args.pattern);
    output_result(
        output_format,
        &formatted,
        json!({
            "success": true,
            "pattern": args.pattern,
            "value": args.value,
            "formatted": formatted,
        }),
    )
}
