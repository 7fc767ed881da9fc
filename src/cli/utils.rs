use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print `text` as is, or `data` as pretty JSON
pub fn output_result(output_format: OutputFormat, text: &str, data: Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Text => println!("{}", text),
    }
    Ok(())
}

/// Wrap a serializable payload with a success flag
pub fn success_payload<T: Serialize>(key: &str, payload: &T) -> anyhow::Result<Value> {
    let mut response = json!({ "success": true });
    response[key] = serde_json::to_value(payload)?;
    Ok(response)
}
