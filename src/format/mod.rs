// Value formatting for declaratively configured fields

pub mod pattern;

pub use pattern::*;

/// Reformat `value` according to `pattern`.
///
/// Patterns that cannot be parsed leave the value untouched; display
/// formatting is best-effort.
pub fn format_number(value: &str, pattern: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    match NumberPattern::parse(pattern) {
        Some(parsed) => parsed.apply(value),
        None => {
            tracing::debug!("Unrecognized number format '{}', leaving value as is", pattern);
            value.to_string()
        }
    }
}
