// Built-in field behaviors shipped with the login theme

pub mod number_format;

pub use number_format::*;

use crate::config::FieldsConfig;
use crate::fields::descriptor::FieldDescriptor;

/// Descriptors for every built-in behavior, in registration order
pub fn builtin_descriptors(config: &FieldsConfig) -> Vec<FieldDescriptor> {
    vec![FieldDescriptor::new(NumberFormatBehavior::new(
        &config.markers.attribute_prefix,
    ))]
}
