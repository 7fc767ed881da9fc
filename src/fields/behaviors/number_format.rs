// Reformats numeric inputs according to the pattern in their marker attribute
use crate::dom::{Document, EventKind, NodeId};
use crate::fields::descriptor::{Cleanup, FieldBehavior};
use crate::format::format_number;

pub const KC_NUMBER_FORMAT: &str = "kcNumberFormat";

#[derive(Debug, Clone)]
pub struct NumberFormatBehavior {
    marker: String,
}

impl NumberFormatBehavior {
    pub fn new(marker_prefix: &str) -> Self {
        Self {
            marker: format!("{}{}", marker_prefix, KC_NUMBER_FORMAT),
        }
    }
}

impl FieldBehavior for NumberFormatBehavior {
    fn name(&self) -> &str {
        KC_NUMBER_FORMAT
    }

    fn on_mount(&self, document: &mut Document, element: NodeId) -> Option<Cleanup> {
        format_value(document, element, &self.marker);

        let marker = self.marker.clone();
        let listener = document.add_event_listener(element, EventKind::KeyUp, move |document, event| {
            format_value(document, event.target, &marker);
        });

        match listener {
            Ok(id) => Some(Box::new(move |document: &mut Document| {
                document.remove_event_listener(element, id);
            })),
            Err(error) => {
                tracing::warn!("Could not attach {} to {}: {}", KC_NUMBER_FORMAT, element, error);
                None
            }
        }
    }
}

fn format_value(document: &mut Document, element: NodeId, marker: &str) {
    let Some(pattern) = document.attribute(element, marker) else {
        return;
    };
    let current = document.value(element).unwrap_or_default();
    let formatted = format_number(current, pattern);
    if formatted == current {
        return;
    }

    if let Err(error) = document.set_value(element, &formatted) {
        tracing::warn!("Could not format {}: {}", element, error);
    }
}
