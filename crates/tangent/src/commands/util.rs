//! Shared helpers for command handlers.

use tangent_core::{EntityId, TangentValue, ValueKind};

use crate::cli::ValueKindArg;
use crate::error::CliError;

/// Parse a raw argument, inferring the kind unless one is forced.
pub fn parse_value(raw: &str, kind: Option<ValueKindArg>) -> Result<TangentValue, CliError> {
    let Some(kind) = kind else {
        return match raw.parse::<TangentValue>() {
            Ok(value) => Ok(value),
            Err(never) => match never {},
        };
    };
    let kind = match kind {
        ValueKindArg::Number => ValueKind::Number,
        ValueKindArg::Text => ValueKind::Text,
        ValueKindArg::Bool => ValueKind::Bool,
    };
    TangentValue::parse_as(raw, kind).map_err(|e| CliError::Validation {
        field: "value".into(),
        reason: e.to_string(),
    })
}

/// Error for an entity with nothing in the value store.
pub fn entity_not_found(id: &EntityId) -> CliError {
    CliError::NotFound {
        resource_type: "entity".into(),
        identifier: id.to_string(),
        list_command: "store list".into(),
    }
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
