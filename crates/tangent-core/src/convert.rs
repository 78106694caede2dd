// ── Domain-to-wire conversions ──
//
// Bridges engine values into the JSON shapes `tangent_api` sends. Whole
// numbers go out as JSON integers so the endpoint writes `24`, not `24.0`,
// back into source.

use serde_json::Value;
use tangent_api::SaveRequest;

use crate::model::{EntityId, TangentValue};

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl From<&TangentValue> for Value {
    fn from(value: &TangentValue) -> Self {
        match value {
            TangentValue::Bool(b) => Value::Bool(*b),
            TangentValue::Text(s) => Value::String(s.clone()),
            TangentValue::Number(n) => number_to_json(*n),
        }
    }
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]
fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        // Non-finite numbers have no JSON form.
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Read a scalar JSON value. Arrays, objects, and null have no engine form.
pub fn value_from_json(value: &Value) -> Option<TangentValue> {
    match value {
        Value::Bool(b) => Some(TangentValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(TangentValue::Number),
        Value::String(s) => Some(TangentValue::Text(s.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Build the request that persists one key of one entity.
pub fn save_request(
    file_path: &str,
    entity: &EntityId,
    key: &str,
    value: &TangentValue,
) -> SaveRequest {
    SaveRequest::new(file_path, entity.as_str(), key, Value::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_numbers_serialize_as_integers() {
        assert_eq!(Value::from(&TangentValue::Number(24.0)), json!(24));
        assert_eq!(Value::from(&TangentValue::Number(-3.0)), json!(-3));
        assert_eq!(Value::from(&TangentValue::Number(0.5)), json!(0.5));
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(Value::from(&TangentValue::Number(f64::NAN)), Value::Null);
    }

    #[test]
    fn scalars_map_directly() {
        assert_eq!(Value::from(&TangentValue::Bool(true)), json!(true));
        assert_eq!(Value::from(&TangentValue::from("#fff")), json!("#fff"));
    }

    #[test]
    fn json_scalars_read_back() {
        assert_eq!(value_from_json(&json!(12)), Some(TangentValue::Number(12.0)));
        assert_eq!(value_from_json(&json!("x")), Some(TangentValue::from("x")));
        assert_eq!(value_from_json(&json!({"a": 1})), None);
        assert_eq!(value_from_json(&Value::Null), None);
    }

    #[test]
    fn save_request_carries_all_fields() {
        let req = save_request(
            "src/Hero.tsx",
            &EntityId::from("hero"),
            "padding",
            &TangentValue::Number(24.0),
        );
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"filePath": "src/Hero.tsx", "id": "hero", "key": "padding", "value": 24})
        );
    }
}
