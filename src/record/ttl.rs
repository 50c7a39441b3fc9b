use serde_json::Value;

use crate::record::validation::ValidationError;

/// Coerce a caller supplied `ttl` into whole seconds.
///
/// Integers are taken as is, floats are truncated toward zero and strings
/// must hold a base-10 integer. Anything else is rejected with the JSON type
/// in the message.
pub fn coerce_ttl(raw: &Value) -> Result<u64, ValidationError> {
    match raw {
        Value::Number(number) => {
            if let Some(v) = number.as_u64() {
                Ok(v)
            } else if let Some(v) = number.as_i64() {
                Err(ValidationError::TtlNegative(v.to_string()))
            } else {
                let v = number
                    .as_f64()
                    .ok_or_else(|| ValidationError::TtlNotInteger(number.to_string()))?;
                from_float(v)
            }
        }
        Value::String(s) => {
            let v = s
                .trim()
                .parse::<i64>()
                .map_err(|err| ValidationError::TtlNotInteger(format!("{:?}: {}", s, err)))?;
            u64::try_from(v).map_err(|_| ValidationError::TtlNegative(v.to_string()))
        }
        other => Err(ValidationError::TtlNotScalar(json_type_name(other))),
    }
}

fn from_float(v: f64) -> Result<u64, ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::TtlNotInteger(v.to_string()));
    }
    let truncated = v.trunc();
    if truncated < 0.0 {
        return Err(ValidationError::TtlNegative(v.to_string()));
    }
    if truncated >= u64::MAX as f64 {
        return Err(ValidationError::TtlNotInteger(v.to_string()));
    }
    Ok(truncated as u64)
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
