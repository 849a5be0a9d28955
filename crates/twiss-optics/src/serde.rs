use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use twiss_core::errors::TwissError;

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => {
            let canonical_values = values.into_iter().map(canonicalize).collect();
            Value::Array(canonical_values)
        }
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, TwissError> {
    let value = serde_json::to_value(value)
        .map_err(|err| TwissError::serde("json_serialize", err.to_string()))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical)
        .map_err(|err| TwissError::serde("json_write", err.to_string()))?;
    Ok(bytes)
}

/// Serializes a value into indented JSON for human consumption.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, TwissError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| TwissError::serde("json_serialize", err.to_string()))
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, TwissError> {
    serde_json::from_slice(data)
        .map_err(|err| TwissError::serde("json_deserialize", err.to_string()))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, TwissError> {
    serde_yaml::to_string(value)
        .map_err(|err| TwissError::serde("yaml_serialize", err.to_string()))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, TwissError> {
    serde_yaml::from_slice(data)
        .map_err(|err| TwissError::serde("yaml_deserialize", err.to_string()))
}

/// Field adapter writing non-finite floats as `null` and reading `null` back as NaN.
pub mod non_finite {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes finite values as numbers and everything else as `null`.
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    /// Reads a number, mapping `null` to NaN.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
