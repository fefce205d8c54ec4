use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("{0} cannot be null")]
    NullRequired(String),

    #[error("Invalid value for {field}: {message}")]
    Serialization { field: String, message: String },
}

/// Field of a partial update body.
///
/// `Absent` leaves the stored value alone, `Null` clears it, `Value` sets
/// it. Fields using this type must be annotated `#[serde(default)]` so a
/// missing key decodes as `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T: Serialize> Patch<T> {
    /// JSON to write, or `None` when the field should be left untouched.
    pub fn to_json(&self, field: &str) -> Result<Option<serde_json::Value>, PatchError> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Ok(Some(serde_json::Value::Null)),
            Patch::Value(value) => serde_json::to_value(value)
                .map(Some)
                .map_err(|e| PatchError::Serialization {
                    field: field.to_string(),
                    message: e.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        title: Patch<String>,
        #[serde(default)]
        image: Patch<String>,
        #[serde(default)]
        amount: Patch<f64>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let body: Body = serde_json::from_value(json!({ "title": "New", "image": null })).unwrap();
        assert_eq!(body.title, Patch::Value("New".to_string()));
        assert_eq!(body.image, Patch::Null);
        assert_eq!(body.amount, Patch::Absent);
    }

    #[test]
    fn renders_json_for_updates() {
        assert_eq!(Patch::<String>::Absent.to_json("t").unwrap(), None);
        assert_eq!(Patch::<String>::Null.to_json("t").unwrap(), Some(json!(null)));
        assert_eq!(Patch::Value(2.5).to_json("t").unwrap(), Some(json!(2.5)));
    }

    #[test]
    fn wrong_types_fail_to_decode() {
        let result: Result<Body, _> = serde_json::from_value(json!({ "amount": "lots" }));
        assert!(result.is_err());
    }
}
