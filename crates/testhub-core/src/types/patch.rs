//! Helpers for partial-update payloads.

/// Deserializes an `Option<Option<T>>` so that a missing field, an explicit
/// `null`, and a value stay distinguishable.
///
/// Use together with `#[serde(default)]`:
///
/// ```ignore
/// #[serde(default, deserialize_with = "double_option::deserialize")]
/// pub parent_id: Option<Option<Uuid>>,
/// ```
///
/// * field absent: `None`
/// * `null`: `Some(None)`
/// * value: `Some(Some(value))`
pub mod double_option {
    use serde::{Deserialize, Deserializer};

    /// Wraps whatever is present in `Some`.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::double_option;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option::deserialize")]
        parent: Option<Option<u32>>,
    }

    #[test]
    fn test_absent_null_and_value_differ() {
        let absent: Patch = serde_json::from_str("{}").expect("absent");
        let null: Patch = serde_json::from_str(r#"{"parent": null}"#).expect("null");
        let value: Patch = serde_json::from_str(r#"{"parent": 7}"#).expect("value");

        assert_eq!(absent.parent, None);
        assert_eq!(null.parent, Some(None));
        assert_eq!(value.parent, Some(Some(7)));
    }
}
