use serde::{Deserialize, Deserializer};

/// Deserialize `Option<Option<T>>` so a patch can tell a missing field from an explicit null.
///
/// - missing field => `None` (needs `#[serde(default)]` on the field)
/// - `null` => `Some(None)`
/// - value => `Some(Some(value))`
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::double_option")]
        owner: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        let missing: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.owner, None);

        let null: Probe = serde_json::from_str(r#"{"owner":null}"#).unwrap();
        assert_eq!(null.owner, Some(None));

        let value: Probe = serde_json::from_str(r#"{"owner":"ops"}"#).unwrap();
        assert_eq!(value.owner, Some(Some("ops".to_string())));
    }
}
