use serde::{Deserialize, Deserializer};

/// Treats missing, null and blank strings alike as `None`.
pub fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_blank_as_none")]
        telefono: Option<String>,
    }

    #[test]
    fn blank_and_missing_are_none() {
        let p: Probe = serde_json::from_str(r#"{"telefono": "   "}"#).unwrap();
        assert!(p.telefono.is_none());
        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert!(p.telefono.is_none());
        let p: Probe = serde_json::from_str(r#"{"telefono": null}"#).unwrap();
        assert!(p.telefono.is_none());
    }

    #[test]
    fn values_are_trimmed() {
        let p: Probe = serde_json::from_str(r#"{"telefono": " 7001 "}"#).unwrap();
        assert_eq!(p.telefono.as_deref(), Some("7001"));
    }
}
