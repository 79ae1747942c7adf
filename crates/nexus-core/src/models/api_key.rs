use serde::{Deserialize, Serialize};

use super::ResourceId;

/// Placeholder shown for keys created without a label
const NO_LABEL: &str = "-";

/// An API key owned by the signed-in user.
/// The client never edits these; `usage_count` is maintained by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ApiKeyRecord {
    pub id: ResourceId,
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub usage_count: u64,
}

impl ApiKeyRecord {
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => NO_LABEL,
        }
    }
}

/// Response of the create endpoint. Only the generated key is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CreatedKey {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        let mut record: ApiKeyRecord = serde_json::from_str(
            r#"{"id": 1, "key": "nx_abc", "label": "ci", "usage_count": 3}"#,
        )
        .unwrap();
        assert_eq!(record.display_label(), "ci");

        record.label = Some(String::new());
        assert_eq!(record.display_label(), "-");

        record.label = None;
        assert_eq!(record.display_label(), "-");
    }

    #[test]
    fn test_record_requires_key() {
        let parsed = serde_json::from_str::<ApiKeyRecord>(r#"{"id": 1, "label": null}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_created_key_ignores_extra_fields() {
        let created: CreatedKey =
            serde_json::from_str(r#"{"key": "nx_new", "message": "ok"}"#).unwrap();
        assert_eq!(created.key, "nx_new");
        assert!(created.id.is_none());
    }
}
