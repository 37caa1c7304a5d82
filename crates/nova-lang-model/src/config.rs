use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::equality::Equality;

/// Tie-break direction for closure entries of equal rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClosureOrder {
    /// Lexicographically smaller qualified names come first.
    #[default]
    NameAscending,
    /// Lexicographically larger qualified names come first (the older runtime behaviour).
    NameDescending,
}

/// Settings for one [`crate::Visitors`] session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct VisitorsConfig {
    /// Whether type annotations participate in node equality.
    pub include_annotations: bool,

    pub closure_order: ClosureOrder,

    /// Whether `is_subtype` applies capture conversion to the subtype before comparing.
    ///
    /// `is_subtype_no_capture` never captures regardless of this setting.
    pub capture_in_subtyping: bool,
}

impl Default for VisitorsConfig {
    fn default() -> Self {
        Self {
            include_annotations: false,
            closure_order: ClosureOrder::NameAscending,
            capture_in_subtyping: true,
        }
    }
}

impl VisitorsConfig {
    pub fn equality(&self) -> Equality {
        Equality {
            include_annotations: self.include_annotations,
        }
    }
}

/// JSON schema for [`VisitorsConfig`].
pub fn json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(VisitorsConfig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: VisitorsConfig =
            serde_json::from_str(r#"{ "closure_order": "name_descending" }"#).unwrap();
        assert_eq!(config.closure_order, ClosureOrder::NameDescending);
        assert!(config.capture_in_subtyping);
        assert!(!config.include_annotations);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<VisitorsConfig>(r#"{ "weak_cache": true }"#).unwrap_err();
        assert!(err.to_string().contains("weak_cache"), "{err}");
    }

    #[test]
    fn schema_lists_every_field() {
        let schema = serde_json::to_value(json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["include_annotations", "closure_order", "capture_in_subtyping"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
    }
}
