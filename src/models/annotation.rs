use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Annotation source as configured in the dashboard editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSpec {
    #[serde(default)]
    pub name: String,
    /// Index searched for annotation events
    pub index: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_field: Option<String>,
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

// Empty strings count as unset, the editor leaves blank inputs as "".
impl AnnotationSpec {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Default::default()
        }
    }

    pub fn time_field(&self) -> &str {
        or_default(&self.time_field, "@timestamp")
    }

    pub fn query(&self) -> &str {
        or_default(&self.query, "*")
    }

    pub fn tags_field(&self) -> &str {
        or_default(&self.tags_field, "tags")
    }

    pub fn title_field(&self) -> &str {
        or_default(&self.title_field, "desc")
    }

    pub fn text_field(&self) -> Option<&str> {
        self.text_field.as_deref().filter(|field| !field.is_empty())
    }
}

/// Dashboard time range, forwarded to the backend untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Value,
    pub to: Value,
}

impl TimeRange {
    pub fn new(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// One timeline annotation extracted from a backend hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationEvent {
    pub annotation: Arc<AnnotationSpec>,
    /// Epoch milliseconds (UTC)
    pub time: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
