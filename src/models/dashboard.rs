use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dashboard document as produced by the front-end; opaque apart from
/// `title`, `tags` and the transient `temp` marker
pub type DashboardDocument = Map<String, Value>;

/// Owner recorded on every stored dashboard
pub const PLACEHOLDER_OWNER: &str = "guest";

/// Body stored under `/<index>/dashboard/<id>` and `/<index>/temp/<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRecord {
    pub user: String,
    pub group: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    /// The whole document, serialized to a JSON string
    pub dashboard: String,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDashboard {
    pub title: String,
    pub url: String,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
}

/// Tag facet term with its document count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagTerm {
    pub term: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub dashboards: Vec<DashboardSummary>,
    pub tags: Vec<TagTerm>,
    #[serde(rename = "tagsOnly")]
    pub tags_only: bool,
}
