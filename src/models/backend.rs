//! Response bodies returned by the Elasticsearch REST API

use super::dashboard::TagTerm;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// `GET /<index>/<type>/<id>`
#[derive(Debug, Clone, Deserialize)]
pub struct GetResponse {
    #[serde(rename = "_source")]
    pub source: StoredDashboard,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoredDashboard {
    pub dashboard: String,
}

/// Index, create and delete responses
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    #[serde(rename = "_id")]
    pub id: String,
}

/// `POST /<index>/dashboard/_search`
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSearchResponse {
    pub hits: Option<Hits<DashboardSource>>,
    pub facets: Option<Facets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits<T> {
    #[serde(default = "Vec::new")]
    pub hits: Vec<Hit<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: T,
    /// Explicit field projection, only present when `fields` was requested
    #[serde(default)]
    pub fields: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSource {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "tag_list")]
    pub tags: Vec<String>,
}

/// Stored tags are whatever the front-end saved: keep string entries of a
/// list, wrap a lone string, drop anything else
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        Value::String(tag) => vec![tag],
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Facets {
    pub tags: Option<TermsFacet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermsFacet {
    pub terms: Option<Vec<TagTerm>>,
}

/// Annotation search hits keep their source as free-form JSON
pub type AnnotationHits = Hits<Map<String, Value>>;

/// `POST /<annotationIndex>/_search`
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationSearchResponse {
    pub hits: AnnotationHits,
}
