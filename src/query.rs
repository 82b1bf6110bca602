//! Query documents for the Elasticsearch filtered-query / facets dialect

use crate::models::{AnnotationSpec, TimeRange};
use serde_json::{json, Map, Value};

/// Hits requested per annotation query
pub const ANNOTATION_RESULT_SIZE: usize = 100;

/// Distinct tag terms requested in the search facet
pub const TAG_FACET_SIZE: usize = 50;

/// Prefix restricting a dashboard search to tags
pub const TAGS_ONLY_PREFIX: &str = "tags!:";

/// Annotation search: time range filter plus interpolated free-text query
///
/// `query` must already be interpolated by the templating collaborator.
pub fn annotation_query(spec: &AnnotationSpec, range: &TimeRange, query: &str) -> Value {
    let time_field = spec.time_field();

    let mut range_clause = Map::new();
    range_clause.insert(
        time_field.to_string(),
        json!({ "from": range.from, "to": range.to }),
    );

    json!({
        "fields": [time_field, "_source"],
        "query": {
            "filtered": {
                "query": {
                    "bool": {
                        "should": [{ "query_string": { "query": query } }]
                    }
                },
                "filter": {
                    "bool": {
                        "must": [{ "range": range_clause }]
                    }
                }
            }
        },
        "size": ANNOTATION_RESULT_SIZE
    })
}

/// Normalized dashboard search string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub tags_only: bool,
}

/// Canonicalize a user search string into a `query_string` query
///
/// Only the first lowercase `" and "` is promoted to `AND`.
pub fn normalize_search_query(raw: &str) -> SearchQuery {
    let mut query = raw.to_lowercase().replacen(" and ", " AND ", 1);

    if let Some(tags) = query.strip_prefix(TAGS_ONLY_PREFIX) {
        return SearchQuery {
            query: format!("tags:{}*", tags),
            tags_only: true,
        };
    }

    if query.is_empty() {
        query.push_str("title:");
    }
    if !query.ends_with('*') {
        query.push('*');
    }

    SearchQuery {
        query,
        tags_only: false,
    }
}

/// Dashboard search body with a lexically ordered tag facet
pub fn dashboard_search_query(query: &str, max_results: usize) -> Value {
    json!({
        "query": { "query_string": { "query": query } },
        "facets": {
            "tags": {
                "terms": { "field": "tags", "order": "term", "size": TAG_FACET_SIZE }
            }
        },
        "size": max_results,
        "sort": ["_uid"]
    })
}

/// Path of a stored dashboard, permanent or temporary
pub fn dashboard_path(id: &str, is_temp: bool) -> String {
    if is_temp {
        format!("/temp/{}", id)
    } else {
        format!("/dashboard/{}", id)
    }
}

pub fn temp_save_path(ttl: &str) -> String {
    format!("/temp/?ttl={}", ttl)
}
