//! Reshape backend responses into front-end objects

use crate::error::DatasourceError;
use crate::models::backend::{AnnotationHits, DashboardSearchResponse, GetResponse};
use crate::models::{AnnotationEvent, AnnotationSpec, DashboardSummary, SearchResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Decode a backend body into its typed response
pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T, DatasourceError> {
    serde_json::from_value(body).map_err(|e| DatasourceError::Decode(e.to_string()))
}

/// Epoch milliseconds of a backend time value, interpreted as UTC
///
/// Numbers are taken as epoch milliseconds. Strings may be RFC 3339, carry a
/// `+hhmm` offset, or be a naive date-time or date.
pub fn parse_time(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_time_str(s.trim()),
        _ => None,
    }
}

fn parse_time_str(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.timestamp_millis());
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Effective time of a hit: the explicit field projection when it holds a
/// string or number, the `_source` value otherwise
fn effective_time<'a>(
    time_field: &str,
    source: &'a Map<String, Value>,
    fields: Option<&'a Map<String, Value>>,
) -> Option<&'a Value> {
    match fields.and_then(|f| f.get(time_field)) {
        Some(value @ (Value::String(_) | Value::Number(_))) => Some(value),
        _ => source.get(time_field),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_tags(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::Array(items) => Some(items.iter().map(render).collect::<Vec<_>>().join(", ")),
        other => Some(render(other)),
    }
}

/// Annotation events in backend hit order
///
/// Hits without a usable time value are skipped.
pub fn annotation_events(spec: &Arc<AnnotationSpec>, hits: AnnotationHits) -> Vec<AnnotationEvent> {
    let time_field = spec.time_field();
    let title_field = spec.title_field();
    let tags_field = spec.tags_field();
    let text_field = spec.text_field();

    let mut events = Vec::with_capacity(hits.hits.len());
    for hit in hits.hits {
        let source = &hit.source;

        let time = match effective_time(time_field, source, hit.fields.as_ref()).and_then(parse_time) {
            Some(time) => time,
            None => {
                tracing::warn!(
                    index = %spec.index,
                    id = %hit.id,
                    time_field = time_field,
                    "Skipping annotation hit without a parseable time"
                );
                continue;
            }
        };

        let title = source.get(title_field).map(render).unwrap_or_default();
        let tags = source.get(tags_field).and_then(render_tags);
        let text = text_field
            .and_then(|field| source.get(field))
            .filter(|value| is_truthy(value))
            .map(render);

        events.push(AnnotationEvent {
            annotation: Arc::clone(spec),
            time,
            title,
            tags,
            text,
        });
    }

    events
}

/// Dashboard summaries and tag facet terms of a search response
pub fn search_result(response: DashboardSearchResponse, tags_only: bool) -> SearchResult {
    let Some(hits) = response.hits else {
        return SearchResult::default();
    };

    let tags = response
        .facets
        .and_then(|facets| facets.tags)
        .and_then(|facet| facet.terms)
        .unwrap_or_default();

    let dashboards = hits
        .hits
        .into_iter()
        .map(|hit| DashboardSummary {
            id: hit.id,
            title: hit.source.title,
            tags: hit.source.tags,
        })
        .collect();

    SearchResult {
        dashboards,
        tags,
        tags_only,
    }
}

/// Deserialize the document stored in a record's `dashboard` field
pub fn stored_dashboard(body: Value) -> Result<Value, DatasourceError> {
    let response: GetResponse = decode(body)?;
    serde_json::from_str(&response.source.dashboard).map_err(DatasourceError::MalformedDocument)
}
