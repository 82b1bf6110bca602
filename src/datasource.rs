use crate::{
    config::{self, DatasourceConfig},
    error::{DatasourceError, TransportError},
    metrics,
    models::{
        backend::{AnnotationSearchResponse, DashboardSearchResponse, DocumentResponse},
        dashboard::PLACEHOLDER_OWNER,
        AnnotationEvent, AnnotationSpec, DashboardDocument, DashboardRecord, SavedDashboard,
        SearchResult, TimeRange,
    },
    normalize, query, slug,
    template::{NoopTemplateSrv, TemplateSrv},
    transport::Transport,
};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// Datasource type name
pub const KIND: &str = "elastic";

/// Partial rendering the annotation editor for this datasource
pub const ANNOTATION_EDITOR_SRC: &str = "app/partials/elasticsearch/annotation_editor.html";

/// Dashboard storage and annotation source backed by Elasticsearch
///
/// Cheap to clone: the HTTP client, configuration and templating
/// collaborator are shared.
#[derive(Clone)]
pub struct ElasticDatasource {
    config: Arc<DatasourceConfig>,
    transport: Transport,
    template_srv: Arc<dyn TemplateSrv>,
    page_url: String,
}

impl ElasticDatasource {
    pub fn new(mut config: DatasourceConfig) -> Result<Self, DatasourceError> {
        config::normalize_config(&mut config);
        config::validate_config(&config).map_err(|e| DatasourceError::Config(e.to_string()))?;

        let config = Arc::new(config);
        let transport = Transport::new(Arc::clone(&config))?;

        Ok(Self {
            config,
            transport,
            template_srv: Arc::new(NoopTemplateSrv),
            page_url: String::new(),
        })
    }

    /// Use `template_srv` to interpolate annotation queries
    pub fn with_template_srv(mut self, template_srv: Arc<dyn TemplateSrv>) -> Self {
        self.template_srv = template_srv;
        self
    }

    /// Location of the page hosting the front-end, used for temp dashboard links
    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = page_url.into();
        self
    }

    pub fn config(&self) -> &DatasourceConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn kind(&self) -> &'static str {
        KIND
    }

    pub fn supports_annotations(&self) -> bool {
        true
    }

    pub fn supports_metrics(&self) -> bool {
        false
    }

    pub fn annotation_editor_src(&self) -> &'static str {
        ANNOTATION_EDITOR_SRC
    }

    /// Timeline annotations from `annotation.index` within `range`
    pub async fn annotation_query(
        &self,
        annotation: &Arc<AnnotationSpec>,
        range: &TimeRange,
    ) -> Result<Vec<AnnotationEvent>, DatasourceError> {
        let query_string = self.template_srv.replace(annotation.query());
        let body = query::annotation_query(annotation, range, &query_string);

        let response = self
            .transport
            .request(Method::POST, "/_search", &annotation.index, Some(&body))
            .await?;

        let response: AnnotationSearchResponse = normalize::decode(response.body)?;
        let events = normalize::annotation_events(annotation, response.hits);

        tracing::debug!(
            index = %annotation.index,
            events = events.len(),
            "Annotation query completed"
        );

        Ok(events)
    }

    /// Load a stored dashboard document
    ///
    /// Backend error responses fall back once to a lookup by slug, for
    /// dashboards saved before ids were slugged.
    pub async fn get_dashboard(&self, id: &str, is_temp: bool) -> Result<Value, DatasourceError> {
        match self.transport.get(&query::dashboard_path(id, is_temp)).await {
            Ok(body) => normalize::stored_dashboard(body),
            Err(TransportError::Connection(e)) => {
                tracing::warn!(id = id, error = %e, "Elasticsearch unreachable");
                Err(DatasourceError::Unreachable)
            }
            Err(e) => {
                tracing::debug!(id = id, error = %e, "Dashboard lookup failed, retrying by slug");
                self.get_dashboard_by_slug(id).await
            }
        }
    }

    /// Load a dashboard by the slug of `id`
    pub async fn get_dashboard_by_slug(&self, id: &str) -> Result<Value, DatasourceError> {
        let path = query::dashboard_path(&slug::slugify_for_url(id), false);

        match self.transport.get(&path).await {
            Ok(body) => normalize::stored_dashboard(body),
            Err(e) => {
                tracing::debug!(id = id, error = %e, "Dashboard not found by slug");
                Err(DatasourceError::NotFound)
            }
        }
    }

    /// Save a dashboard, as a temporary dashboard when it carries a truthy `temp`
    pub async fn save_dashboard(
        &self,
        mut dashboard: DashboardDocument,
    ) -> Result<SavedDashboard, DatasourceError> {
        let title = match dashboard.get("title") {
            Some(Value::String(title)) => title.clone(),
            _ => {
                return Err(DatasourceError::InvalidDashboard(
                    "dashboard has no title".to_string(),
                ))
            }
        };

        // Never persisted, whatever its value
        let temp = dashboard
            .remove("temp")
            .is_some_and(|value| normalize::is_truthy(&value));

        let record = DashboardRecord {
            user: PLACEHOLDER_OWNER.to_string(),
            group: PLACEHOLDER_OWNER.to_string(),
            title: title.clone(),
            tags: dashboard.get("tags").cloned(),
            dashboard: serde_json::to_string(&dashboard)
                .map_err(|e| DatasourceError::InvalidDashboard(e.to_string()))?,
        };

        if temp {
            return self.save_temp_dashboard(record).await;
        }

        let id = slug::dashboard_id(&title);
        let body = serde_json::to_value(&record)
            .map_err(|e| DatasourceError::InvalidDashboard(e.to_string()))?;

        let response = self
            .transport
            .request(
                Method::PUT,
                &query::dashboard_path(&id, false),
                &self.config.index,
                Some(&body),
            )
            .await
            .map_err(|e| DatasourceError::SaveFailed { payload: e.payload() })?;

        if response.status == StatusCode::CREATED {
            self.spawn_legacy_cleanup(title.clone(), id.clone());
        }

        metrics::record_dashboard_save("permanent");
        tracing::info!(id = %id, title = %title, status = %response.status, "Dashboard saved");

        Ok(SavedDashboard {
            title,
            url: format!("/dashboard/db/{}", id),
        })
    }

    /// Save a record under a backend-assigned id that expires after `save_temp_ttl`
    pub async fn save_temp_dashboard(
        &self,
        record: DashboardRecord,
    ) -> Result<SavedDashboard, DatasourceError> {
        let body = serde_json::to_value(&record)
            .map_err(|e| DatasourceError::InvalidDashboard(e.to_string()))?;

        let response = self
            .transport
            .post(&query::temp_save_path(&self.config.save_temp_ttl), &body)
            .await
            .map_err(|e| DatasourceError::TempSaveFailed { payload: e.payload() })?;

        let created: DocumentResponse = normalize::decode(response)?;
        let url = format!("{}#dashboard/temp/{}", self.page_base(), created.id);

        metrics::record_dashboard_save("temp");
        tracing::info!(id = %created.id, title = %record.title, ttl = %self.config.save_temp_ttl, "Temporary dashboard saved");

        Ok(SavedDashboard {
            title: record.title,
            url,
        })
    }

    /// Delete a dashboard, returning the id reported by the backend
    pub async fn delete_dashboard(&self, id: &str) -> Result<String, DatasourceError> {
        let response = self
            .transport
            .request(
                Method::DELETE,
                &query::dashboard_path(id, false),
                &self.config.index,
                None,
            )
            .await?;

        let deleted: DocumentResponse = normalize::decode(response.body)?;
        tracing::info!(id = %deleted.id, "Dashboard deleted");

        Ok(deleted.id)
    }

    /// Full-text dashboard search over titles, or tags with a `tags!:` prefix
    pub async fn search_dashboards(&self, query_string: &str) -> Result<SearchResult, DatasourceError> {
        let search = query::normalize_search_query(query_string);
        let body = query::dashboard_search_query(&search.query, self.config.search_max_results);

        let response = self.transport.post("/dashboard/_search", &body).await?;
        if response.get("hits").is_none() {
            return Ok(SearchResult::default());
        }

        let response: DashboardSearchResponse = normalize::decode(response)?;
        Ok(normalize::search_result(response, search.tags_only))
    }

    fn page_base(&self) -> &str {
        match self.page_url.split_once('#') {
            Some((base, _)) => base,
            None => &self.page_url,
        }
    }

    /// Remove the pre-slug record of a newly created dashboard in the background
    fn spawn_legacy_cleanup(&self, title: String, id: String) {
        // The legacy path would address the record just written
        if title == id {
            return;
        }

        let datasource = self.clone();
        tokio::spawn(async move {
            datasource.remove_unslugified_dashboard(&title).await;
        });
    }

    async fn remove_unslugified_dashboard(&self, title: &str) {
        if self
            .transport
            .get(&query::dashboard_path(title, false))
            .await
            .is_err()
        {
            return;
        }

        match self.delete_dashboard(title).await {
            Ok(id) => tracing::info!(id = %id, "Removed unslugged legacy dashboard"),
            Err(e) => tracing::warn!(title = title, error = %e, "Failed to remove legacy dashboard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasource(page_url: &str) -> ElasticDatasource {
        ElasticDatasource::new(DatasourceConfig::new("http://localhost:9200/", "grafana-dash"))
            .unwrap()
            .with_page_url(page_url)
    }

    #[test]
    fn test_capabilities() {
        let ds = datasource("");
        assert_eq!(ds.kind(), "elastic");
        assert!(ds.supports_annotations());
        assert!(!ds.supports_metrics());
        assert!(ds.annotation_editor_src().ends_with("annotation_editor.html"));
        assert_eq!(ds.config().url, "http://localhost:9200");
    }

    #[test]
    fn test_page_base_strips_fragment() {
        assert_eq!(
            datasource("http://grafana/index.html#/dashboard/db/home").page_base(),
            "http://grafana/index.html"
        );
        assert_eq!(datasource("http://grafana/").page_base(), "http://grafana/");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ElasticDatasource::new(DatasourceConfig::new("", "grafana-dash"));
        assert!(matches!(result, Err(DatasourceError::Config(_))));
    }
}
