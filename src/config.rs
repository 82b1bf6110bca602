use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection and storage settings for one Elasticsearch datasource
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasourceConfig {
    /// Display name of the datasource
    #[serde(default)]
    pub name: String,
    /// Backend base URL, e.g. `http://localhost:9200`
    pub url: String,
    /// Index holding dashboards and temporary dashboards
    pub index: String,
    /// Pre-encoded credential sent as `Authorization: Basic <credential>`
    #[serde(default)]
    pub basic_auth: Option<String>,
    /// Dashboards are stored in this datasource
    #[serde(default)]
    pub grafana_db: bool,
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,
    #[serde(default = "default_save_temp")]
    pub save_temp: bool,
    #[serde(default = "default_save_temp_ttl")]
    pub save_temp_ttl: String,
    /// Optional per-request timeout handed to the HTTP client
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_search_max_results() -> usize {
    20
}

fn default_save_temp() -> bool {
    true
}

fn default_save_temp_ttl() -> String {
    "30d".to_string()
}

impl DatasourceConfig {
    pub fn new(url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            url: url.into(),
            index: index.into(),
            basic_auth: None,
            grafana_db: false,
            search_max_results: default_search_max_results(),
            save_temp: default_save_temp(),
            save_temp_ttl: default_save_temp_ttl(),
            timeout_seconds: None,
        }
    }

    /// Set the basic-auth credential from a user name and password
    pub fn with_basic_auth(mut self, user: &str, password: &str) -> Self {
        self.basic_auth = Some(basic_auth_credential(user, password));
        self
    }
}

/// Base64 `user:password` credential as used by the `Authorization: Basic` header
pub fn basic_auth_credential(user: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", user, password))
}

/// Load a datasource configuration file (TOML, JSON or YAML by extension)
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<DatasourceConfig> {
    let config = ::config::Config::builder()
        .add_source(::config::File::from(path.as_ref()))
        .build()?;

    let mut cfg: DatasourceConfig = config.try_deserialize()?;
    normalize_config(&mut cfg);
    validate_config(&cfg)?;

    Ok(cfg)
}

pub(crate) fn normalize_config(cfg: &mut DatasourceConfig) {
    while cfg.url.ends_with('/') {
        cfg.url.pop();
    }
}

pub(crate) fn validate_config(cfg: &DatasourceConfig) -> anyhow::Result<()> {
    if cfg.url.is_empty() {
        anyhow::bail!("Datasource url cannot be empty");
    }

    if cfg.index.is_empty() {
        anyhow::bail!("Datasource index cannot be empty");
    }

    if cfg.search_max_results == 0 {
        anyhow::bail!("search_max_results must be greater than zero");
    }

    if cfg.save_temp_ttl.is_empty() {
        anyhow::bail!("save_temp_ttl cannot be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let cfg: DatasourceConfig = serde_json::from_value(serde_json::json!({
            "url": "http://localhost:9200",
            "index": "grafana-dash"
        }))
        .unwrap();

        assert_eq!(cfg.search_max_results, 20);
        assert!(cfg.save_temp);
        assert_eq!(cfg.save_temp_ttl, "30d");
        assert!(cfg.basic_auth.is_none());
        assert!(!cfg.grafana_db);
    }

    #[test]
    fn test_validate_config_requires_index() {
        let cfg = DatasourceConfig::new("http://localhost:9200", "");

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("index cannot be empty"));
    }

    #[test]
    fn test_validate_config_rejects_zero_max_results() {
        let mut cfg = DatasourceConfig::new("http://localhost:9200", "grafana-dash");
        cfg.search_max_results = 0;

        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_basic_auth_credential() {
        assert_eq!(basic_auth_credential("admin", "secret"), "YWRtaW46c2VjcmV0");

        let cfg = DatasourceConfig::new("http://es", "idx").with_basic_auth("admin", "secret");
        assert_eq!(cfg.basic_auth.as_deref(), Some("YWRtaW46c2VjcmV0"));
    }

    #[test]
    fn test_load_config_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
name = "elastic"
url = "http://localhost:9200/"
index = "grafana-dash"
grafana_db = true
save_temp_ttl = "7d"
"#
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.name, "elastic");
        assert_eq!(cfg.url, "http://localhost:9200");
        assert!(cfg.grafana_db);
        assert_eq!(cfg.save_temp_ttl, "7d");
        assert_eq!(cfg.search_max_results, 20);
    }
}
