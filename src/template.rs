//! Variable interpolation for free-text annotation queries

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Interpolates template variables into a query string before it is sent
pub trait TemplateSrv: Send + Sync {
    fn replace(&self, target: &str) -> String;
}

/// Leaves queries untouched
#[derive(Debug, Clone, Default)]
pub struct NoopTemplateSrv;

impl TemplateSrv for NoopTemplateSrv {
    fn replace(&self, target: &str) -> String {
        target.to_string()
    }
}

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\w+)|\$\{(\w+)\}|\[\[(\w+)\]\]").expect("valid variable pattern")
});

/// Replaces `$name`, `${name}` and `[[name]]` with values from a fixed map.
/// Unknown variables are left as written.
#[derive(Debug, Clone, Default)]
pub struct VariableTemplateSrv {
    variables: HashMap<String, String>,
}

impl VariableTemplateSrv {
    pub fn new(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

impl TemplateSrv for VariableTemplateSrv {
    fn replace(&self, target: &str) -> String {
        VARIABLE
            .replace_all(target, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                match self.variables.get(name) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_passthrough() {
        assert_eq!(NoopTemplateSrv.replace("host:$host"), "host:$host");
    }

    #[test]
    fn test_variable_forms() {
        let srv = VariableTemplateSrv::default()
            .with_variable("host", "web01")
            .with_variable("env", "prod");

        assert_eq!(srv.replace("host:$host"), "host:web01");
        assert_eq!(srv.replace("env:${env} AND host:[[host]]"), "env:prod AND host:web01");
    }

    #[test]
    fn test_unknown_variable_kept() {
        let srv = VariableTemplateSrv::default().with_variable("host", "web01");
        assert_eq!(srv.replace("dc:$datacenter"), "dc:$datacenter");
    }
}
