use std::collections::BTreeMap;
use std::time::Duration;

/// Label name for the normalized route path.
pub const PATH_LABEL: &str = "path";

/// Label name for the normalized HTTP method.
pub const METHOD_LABEL: &str = "method";

/// Label name for the normalized response status code.
pub const STATUS_CODE_LABEL: &str = "status_code";

/// The labels that every request sample carries, in declaration order.
pub const DEFAULT_LABELS: [&str; 3] = [PATH_LABEL, METHOD_LABEL, STATUS_CODE_LABEL];

/// Label values attached to a single request sample.
///
/// Always holds `path`, `method` and `status_code`. Custom values merged on
/// top may override any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLabels {
    values: BTreeMap<String, String>,
}

impl RequestLabels {
    // ---
    pub fn new(
        path: impl Into<String>,
        method: impl Into<String>,
        status_code: impl Into<String>,
    ) -> Self {
        // ---
        let mut values = BTreeMap::new();
        values.insert(PATH_LABEL.to_string(), path.into());
        values.insert(METHOD_LABEL.to_string(), method.into());
        values.insert(STATUS_CODE_LABEL.to_string(), status_code.into());
        Self { values }
    }

    /// Merges `extra` over the current values; later values win.
    pub fn merge<I, K, V>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        // ---
        for (key, value) in extra {
            self.values.insert(key.into(), value.into());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn path(&self) -> &str {
        self.get(PATH_LABEL).unwrap_or_default()
    }

    pub fn method(&self) -> &str {
        self.get(METHOD_LABEL).unwrap_or_default()
    }

    pub fn status_code(&self) -> &str {
        self.get(STATUS_CODE_LABEL).unwrap_or_default()
    }

    /// Values for `names` in the given order; missing labels become `""`.
    pub fn values_for<'a>(&'a self, names: &[String]) -> Vec<&'a str> {
        // ---
        names
            .iter()
            .map(|name| self.get(name).unwrap_or_default())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One observation handed to a metrics backend.
#[derive(Debug, Clone)]
pub struct RequestSample {
    pub labels: RequestLabels,
    pub duration: Duration,
    pub request_content_length: Option<u64>,
    pub response_content_length: Option<u64>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn new_sets_default_labels() {
        // ---
        let labels = RequestLabels::new("/users/{id}", "GET", "200");

        assert_eq!(labels.path(), "/users/{id}");
        assert_eq!(labels.method(), "GET");
        assert_eq!(labels.status_code(), "200");
    }

    #[test]
    fn merge_overrides_existing_values() {
        // ---
        let mut labels = RequestLabels::new("/", "GET", "200");
        labels.merge([("status_code", "2xx"), ("tenant", "acme")]);

        assert_eq!(labels.status_code(), "2xx");
        assert_eq!(labels.get("tenant"), Some("acme"));
    }

    #[test]
    fn values_for_fills_missing_with_empty() {
        // ---
        let labels = RequestLabels::new("/", "POST", "201");
        let names = vec![
            "path".to_string(),
            "method".to_string(),
            "status_code".to_string(),
            "tenant".to_string(),
        ];

        assert_eq!(labels.values_for(&names), vec!["/", "POST", "201", ""]);
    }
}
