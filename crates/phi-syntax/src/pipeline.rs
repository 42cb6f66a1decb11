//! Pipeline/report configuration (YAML): the batch-driving surface consumed
//! by external tooling, never by the core engine. See spec §6.3.

use serde::Deserialize;

/// Top-level pipeline document: a `report` block and a `test-sets` list.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub report: ReportConfig,
    #[serde(rename = "test-sets")]
    pub test_sets: Vec<TestSetEntry>,
}

/// Where to write the run's report, and the expected metric deltas used to
/// judge pass/fail.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "output-path")]
    pub output_path: String,
    #[serde(default)]
    pub metrics: Vec<MetricExpectation>,
    #[serde(rename = "expected-improved-percentage")]
    pub expected_improved_percentage: Option<f64>,
}

/// One named metric and the change expected across a test-set's before/after
/// `bindings-path` roots.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricExpectation {
    pub name: String,
    #[serde(rename = "expected-change")]
    pub expected_change: Option<f64>,
}

/// One file to run through the `transform` pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct TestSetEntry {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enable: bool,
    pub source: String,
    #[serde(rename = "intermediate-path")]
    pub intermediate_path: Option<String>,
    #[serde(rename = "bindings-path-before")]
    pub bindings_path_before: String,
    #[serde(rename = "bindings-path-after")]
    pub bindings_path_after: String,
    #[serde(rename = "exclude-objects", default)]
    pub exclude_objects: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl TestSetEntry {
    /// Whether `name` is scoped out of this entry's metrics.
    pub fn excludes(&self, name: &str) -> bool {
        self.exclude_objects.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_load_pipeline_config() {
        let yaml = indoc! {r#"
            report:
              output-path: report.json
              metrics:
                - name: node-count
                  expected-change: -10.0
              expected-improved-percentage: 80.0
            test-sets:
              - name: basic
                source: fixtures/basic.eo
                bindings-path-before: a.b
                bindings-path-after: a.b
        "#};
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.report.output_path, "report.json");
        assert_eq!(config.test_sets.len(), 1);
        assert!(config.test_sets[0].enable);
        assert!(!config.test_sets[0].excludes("a.b.c"));
    }

    #[test]
    fn test_disabled_test_set_entry() {
        let yaml = indoc! {r#"
            report:
              output-path: report.json
            test-sets:
              - name: skip-me
                enable: false
                source: fixtures/skip.eo
                bindings-path-before: a
                bindings-path-after: a
                exclude-objects: [helper]
        "#};
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.test_sets[0].enable);
        assert!(config.test_sets[0].excludes("helper"));
    }
}
