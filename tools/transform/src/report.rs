//! `--json` output shape: a small typed report rather than hand-rolled
//! string concatenation, mirroring the teacher's own reach for `serde_json`
//! wherever a machine-readable surface is needed.

use phi_core::Object;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub results: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chains: Option<Vec<Vec<String>>>,
}

impl TransformReport {
    pub fn from_result(result: &Object) -> Self {
        TransformReport { results: vec![result.to_string()], chains: None }
    }

    pub fn from_chains(paths: &[Vec<Object>]) -> Self {
        let chains: Vec<Vec<String>> =
            paths.iter().map(|path| path.iter().map(|t| t.to_string()).collect()).collect();
        let results = chains.iter().filter_map(|c| c.last().cloned()).collect();
        TransformReport { results, chains: Some(chains) }
    }

    pub fn to_text(&self) -> String {
        match &self.chains {
            Some(chains) => chains
                .iter()
                .enumerate()
                .map(|(i, steps)| format!("chain {i}:\n  {}", steps.join("\n  -> ")))
                .collect::<Vec<_>>()
                .join("\n"),
            None => self.results.join("\n"),
        }
    }
}
