//! Interpretation of `conan graph info --format=json` output.

use serde::Deserialize;

use super::{GraphLoadError, GraphOutcome};
use crate::models::PackageReference;

#[derive(Debug, Deserialize)]
struct GraphDocument {
    graph: GraphBody,
}

#[derive(Debug, Deserialize)]
struct GraphBody {
    #[serde(default)]
    error: Option<RawGraphError>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGraphError {
    Structured(StructuredError),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct StructuredError {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    require: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Turns the stdout of a graph command into an outcome.
///
/// `stderr` becomes the text of the [`GraphLoadError`] when stdout holds no
/// graph document.
pub(super) fn parse_graph_output(stdout: &str, stderr: &str) -> Result<GraphOutcome, GraphLoadError> {
    let document: GraphDocument = serde_json::from_str(stdout).map_err(|e| {
        tracing::debug!(target: "conan", "Graph output is not a graph document: {}", e);
        let text = if stderr.trim().is_empty() { stdout } else { stderr };
        GraphLoadError::new(text.trim())
    })?;

    Ok(match document.graph.error {
        None => GraphOutcome::Resolved,
        Some(RawGraphError::Text(message)) => GraphOutcome::Other {
            kind: "error".to_string(),
            reference: None,
            message: Some(message),
        },
        Some(RawGraphError::Structured(error)) => {
            let raw_reference = error.reference.or(error.require);
            let reference = raw_reference.as_deref().and_then(|r| r.parse::<PackageReference>().ok());
            match (error.kind == "missing", reference) {
                (true, Some(reference)) => GraphOutcome::Missing(reference),
                (_, reference) => GraphOutcome::Other {
                    kind: error.kind,
                    reference,
                    message: error.message.or(raw_reference),
                },
            }
        }
    })
}
