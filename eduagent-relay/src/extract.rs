/// Roadmap JSON extraction from model output
///
/// Models often wrap JSON in markdown fences even when told not to. All fence
/// markers are removed (not just a leading/trailing pair) and the remainder is
/// parsed as one JSON value. No schema is applied here.

use serde_json::Value;
use tracing::error;

use crate::text::RelayError;

const FENCE_JSON: &str = "```json";
const FENCE: &str = "```";

/// Removes every ```` ```json ```` and ```` ``` ```` marker and trims
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace(FENCE_JSON, "").replace(FENCE, "").trim().to_string()
}

/// Parses model output into a JSON value
///
/// # Errors
///
/// Returns [`RelayError::MalformedRoadmap`] carrying the parse error. The raw
/// text is logged, not returned.
pub fn extract_roadmap_json(raw: &str) -> Result<Value, RelayError> {
    let cleaned = strip_code_fences(raw);

    serde_json::from_str(&cleaned).map_err(|e| {
        error!(error = %e, raw = %raw, "Model returned malformed roadmap JSON");
        RelayError::MalformedRoadmap(e.to_string())
    })
}
