/// Prompt templates for roadmap generation and tutor chat

use serde_json::Value;

/// Interest label used when the learner listed none
pub const DEFAULT_INTERESTS: &str = "General";

/// Builds the roadmap-generation prompt
///
/// The prompt asks for raw JSON shaped like a stored roadmap so the result
/// can be saved without transformation.
pub fn build_roadmap_prompt(role: &str, interests: &[String]) -> String {
    let interests = if interests.is_empty() {
        DEFAULT_INTERESTS.to_string()
    } else {
        interests.join(", ")
    };

    format!(
        r#"Act as an expert educational curriculum designer. Create a detailed learning roadmap for the role: "{role}".
User interests: {interests}.

Return the response STRICTLY as a JSON object with this structure:
{{
  "title": "Roadmap Name",
  "role": "{role}",
  "description": "Brief description",
  "phases": [
    {{
      "title": "Phase Name (e.g., Foundations)",
      "description": "Goal of this phase",
      "modules": [
        {{
          "title": "Module Title",
          "type": "video/article/quiz",
          "contentUrl": "Search query for this topic",
          "textContent": "Short summary of what to learn",
          "estimatedTime": "Time duration"
        }}
      ]
    }}
  ]
}}
Do not include markdown backticks like ```json. Just the raw JSON string."#
    )
}

/// Builds the tutor chat prompt
///
/// `context` is serialized compactly; a missing context renders as `{}`.
pub fn build_chat_prompt(message: &str, context: Option<&Value>) -> String {
    let context = match context {
        Some(Value::Null) | None => "{}".to_string(),
        Some(value) => value.to_string(),
    };
    format!("Context: {context}. User says: {message}")
}
