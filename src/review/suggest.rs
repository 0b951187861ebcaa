use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::ReviewError;
use crate::llm::{extract_json_object, StructuredPrompt, TextModel};

#[derive(Deserialize, JsonSchema)]
struct FixResponse {
    /// Generated fix suggestion for the issue
    fix: String,
}

/// Generate a fix suggestion for one identified issue.
///
/// Standalone flow used when the reviewer's inline fix is not enough: given
/// the code, the issue description, and the file it lives in, one
/// structured-prompt call returns a replacement suggestion.
pub async fn suggest_fix(
    model: &dyn TextModel,
    code: &str,
    issue: &str,
    file: &str,
) -> Result<String, ReviewError> {
    let prompt = StructuredPrompt {
        name: "suggest-fix",
        system: "You are a code review assistant. Respond only with JSON conforming to \
                 the required schema."
            .to_string(),
        user: format!(
            "You are provided with a piece of code, an identified issue in the code, and \
             the file the code exists in. Generate a fix suggestion for the issue.\n\n\
             Code:\n```\n{}\n```\n\nIssue: {}\nFile: {}",
            code, issue, file
        ),
        schema_name: "fix_suggestion",
        output_schema: serde_json::to_value(schemars::schema_for!(FixResponse))
            .unwrap_or_default(),
    };

    let content = model.generate(&prompt).await?;
    let response: FixResponse = serde_json::from_str(extract_json_object(&content)?)
        .map_err(|e| ReviewError::SchemaViolation(e.to_string()))?;
    if response.fix.trim().is_empty() {
        return Err(ReviewError::SchemaViolation(
            "empty fix suggestion".to_string(),
        ));
    }
    Ok(response.fix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;

    #[tokio::test]
    async fn test_suggest_fix_returns_fix() {
        let model =
            ScriptedModel::new(vec![Ok(r#"{"fix": "let y = 1; // renamed"}"#.to_string())]);
        let fix = suggest_fix(&model, "const x=1;const x=1;", "duplicate declaration", "a.ts")
            .await
            .unwrap();
        assert_eq!(fix, "let y = 1; // renamed");
        assert_eq!(model.calls(), vec!["suggest-fix"]);
    }

    #[tokio::test]
    async fn test_suggest_fix_accepts_fenced_response() {
        let model = ScriptedModel::new(vec![Ok(
            "Here you go:\n```json\n{\"fix\": \"let y = 1;\"}\n```".to_string(),
        )]);
        let fix = suggest_fix(&model, "const x=1;const x=1;", "duplicate declaration", "a.ts")
            .await
            .unwrap();
        assert_eq!(fix, "let y = 1;");
    }

    #[tokio::test]
    async fn test_suggest_fix_empty_is_schema_violation() {
        let model = ScriptedModel::new(vec![Ok(r#"{"fix": "  "}"#.to_string())]);
        let err = suggest_fix(&model, "code sample", "issue", "a.ts")
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::SchemaViolation(_)));
    }
}
