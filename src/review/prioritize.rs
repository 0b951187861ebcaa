use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReviewError;
use crate::llm::{extract_json_object, StructuredPrompt, TextModel};
use crate::types::{CodeIssue, Severity};

/// Order issues by severity rank in place: high, then medium, then low, with
/// unknown severities last. The sort is stable, so relative order within one
/// severity is preserved.
pub fn sort_by_severity(issues: &mut [CodeIssue]) {
    issues.sort_by_key(|issue| issue.severity.rank());
}

/// Wire contract for the prioritization call: the same issues, permuted only.
#[derive(Serialize, Deserialize, JsonSchema)]
struct PrioritizedResponse {
    issues: Vec<PrioritizedIssue>,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct PrioritizedIssue {
    /// Severity of the issue (high, medium, or low)
    severity: String,
    /// Whether this issue is a security vulnerability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_security_issue: Option<bool>,
    /// File where the issue was found
    file: String,
    /// 1-based line number, if applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    /// Description of the issue
    issue: String,
    /// Suggested fix
    fix: String,
    /// The original code the issue was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_code: Option<String>,
}

impl From<CodeIssue> for PrioritizedIssue {
    fn from(issue: CodeIssue) -> Self {
        Self {
            severity: issue.severity.as_str().to_string(),
            is_security_issue: issue.is_security_issue,
            file: issue.file,
            line: issue.line,
            issue: issue.issue,
            fix: issue.fix,
            original_code: issue.original_code,
        }
    }
}

impl From<PrioritizedIssue> for CodeIssue {
    fn from(issue: PrioritizedIssue) -> Self {
        Self {
            severity: Severity::from(issue.severity),
            is_security_issue: issue.is_security_issue,
            file: issue.file,
            line: issue.line,
            issue: issue.issue,
            fix: issue.fix,
            original_code: issue.original_code,
        }
    }
}

/// Ask the model to reorder the issues by severity.
///
/// The returned order is advisory: the response must be the same multiset of
/// issues (no field altered, added, or dropped) or it is rejected as a schema
/// violation, and the accepted list is re-sorted locally so ordering stays
/// deterministic regardless of what the model did.
pub async fn prioritize_with_model(
    model: &dyn TextModel,
    issues: Vec<CodeIssue>,
) -> Result<Vec<CodeIssue>, ReviewError> {
    let wire: Vec<PrioritizedIssue> = issues.iter().cloned().map(Into::into).collect();
    let issues_json = serde_json::to_string_pretty(&PrioritizedResponse { issues: wire })
        .map_err(|e| ReviewError::SchemaViolation(e.to_string()))?;

    let prompt = StructuredPrompt {
        name: "prioritize",
        system: "You are a code review prioritization expert. Respond only with JSON \
                 conforming to the required schema."
            .to_string(),
        user: format!(
            "Given a list of code review issues, prioritize them based on severity, with \
             high severity issues first, followed by medium severity, and then low severity \
             issues. Respond with a JSON object containing the same issues, unaltered, in \
             the prioritized order.\n\nIssues:\n{}",
            issues_json
        ),
        schema_name: "prioritized_issues",
        output_schema: serde_json::to_value(schemars::schema_for!(PrioritizedResponse))
            .unwrap_or_default(),
    };

    let content = model.generate(&prompt).await?;
    let response: PrioritizedResponse = serde_json::from_str(extract_json_object(&content)?)
        .map_err(|e| ReviewError::SchemaViolation(e.to_string()))?;
    let mut reordered: Vec<CodeIssue> = response.issues.into_iter().map(Into::into).collect();

    if !is_permutation(&issues, &reordered) {
        return Err(ReviewError::SchemaViolation(
            "prioritizer altered the issue list".to_string(),
        ));
    }

    debug!("Model reordered {} issues", reordered.len());
    sort_by_severity(&mut reordered);
    Ok(reordered)
}

/// Same multiset of issues, any order.
fn is_permutation(before: &[CodeIssue], after: &[CodeIssue]) -> bool {
    if before.len() != after.len() {
        return false;
    }
    let mut remaining: Vec<&CodeIssue> = before.iter().collect();
    for issue in after {
        match remaining.iter().position(|candidate| *candidate == issue) {
            Some(index) => {
                remaining.swap_remove(index);
            }
            None => return false,
        }
    }
    true
}
