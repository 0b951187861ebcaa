use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SchemaVariant;
use crate::error::ReviewError;
use crate::llm::{extract_json_object, StructuredPrompt, TextModel};
use crate::types::{CodeIssue, ReviewRequest, Severity};

/// Wire contract for the plain-correctness review variant.
#[derive(Deserialize, JsonSchema)]
struct CorrectnessResponse {
    issues: Vec<CorrectnessIssue>,
}

#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CorrectnessIssue {
    /// Severity of the issue (high, medium, or low)
    severity: String,
    /// File where the issue was found
    file: String,
    /// 1-based line number, if applicable
    #[serde(default)]
    line: Option<u32>,
    /// Description of the issue
    issue: String,
    /// Suggested fix
    fix: String,
}

/// Wire contract for the security-hardened review variant: mandatory line
/// numbers and security flags.
#[derive(Deserialize, JsonSchema)]
struct SecurityResponse {
    issues: Vec<SecurityIssue>,
}

#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SecurityIssue {
    /// Severity of the issue (high, medium, or low)
    severity: String,
    /// Whether this issue is a security vulnerability
    is_security_issue: bool,
    /// File where the issue was found
    file: String,
    /// 1-based line number of the issue
    line: u32,
    /// Description of the issue
    issue: String,
    /// Suggested fix, with inline comments explaining the change
    fix: String,
}

/// Request one review of `(diff, file_name)` from the model and parse the
/// response against the variant's output schema.
///
/// The model is an untrusted producer: the issue list is checked field by
/// field, unrecognized severities are kept but logged, and out-of-bounds line
/// numbers are dropped. An empty issue list is success, not an error.
pub async fn review(
    model: &dyn TextModel,
    request: &ReviewRequest,
    variant: SchemaVariant,
) -> Result<Vec<CodeIssue>, ReviewError> {
    let prompt = review_prompt(&request.code, &request.file_name, variant);
    let content = model.generate(&prompt).await?;
    let line_count = request.code.lines().count() as u32;
    let issues = parse_issues(&content, variant, line_count)?;
    debug!(
        "Review of '{}' returned {} issues",
        request.file_name,
        issues.len()
    );
    Ok(issues)
}

fn review_prompt(diff: &str, file_name: &str, variant: SchemaVariant) -> StructuredPrompt {
    let security_mandates = match variant {
        SchemaVariant::Correctness => "",
        SchemaVariant::Security => {
            "Mark whether each issue is a security vulnerability with `isSecurityIssue`. \
             Every issue must carry the exact 1-based line number it applies to. \
             Every fix must contain inline comments explaining the change.\n"
        }
    };

    let user = format!(
        "Review this code for correctness, security, and complexity. \
         Output a JSON object with an `issues` array of findings and suggested fixes.\n\n\
         The code is provided as a diff:\n\
         ```\n{}\n```\n\n\
         Each issue should include: severity (high, medium, or low), file, line, \
         issue, and fix. The file name is {}.\n{}\
         If the code has no issues, return an empty `issues` array.",
        diff, file_name, security_mandates
    );

    let (name, schema_name, output_schema) = match variant {
        SchemaVariant::Correctness => (
            "review",
            "code_review",
            schema_value::<CorrectnessResponse>(),
        ),
        SchemaVariant::Security => (
            "review-security",
            "code_review",
            schema_value::<SecurityResponse>(),
        ),
    };

    StructuredPrompt {
        name,
        system: "You are a code review expert. Respond only with JSON conforming to the \
                 required schema."
            .to_string(),
        user,
        schema_name,
        output_schema,
    }
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
}

fn parse_issues(
    content: &str,
    variant: SchemaVariant,
    line_count: u32,
) -> Result<Vec<CodeIssue>, ReviewError> {
    let json_text = extract_json_object(content)?;

    let raw: Vec<CodeIssue> = match variant {
        SchemaVariant::Correctness => {
            let response: CorrectnessResponse = serde_json::from_str(json_text)
                .map_err(|e| ReviewError::SchemaViolation(e.to_string()))?;
            response
                .issues
                .into_iter()
                .map(|i| CodeIssue {
                    severity: Severity::from(i.severity),
                    is_security_issue: None,
                    file: i.file,
                    line: i.line,
                    issue: i.issue,
                    fix: i.fix,
                    original_code: None,
                })
                .collect()
        }
        SchemaVariant::Security => {
            let response: SecurityResponse = serde_json::from_str(json_text)
                .map_err(|e| ReviewError::SchemaViolation(e.to_string()))?;
            response
                .issues
                .into_iter()
                .map(|i| CodeIssue {
                    severity: Severity::from(i.severity),
                    is_security_issue: Some(i.is_security_issue),
                    file: i.file,
                    line: Some(i.line),
                    issue: i.issue,
                    fix: i.fix,
                    original_code: None,
                })
                .collect()
        }
    };

    raw.into_iter()
        .map(|issue| check_issue(issue, line_count))
        .collect()
}

/// Field-level checks on one parsed issue. Empty text fields are schema
/// violations; severity and line are tolerated but sanitized.
fn check_issue(mut issue: CodeIssue, line_count: u32) -> Result<CodeIssue, ReviewError> {
    if issue.issue.trim().is_empty() || issue.fix.trim().is_empty() || issue.file.trim().is_empty()
    {
        return Err(ReviewError::SchemaViolation(
            "issue with empty file, description, or fix".to_string(),
        ));
    }

    if let Severity::Unknown(value) = &issue.severity {
        warn!("Unrecognized severity '{}' in issue for {}", value, issue.file);
    }

    // Line numbers are claimed by the model, not verified against the input
    if let Some(line) = issue.line {
        if line == 0 || line > line_count {
            warn!(
                "Dropping out-of-bounds line {} for {} (input has {} lines)",
                line, issue.file, line_count
            );
            issue.line = None;
        }
    }

    Ok(issue)
}
