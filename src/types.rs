use serde::{Deserialize, Serialize};

/// Triage rank over issues, used to order presentation.
///
/// The model documents severity as a closed high/medium/low set but emits an
/// open string; unrecognized values are preserved as `Unknown` instead of
/// being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
    Unknown(String),
}

impl Severity {
    /// Sort key: high before medium before low, unknown last.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
            Severity::Unknown(_) => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unknown(s) => s,
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown(s),
        }
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

/// One finding produced by the review service.
///
/// `original_code` is the full submitted text, attached by the orchestrator;
/// the model never produces it. Field names are camelCase on the wire because
/// the front-end consumes them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeIssue {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_security_issue: Option<bool>,
    pub file: String,
    /// 1-based line number; untrusted, dropped when out of bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub issue: String,
    pub fix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_code: Option<String>,
}

/// A validated submission. Ephemeral: lives for one pipeline run.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub file_name: String,
    pub code: String,
}

/// Terminal outcome of one submission: issues or a single user-facing error,
/// never both.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReviewResult {
    Issues {
        issues: Vec<CodeIssue>,
        #[serde(rename = "originalCode")]
        original_code: String,
    },
    Error {
        error: String,
    },
}

impl ReviewResult {
    pub fn error(message: impl Into<String>) -> Self {
        ReviewResult::Error {
            error: message.into(),
        }
    }

    pub fn issues(&self) -> Option<&[CodeIssue]> {
        match self {
            ReviewResult::Issues { issues, .. } => Some(issues),
            ReviewResult::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_roundtrip() {
        let sev: Severity = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(sev, Severity::High);
        assert_eq!(serde_json::to_string(&sev).unwrap(), "\"high\"");
    }

    #[test]
    fn test_severity_unknown_preserved() {
        let sev: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(sev, Severity::Unknown("critical".into()));
        assert_eq!(serde_json::to_string(&sev).unwrap(), "\"critical\"");
    }

    #[test]
    fn test_severity_case_insensitive() {
        let sev: Severity = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(sev, Severity::High);
    }

    #[test]
    fn test_severity_rank_order() {
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
        assert!(Severity::Low.rank() < Severity::Unknown("weird".into()).rank());
    }

    #[test]
    fn test_issue_camel_case_wire_format() {
        let issue = CodeIssue {
            severity: Severity::High,
            is_security_issue: Some(true),
            file: "a.ts".into(),
            line: Some(3),
            issue: "desc".into(),
            fix: "fix".into(),
            original_code: Some("code".into()),
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["isSecurityIssue"], true);
        assert_eq!(value["originalCode"], "code");
    }

    #[test]
    fn test_result_is_mutually_exclusive_on_wire() {
        let ok = ReviewResult::Issues {
            issues: vec![],
            original_code: "code here".into(),
        };
        let value = serde_json::to_value(&ok).unwrap();
        assert!(value.get("issues").is_some());
        assert!(value.get("error").is_none());

        let err = ReviewResult::error("boom");
        let value = serde_json::to_value(&err).unwrap();
        assert!(value.get("issues").is_none());
        assert_eq!(value["error"], "boom");
    }
}
