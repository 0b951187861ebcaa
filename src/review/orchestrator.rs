use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{PrioritizeMode, ReviewConfig, SchemaVariant};
use crate::error::ReviewError;
use crate::llm::TextModel;
use crate::review::{prioritize, requestor, suggest};
use crate::types::ReviewResult;
use crate::validate::validate;

/// The review pipeline: validate, request review, attach the submitted code,
/// prioritize.
///
/// This is the single state machine in the system. Every state has an edge to
/// a terminal error state, and every failure is caught here and converted to
/// a `ReviewResult` error — nothing propagates to the caller.
pub struct ReviewPipeline {
    model: Arc<dyn TextModel>,
    schema: SchemaVariant,
    prioritize: PrioritizeMode,
}

impl ReviewPipeline {
    pub fn new(model: Arc<dyn TextModel>, review: &ReviewConfig) -> Self {
        Self {
            model,
            schema: review.schema,
            prioritize: review.prioritize,
        }
    }

    /// Run one submission to completion. Never fails: every error path yields
    /// a result with a single human-readable message.
    pub async fn submit(&self, file_name: &str, code: &str) -> ReviewResult {
        match self.run(file_name, code).await {
            Ok(result) => result,
            Err(e) => {
                error!("Review of '{}' failed: {}", file_name, e);
                ReviewResult::error(e.user_message())
            }
        }
    }

    async fn run(&self, file_name: &str, code: &str) -> Result<ReviewResult, ReviewError> {
        let request = validate(file_name, code)?;
        debug!("Validated submission for '{}'", request.file_name);

        let mut issues = requestor::review(self.model.as_ref(), &request, self.schema).await?;

        // Zero issues is a valid terminal state; the prioritizer is skipped
        if issues.is_empty() {
            info!("Review of '{}' found no issues", request.file_name);
            return Ok(ReviewResult::Issues {
                issues: vec![],
                original_code: request.code,
            });
        }

        for issue in &mut issues {
            issue.original_code = Some(request.code.clone());
        }

        let issues = match self.prioritize {
            PrioritizeMode::Local => {
                let mut issues = issues;
                prioritize::sort_by_severity(&mut issues);
                issues
            }
            PrioritizeMode::Model => {
                match prioritize::prioritize_with_model(self.model.as_ref(), issues.clone()).await
                {
                    Ok(reordered) => reordered,
                    Err(e) => {
                        // A failed reorder does not lose a completed review
                        warn!("Prioritization failed, falling back to local sort: {}", e);
                        let mut issues = issues;
                        prioritize::sort_by_severity(&mut issues);
                        issues
                    }
                }
            }
        };

        info!(
            "Review of '{}' complete: {} issues",
            request.file_name,
            issues.len()
        );
        Ok(ReviewResult::Issues {
            issues,
            original_code: request.code,
        })
    }

    /// Generate a standalone fix suggestion for one issue.
    pub async fn suggest_fix(
        &self,
        code: &str,
        issue: &str,
        file: &str,
    ) -> Result<String, ReviewError> {
        suggest::suggest_fix(self.model.as_ref(), code, issue, file).await
    }
}
