//! The AI advisor: budget suggestions and chart recommendations produced by a
//! generative text model.
//!
//! Everything here is written against the [TextModel] capability rather than a
//! concrete vendor, so the flows and endpoints can be exercised with a scripted
//! model in tests. [GeminiModel] is the production implementation.

mod budget;
mod chart;
mod endpoints;
mod gemini;

use async_trait::async_trait;

pub use budget::{BudgetExpenseInput, SuggestBudgetInput, SuggestBudgetOutput, SuggestedBudget, suggest_budget};
pub use chart::{ChartRecommendation, ChartRequest, recommend_chart};
pub use endpoints::{suggest_budget_endpoint, suggest_chart_endpoint};
pub use gemini::GeminiModel;

/// The single failure type for everything that can go wrong while consulting
/// the model.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The model could not be reached, including request timeouts.
    #[error("could not reach the model: {0}")]
    Transport(#[from] reqwest::Error),

    /// The model API answered with a failure status.
    #[error("the model API returned {status}: {message}")]
    Api {
        /// The HTTP status of the failure response.
        status: reqwest::StatusCode,
        /// The response body, as far as it could be read.
        message: String,
    },

    /// The model answered, but not with output the flow could interpret.
    #[error("could not interpret the model output: {0}")]
    Malformed(String),
}

/// The capability the advisor flows need: turn a prompt into text.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Pull a JSON object out of a model completion.
///
/// Models often wrap their answer in prose or a fenced code block even when
/// told not to, so this takes everything between the first `{` and the last
/// `}`.
pub(crate) fn extract_json(completion: &str) -> Result<&str, AiError> {
    let start = completion.find('{');
    let end = completion.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&completion[start..=end]),
        _ => Err(AiError::Malformed(format!(
            "no JSON object in completion {completion:?}"
        ))),
    }
}

#[cfg(test)]
mod extract_json_tests {
    use super::{AiError, extract_json};

    #[test]
    fn takes_object_out_of_fenced_block() {
        let completion = "Here you go:\n```json\n{\"a\": 1}\n```\n";

        assert_eq!(extract_json(completion).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn passes_bare_object_through() {
        assert_eq!(extract_json("{\"a\": 1}").unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn rejects_completion_without_object() {
        let result = extract_json("I cannot help with that.");

        assert!(matches!(result, Err(AiError::Malformed(_))));
    }
}
