//! The chart recommendation flow: financial data in, the most suitable chart
//! type out.

use serde::{Deserialize, Serialize};

use super::{AiError, TextModel, extract_json};

/// The data a chart is wanted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    /// The financial data to visualize, in JSON format.
    pub financial_data: String,
}

/// The recommended visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecommendation {
    /// The recommended chart type, e.g. "bar chart".
    pub chart_type: String,
    /// Why that chart suits the data.
    pub reasoning: String,
}

fn build_prompt(request: &ChartRequest) -> String {
    format!(
        "You are an expert in data visualization. Given the following \
         financial data, recommend the best chart type to use and explain \
         your reasoning.\n\n\
         Financial Data: {}\n\n\
         Consider the following chart types: bar chart, pie chart, line \
         chart. If the data contains multiple categories, a bar chart is \
         usually best; a temporal component suggests a line chart; the \
         composition of a whole suggests a pie chart.\n\n\
         Respond with only a JSON object of the shape \
         {{\"chartType\": string, \"reasoning\": string}}.",
        request.financial_data
    )
}

/// Ask `model` which chart fits the given data.
///
/// # Errors
/// Returns an [AiError] when the model cannot be reached, answers with a
/// failure status, or produces output that does not parse as a
/// recommendation.
pub async fn recommend_chart(
    model: &dyn TextModel,
    request: &ChartRequest,
) -> Result<ChartRecommendation, AiError> {
    let completion = model.generate(&build_prompt(request)).await?;
    let json = extract_json(&completion)?;

    serde_json::from_str(json).map_err(|error| AiError::Malformed(error.to_string()))
}

#[cfg(test)]
mod recommend_chart_tests {
    use async_trait::async_trait;

    use super::super::{AiError, TextModel};
    use super::{ChartRequest, build_prompt, recommend_chart};

    struct ScriptedModel(&'static str);

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn prompt_embeds_the_data() {
        let prompt = build_prompt(&ChartRequest {
            financial_data: "{\"Food\": 250}".to_string(),
        });

        assert!(prompt.contains("Financial Data: {\"Food\": 250}"));
    }

    #[tokio::test]
    async fn parses_a_recommendation() {
        let model = ScriptedModel(
            "{\"chartType\": \"pie chart\", \
             \"reasoning\": \"The data represents parts of a whole.\"}",
        );

        let recommendation = recommend_chart(
            &model,
            &ChartRequest {
                financial_data: "{}".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(recommendation.chart_type, "pie chart");
    }

    #[tokio::test]
    async fn rejects_prose_only_output() {
        let model = ScriptedModel("A bar chart would be lovely.");

        let result = recommend_chart(
            &model,
            &ChartRequest {
                financial_data: "{}".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(AiError::Malformed(_))));
    }
}
