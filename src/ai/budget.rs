//! The budget suggestion flow: income and expenses in, a suggested monthly
//! budget out.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::{AiError, TextModel, extract_json};

/// One expense line fed to the budget flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetExpenseInput {
    /// The category of the expense.
    pub category: String,
    /// The amount spent in that category.
    pub amount: f64,
}

/// The financial picture the budget suggestion is based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestBudgetInput {
    /// Total monthly income.
    pub income: f64,
    /// Spending, one line per category.
    pub expenses: Vec<BudgetExpenseInput>,
}

/// The suggested monthly allocation per budget area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedBudget {
    /// Suggested budget for housing.
    pub housing: f64,
    /// Suggested budget for food.
    pub food: f64,
    /// Suggested budget for transportation.
    pub transportation: f64,
    /// Suggested budget for utilities.
    pub utilities: f64,
    /// Suggested amount for savings.
    pub savings: f64,
    /// Suggested amount for debt repayment.
    pub debt_repayment: f64,
    /// Suggested budget for everything else.
    pub other: f64,
}

/// The budget flow result: allocations plus a written summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestBudgetOutput {
    /// The suggested monthly budget.
    pub suggested_budget: SuggestedBudget,
    /// A summary of the suggestions and any relevant advice.
    pub summary: String,
}

fn build_prompt(input: &SuggestBudgetInput) -> String {
    let mut prompt = String::from(
        "You are a personal finance advisor. Based on the user's income and \
         expenses, you will suggest a realistic monthly budget.\n\n",
    );

    let _ = writeln!(prompt, "Income: {}\n", input.income);
    prompt.push_str("Expenses:\n");
    for expense in &input.expenses {
        let _ = writeln!(
            prompt,
            "- Category: {}, Amount: {}",
            expense.category, expense.amount
        );
    }

    prompt.push_str(
        "\nConsider the 50/30/20 rule (50% for needs, 30% for wants, 20% for \
         savings and debt repayment) as a guideline, but adjust based on the \
         provided expenses.\n\n\
         Provide a detailed budget, including amounts for housing, food, \
         transportation, utilities, savings, debt repayment, and other \
         expenses. Also provide a summary of your suggestions and any \
         relevant advice.\n\n\
         Respond with only a JSON object of the shape \
         {\"suggestedBudget\": {\"housing\": number, \"food\": number, \
         \"transportation\": number, \"utilities\": number, \"savings\": \
         number, \"debtRepayment\": number, \"other\": number}, \
         \"summary\": string}.",
    );

    prompt
}

/// Ask `model` for a budget suggestion.
///
/// # Errors
/// Returns an [AiError] when the model cannot be reached, answers with a
/// failure status, or produces output that does not parse as a budget.
pub async fn suggest_budget(
    model: &dyn TextModel,
    input: &SuggestBudgetInput,
) -> Result<SuggestBudgetOutput, AiError> {
    let completion = model.generate(&build_prompt(input)).await?;
    let json = extract_json(&completion)?;

    serde_json::from_str(json).map_err(|error| AiError::Malformed(error.to_string()))
}

#[cfg(test)]
mod suggest_budget_tests {
    use async_trait::async_trait;

    use super::super::{AiError, TextModel};
    use super::{BudgetExpenseInput, SuggestBudgetInput, build_prompt, suggest_budget};

    struct ScriptedModel(&'static str);

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    fn input() -> SuggestBudgetInput {
        SuggestBudgetInput {
            income: 3000.0,
            expenses: vec![BudgetExpenseInput {
                category: "Rent".to_string(),
                amount: 1200.0,
            }],
        }
    }

    #[test]
    fn prompt_includes_income_and_each_expense() {
        let prompt = build_prompt(&input());

        assert!(prompt.contains("Income: 3000"));
        assert!(prompt.contains("- Category: Rent, Amount: 1200"));
        assert!(prompt.contains("50/30/20"));
    }

    #[tokio::test]
    async fn parses_a_fenced_completion() {
        let model = ScriptedModel(
            "```json\n{\"suggestedBudget\": {\"housing\": 1200, \"food\": 400, \
             \"transportation\": 150, \"utilities\": 150, \"savings\": 450, \
             \"debtRepayment\": 150, \"other\": 500}, \
             \"summary\": \"Keep housing under 40% of income.\"}\n```",
        );

        let output = suggest_budget(&model, &input()).await.unwrap();

        assert_eq!(output.suggested_budget.housing, 1200.0);
        assert_eq!(output.suggested_budget.debt_repayment, 150.0);
        assert!(output.summary.contains("housing"));
    }

    #[tokio::test]
    async fn rejects_a_completion_missing_fields() {
        let model = ScriptedModel("{\"summary\": \"no budget here\"}");

        let result = suggest_budget(&model, &input()).await;

        assert!(matches!(result, Err(AiError::Malformed(_))));
    }
}
