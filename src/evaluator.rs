use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::llm_gateway::{extract_message_content, ChatMessage, ChatRequest, CompletionClient, ResponseFormat};
use crate::prompts;
use crate::schema::EvaluationReport;

pub fn build_evaluation_request(story_description: &str, analysis_text: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(prompts::EVALUATOR_SYSTEM_PROMPT),
            ChatMessage::user(prompts::evaluation_prompt(story_description, analysis_text)),
        ],
        max_tokens: None,
        response_format: Some(ResponseFormat::json_object()),
    }
}

/// Turns the analysis response into a validated report.
///
/// Fails without calling the model again if `analysis_response` carries no
/// message content. The second response must parse as JSON and satisfy
/// `EVALUATION_SCHEMA`; there is no retry.
pub async fn evaluate_drawing(
    client: &dyn CompletionClient,
    analysis_response: &Value,
    story_description: &str,
) -> AppResult<EvaluationReport> {
    let analysis_text = extract_message_content(analysis_response)?;

    let request = build_evaluation_request(story_description, &analysis_text);
    info!("requesting structured evaluation");
    let response = client.complete(&request).await?;

    let evaluation_text = extract_message_content(&response)?;
    let evaluation: Value = serde_json::from_str(&evaluation_text)?;

    EvaluationReport::from_value(evaluation).map_err(|e| {
        warn!(error = %e, "evaluation rejected");
        e
    })
}
