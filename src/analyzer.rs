use serde_json::Value;
use tracing::info;

use crate::error::AppResult;
use crate::llm_gateway::{ChatMessage, ChatRequest, CompletionClient, ContentPart, ImageUrl};
use crate::prompts;

pub const ANALYSIS_MAX_TOKENS: u32 = 1000;

pub fn build_analysis_request(image_data_uri: &str, story_description: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::user_parts(vec![
            ContentPart::Text { text: prompts::analysis_prompt(story_description) },
            ContentPart::ImageUrl { image_url: ImageUrl { url: image_data_uri.to_string() } },
        ])],
        max_tokens: Some(ANALYSIS_MAX_TOKENS),
        response_format: None,
    }
}

/// Asks the vision model how well the drawing matches the story. The raw
/// response body is returned without inspection; a service-side error body
/// is only detected by the evaluation step.
pub async fn analyze_drawing(
    client: &dyn CompletionClient,
    image_data_uri: &str,
    story_description: &str,
) -> AppResult<Value> {
    let request = build_analysis_request(image_data_uri, story_description);
    info!(story_chars = story_description.len(), "requesting drawing analysis");
    client.complete(&request).await
}
