//! Drawing evaluation pipeline: encode → analyze → evaluate.

use std::fmt;
use std::path::Path;

use tracing::{info, info_span, Instrument};

use crate::analyzer;
use crate::error::AppResult;
use crate::evaluator;
use crate::image_encoder;
use crate::llm_gateway::CompletionClient;
use crate::schema::EvaluationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Analyzing,
    Evaluating,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::Evaluating => "evaluating",
            PipelineStage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Evaluates the drawing at `image_path` against `story_description`.
///
/// The analysis and evaluation requests run strictly one after the other.
/// The first failure is returned and nothing partial is produced.
pub async fn evaluate(
    client: &dyn CompletionClient,
    image_path: impl AsRef<Path>,
    story_description: &str,
) -> AppResult<EvaluationReport> {
    let span = info_span!("evaluate", run_id = %uuid::Uuid::new_v4());
    run(client, image_path.as_ref(), story_description)
        .instrument(span)
        .await
}

async fn run(
    client: &dyn CompletionClient,
    image_path: &Path,
    story_description: &str,
) -> AppResult<EvaluationReport> {
    info!(stage = %PipelineStage::Idle, image = %image_path.display());
    let image_b64 = image_encoder::encode_image_base64(image_path)?;
    let data_uri = image_encoder::image_data_uri(image_encoder::mime_for_path(image_path), &image_b64);

    info!(stage = %PipelineStage::Analyzing);
    let analysis = analyzer::analyze_drawing(client, &data_uri, story_description).await?;

    info!(stage = %PipelineStage::Evaluating);
    let report = evaluator::evaluate_drawing(client, &analysis, story_description).await?;

    info!(stage = %PipelineStage::Done, accuracy = %report.accuracy);
    Ok(report)
}
