use crate::schema::REPORT_KEYS;

pub const EVALUATOR_SYSTEM_PROMPT: &str = "You are an expert in evaluating children's drawings, especially for kids with ASD (Autism Spectrum Disorder).";

/// Instruction sent alongside the drawing in the first (vision) request.
pub fn analysis_prompt(story_description: &str) -> String {
    format!(
        r#"Analyze this child's drawing. The child was given the following story description:

'{}'

Please analyze how well the drawing matches the description. Focus on:
1. Whether the child understood the scenario
2. If the object count is accurate and relevant
3. If objects are positioned correctly
4. Overall accuracy percentage

Provide a detailed analysis of the drawing in relation to the story."#,
        story_description
    )
}

/// Instruction for the second (text-only) request that turns the free-text
/// analysis into the five-key report.
pub fn evaluation_prompt(story_description: &str, analysis_text: &str) -> String {
    let keys = REPORT_KEYS
        .iter()
        .enumerate()
        .map(|(i, key)| format!("{}. \"{}\"", i + 1, key))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on the following analysis of a child's drawing and the original story description,
generate an evaluation report in JSON format with these exact keys:

{}

Original story description: '{}'

Analysis of the drawing: '{}'

Provide detailed but concise answers for each question. For the accuracy, include a percentage estimate.
For ASD-related feedback, provide insights or observations related to ASD.
Return ONLY the JSON object with no additional text."#,
        keys, story_description, analysis_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_quotes_story_verbatim() {
        let prompt = analysis_prompt("Two {tall} mountains");
        assert!(prompt.contains("'Two {tall} mountains'"));
        assert!(prompt.contains("Overall accuracy percentage"));
    }

    #[test]
    fn test_evaluation_prompt_lists_every_key() {
        let prompt = evaluation_prompt("story", "analysis");
        for key in REPORT_KEYS {
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
        assert!(prompt.contains("5. \"ASD-related feedback\""));
        assert!(prompt.contains("Original story description: 'story'"));
        assert!(prompt.contains("Analysis of the drawing: 'analysis'"));
    }
}
