//! Essay feedback routed through the text pipeline.

use anyhow::Result;
use foundry_client::Table;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::text::run_text_upload;
use crate::domains::pipeline::{DatasetKey, PollOutcome, CHAT_ANALYSIS_FOLDER};
use crate::kernel::ServerDeps;

/// Shown until the pipeline produces an answer
pub const PENDING_RESPONSE: &str = "I'm analyzing your essay through our AI pipeline...";

/// Summary columns copied into `analysis`
const ANALYSIS_FIELDS: [&str; 4] = [
    "word_count",
    "readability_score",
    "tone_analysis",
    "structure_feedback",
];

#[derive(Debug, Clone, Deserialize)]
pub struct EssayRequest {
    pub message: String,
    pub essay_content: String,
    #[serde(default = "default_context")]
    pub context: String,
}

fn default_context() -> String {
    "college_essay".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EssayResponse {
    pub response: String,
    pub suggestions: Vec<String>,
    pub analysis: Map<String, Value>,
}

impl EssayResponse {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }
}

/// Text artifact the pipeline analyzes
pub fn format_essay_artifact(request: &EssayRequest) -> String {
    format!(
        "CONTEXT: College Essay Analysis\n\
         STUDENT_QUESTION: {}\n\
         ESSAY_CONTENT:\n\
         {}\n\n\
         ANALYSIS_REQUEST: Please provide writing feedback, suggestions for improvement, and answer the student's question.",
        request.message.trim(),
        request.essay_content.trim()
    )
}

/// Response from the qna answer and the summary's suggestions and metrics
pub fn essay_response(outcome: &PollOutcome) -> EssayResponse {
    let empty = Table::default();
    let qna = outcome.rows(DatasetKey::Qna).unwrap_or(&empty);
    let summary = outcome.rows(DatasetKey::Summary).unwrap_or(&empty);

    let response = qna
        .first_value("response")
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(PENDING_RESPONSE)
        .to_string();

    let suggestions = summary
        .first_value("suggestions")
        .map(|s| {
            s.split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let analysis = ANALYSIS_FIELDS
        .iter()
        .filter_map(|field| {
            summary
                .first_value(field)
                .map(|value| (field.to_string(), Value::String(value.to_string())))
        })
        .collect();

    EssayResponse {
        response,
        suggestions,
        analysis,
    }
}

/// Upload the essay under `chat_analysis/{today}/`, trigger and poll with the chat budget
pub async fn analyze_essay(deps: &ServerDeps, request: &EssayRequest) -> Result<EssayResponse> {
    let file_name = format!("essay-{}.txt", Uuid::new_v4());
    tracing::info!(file_name = %file_name, context = %request.context, "Submitting essay for analysis");

    let result = run_text_upload(
        deps,
        CHAT_ANALYSIS_FOLDER,
        file_name,
        format_essay_artifact(request).into_bytes(),
        None,
        deps.pipeline.chat_poll,
    )
    .await?;

    Ok(essay_response(&result.outcome))
}

/// Answer keyword questions locally
pub fn quick_answer(request: &EssayRequest) -> Option<EssayResponse> {
    let message = request.message.to_lowercase();
    if message.contains("word count") {
        let words = request.essay_content.split_whitespace().count();
        Some(EssayResponse::text(format!("Your essay currently has {} words.", words)))
    } else if message.contains("grammar") {
        Some(EssayResponse::text("I'll check your grammar through our AI analysis..."))
    } else if message.contains("structure") {
        Some(EssayResponse::text("Let me analyze your essay structure..."))
    } else {
        None
    }
}

/// Quick answer when one applies, otherwise the full analysis
pub async fn quick_help(deps: &ServerDeps, request: &EssayRequest) -> Result<EssayResponse> {
    match quick_answer(request) {
        Some(response) => Ok(response),
        None => analyze_essay(deps, request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::pipeline::PollState;
    use crate::kernel::test_dependencies::mock_table;
    use std::collections::BTreeMap;

    fn request(message: &str, essay: &str) -> EssayRequest {
        EssayRequest {
            message: message.to_string(),
            essay_content: essay.to_string(),
            context: default_context(),
        }
    }

    #[test]
    fn artifact_layout() {
        let text = format_essay_artifact(&request("Is my hook strong?", "I grew up by the sea."));
        assert!(text.starts_with("CONTEXT: College Essay Analysis\nSTUDENT_QUESTION: Is my hook strong?\nESSAY_CONTENT:\nI grew up by the sea.\n\nANALYSIS_REQUEST:"));
    }

    #[test]
    fn quick_answers_by_keyword() {
        let r = quick_answer(&request("What's my Word Count?", "one two  three\nfour")).unwrap();
        assert_eq!(r.response, "Your essay currently has 4 words.");
        assert!(r.suggestions.is_empty());

        assert!(quick_answer(&request("check grammar please", "")).is_some());
        assert!(quick_answer(&request("how is the structure", "")).is_some());
        assert!(quick_answer(&request("is this compelling?", "")).is_none());
    }

    #[test]
    fn response_from_outputs() {
        let mut results = BTreeMap::new();
        results.insert(DatasetKey::Qna, mock_table(&["response"], &[&["Strong opening."]]));
        results.insert(
            DatasetKey::Summary,
            mock_table(
                &["suggestions", "word_count", "tone_analysis"],
                &[&["Add an example\n\nTighten the ending", "412", "reflective"]],
            ),
        );
        let outcome = PollOutcome {
            state: PollState::Matched,
            results,
            iterations: 1,
            elapsed_ms: 0,
        };

        let r = essay_response(&outcome);
        assert_eq!(r.response, "Strong opening.");
        assert_eq!(r.suggestions, ["Add an example", "Tighten the ending"]);
        assert_eq!(r.analysis.get("word_count"), Some(&Value::String("412".into())));
        assert!(!r.analysis.contains_key("readability_score"));
    }

    #[test]
    fn pending_response_without_rows() {
        let outcome = PollOutcome {
            state: PollState::TimedOut,
            results: BTreeMap::new(),
            iterations: 3,
            elapsed_ms: 300_000,
        };
        let r = essay_response(&outcome);
        assert_eq!(r.response, PENDING_RESPONSE);
        assert!(r.suggestions.is_empty());
        assert!(r.analysis.is_empty());
    }
}
