//! services/api/src/generation/remediation.rs
//!
//! Prompt construction and parsing for the remediation loop: deriving
//! recommendations from diagnostic-quiz statistics, and folding selected
//! recommendations into a rewritten guide.

use serde::Deserialize;

use classflow_core::analysis::QuizStatistics;
use classflow_core::domain::{GuideVersion, Recommendation};
use classflow_core::ports::GenerationRequest;

use super::{guide::GeneratedGuide, parse_payload, GeneratedPayloadError};

const ANALYSIS_SYSTEM: &str = r#"You are analyzing the results of a diagnostic quiz taken before a lesson, to recommend adjustments to the lesson guide.

Produce a JSON object with exactly these keys:
- "recommendations": an array of 2 to 5 items, each {"title": short imperative title, "description": what to change and why, "priority": "high" | "medium" | "low", "area": the part of the guide it touches (e.g. "objectives", "structure", "pacing", "prerequisites")}.
- "summary": a short paragraph summarizing what the results say about the group's starting point.

Ground every recommendation in the per-question accuracy you are given. Low-accuracy questions signal gaps the lesson must close."#;

const REWRITE_SYSTEM: &str = r#"You are revising a lesson guide by applying a set of accepted recommendations. Preserve the guide's overall quality and intent; change only what the recommendations call for, keeping durations consistent with the session length.

Produce a JSON object with exactly these keys:
- "objectives": the revised ordered array of learning-objective strings.
- "structure": the revised ordered array of {"duration_minutes": number, "activity": string, "description": string}.
- "guiding_questions": the revised array of Socratic questions."#;

#[derive(Debug, Deserialize)]
pub struct RawRecommendation {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_area")]
    pub area: String,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_area() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    recommendations: Vec<RawRecommendation>,
    #[serde(default)]
    summary: String,
}

/// Builds the analysis request from the guide (when one exists; extraordinary
/// classes may not have one) and the computed statistics.
pub fn analysis_request(guide: Option<&GuideVersion>, stats: &QuizStatistics) -> GenerationRequest {
    let mut user = String::new();

    if let Some(guide) = guide {
        user.push_str("Current lesson objectives:\n");
        for objective in &guide.objectives {
            user.push_str(&format!("- {objective}\n"));
        }
        user.push_str("\nCurrent activity structure:\n");
        for block in &guide.structure {
            user.push_str(&format!(
                "- {} min: {} ({})\n",
                block.duration_minutes, block.activity, block.description
            ));
        }
    } else {
        user.push_str("This class has no lesson guide yet; recommend what the guide should cover.\n");
    }

    user.push_str(&format!(
        "\nDiagnostic results: {} students completed the quiz, average score {:.1}%.\n",
        stats.respondents, stats.average_percent
    ));
    user.push_str("Per-question accuracy:\n");
    for question in &stats.per_question {
        user.push_str(&format!(
            "- \"{}\": {}/{} correct ({:.0}%)\n",
            question.prompt,
            question.correct,
            question.total,
            question.accuracy * 100.0
        ));
    }

    GenerationRequest {
        system: ANALYSIS_SYSTEM.to_string(),
        user,
        temperature: 0.4,
        max_output_tokens: 1500,
        json_output: true,
    }
}

/// Builds the guide-rewrite request folding the selected recommendations into
/// the (possibly manually edited) base guide.
pub fn rewrite_request(
    session_minutes: i32,
    objectives: &[String],
    structure_lines: &[String],
    guiding_questions: &[String],
    recommendations: &[Recommendation],
) -> GenerationRequest {
    let mut user = format!("Session length: {session_minutes} minutes.\n\nCurrent objectives:\n");
    for objective in objectives {
        user.push_str(&format!("- {objective}\n"));
    }
    user.push_str("\nCurrent structure:\n");
    for line in structure_lines {
        user.push_str(&format!("- {line}\n"));
    }
    user.push_str("\nCurrent guiding questions:\n");
    for question in guiding_questions {
        user.push_str(&format!("- {question}\n"));
    }
    user.push_str("\nRecommendations to apply:\n");
    for rec in recommendations {
        user.push_str(&format!(
            "- [{} / {}] {}: {}\n",
            rec.priority, rec.area, rec.title, rec.description
        ));
    }

    GenerationRequest {
        system: REWRITE_SYSTEM.to_string(),
        user,
        temperature: 0.5,
        max_output_tokens: 2500,
        json_output: true,
    }
}

/// Parses the analysis reply. This parse never fails the operation: a
/// malformed reply degrades to zero recommendations with the raw text kept as
/// the summary, so the teacher still sees what came back.
pub fn parse_analysis(text: &str) -> (Vec<RawRecommendation>, String) {
    match parse_payload::<RawAnalysis>(text) {
        Ok(analysis) => (analysis.recommendations, analysis.summary),
        Err(_) => (Vec::new(), text.trim().to_string()),
    }
}

/// Parses the rewrite reply into a guide shape; strict, like initial guide
/// generation.
pub fn parse_rewrite(text: &str) -> Result<GeneratedGuide, GeneratedPayloadError> {
    super::guide::parse(text)
}
