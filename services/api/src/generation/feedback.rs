//! services/api/src/generation/feedback.rs
//!
//! Prompt construction and parsing for the four feedback audiences generated
//! from summative-quiz results. Every parse here falls back to placeholder
//! content; one malformed reply must never abort the batch.

use serde_json::{json, Value};

use classflow_core::analysis::{QuizStatistics, StudentPerformance};
use classflow_core::domain::{StudentGroup, Topic};
use classflow_core::ports::GenerationRequest;

use super::parse_payload;

const STUDENT_SYSTEM: &str = r#"You are writing encouraging, concrete feedback for a student about their results on a quiz taken after a lesson.

Produce a JSON object with exactly these keys:
- "strengths": array of 1 to 3 things the student did well.
- "growth_areas": array of 1 to 3 specific areas to improve.
- "motivational_message": one warm, personal sentence.
- "suggestions": array of 1 to 3 concrete study suggestions.

Address the student by name, write at their level, and never shame low scores."#;

const TEACHER_INDIVIDUAL_SYSTEM: &str = r#"You are briefing a teacher on one student's results on a summative quiz.

Produce a JSON object with exactly these keys:
- "performance_analysis": a short paragraph on what the results show.
- "comprehension_level": one of "advanced", "proficient", "developing", "beginning".
- "recommendations": array of 1 to 3 pedagogical recommendations for this student.

Be clinical and specific; the reader is a professional educator."#;

const GUARDIAN_SYSTEM: &str = r#"You are writing to a student's guardian about a recent quiz, in plain, jargon-free language.

Produce a JSON object with exactly these keys:
- "summary": 2 or 3 plain-language sentences on how the student did.
- "home_support": array of 1 to 3 simple ways to help at home.

Be warm, avoid grades-speak, and never compare the student to classmates."#;

const GROUP_SYSTEM: &str = r#"You are summarizing a whole group's results on a summative quiz for the teacher who taught the lesson.

Produce a JSON object with exactly these keys:
- "group_strengths": array of areas the group handled well.
- "group_weaknesses": array of areas the group struggled with.
- "patterns": array of notable patterns across questions or score bands.
- "recommendations": array of 1 to 3 recommendations for the next session.

Ground every claim in the per-question accuracy you are given."#;

fn performance_lines(student_name: &str, topic: &Topic, perf: &StudentPerformance) -> String {
    format!(
        "Student: {}\nTopic: {}\nResult: {} of {} questions correct ({:.1}%), score {:.1}.\n",
        student_name, topic.name, perf.correct, perf.total, perf.percent_correct, perf.score
    )
}

pub fn student_request(
    student_name: &str,
    topic: &Topic,
    perf: &StudentPerformance,
) -> GenerationRequest {
    GenerationRequest {
        system: STUDENT_SYSTEM.to_string(),
        user: performance_lines(student_name, topic, perf),
        temperature: 0.8,
        max_output_tokens: 900,
        json_output: true,
    }
}

pub fn teacher_individual_request(
    student_name: &str,
    topic: &Topic,
    perf: &StudentPerformance,
) -> GenerationRequest {
    GenerationRequest {
        system: TEACHER_INDIVIDUAL_SYSTEM.to_string(),
        user: performance_lines(student_name, topic, perf),
        temperature: 0.5,
        max_output_tokens: 900,
        json_output: true,
    }
}

pub fn guardian_request(
    student_name: &str,
    topic: &Topic,
    perf: &StudentPerformance,
) -> GenerationRequest {
    GenerationRequest {
        system: GUARDIAN_SYSTEM.to_string(),
        user: performance_lines(student_name, topic, perf),
        temperature: 0.7,
        max_output_tokens: 700,
        json_output: true,
    }
}

pub fn group_request(group: &StudentGroup, topic: &Topic, stats: &QuizStatistics) -> GenerationRequest {
    let mut user = format!(
        "Group: {}\nTopic: {}\n{} students completed the quiz, average score {:.1}%.\n\nPer-question accuracy:\n",
        group.name, topic.name, stats.respondents, stats.average_percent
    );
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
        system: GROUP_SYSTEM.to_string(),
        user,
        temperature: 0.6,
        max_output_tokens: 1200,
        json_output: true,
    }
}

/// Parses a feedback reply into its JSON content. A reply that does not parse
/// becomes placeholder content wrapping the raw text, so the row is still
/// written and the batch continues.
pub fn parse_content(text: &str) -> Value {
    parse_payload::<Value>(text)
        .ok()
        .filter(Value::is_object)
        .unwrap_or_else(|| json!({ "summary": text.trim() }))
}
