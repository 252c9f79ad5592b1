//! services/api/src/generation/guide.rs
//!
//! Prompt construction and result parsing for lesson-guide generation.

use serde::Deserialize;

use classflow_core::domain::{ActivityBlock, ClassSession, Recommendation, StudentGroup, Topic};
use classflow_core::ports::GenerationRequest;

use super::{parse_payload, GeneratedPayloadError};

const SYSTEM_INSTRUCTIONS: &str = r#"You are an experienced instructional designer creating a lesson guide for a single class session.

Produce a JSON object with exactly these keys:
- "objectives": an ordered array of 3 to 5 learning-objective strings.
- "structure": an ordered array of activity blocks, each {"duration_minutes": number, "activity": string, "description": string}. The durations must add up to the session length you are given.
- "guiding_questions": an array of 4 to 6 Socratic questions a teacher can ask during the session.

Write for the grade level you are given, use the requested teaching methods, and keep activities concrete enough to run without further preparation."#;

/// The structured result expected back from the service.
#[derive(Debug, Deserialize)]
pub struct GeneratedGuide {
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub structure: Vec<ActivityBlock>,
    #[serde(default)]
    pub guiding_questions: Vec<String>,
}

/// Builds the guide-generation request from the class context. Unapplied
/// recommendations from earlier diagnostic analysis ride along so regenerated
/// guides learn from prior sessions.
pub fn request(
    class: &ClassSession,
    topic: &Topic,
    group: &StudentGroup,
    method_tags: &[String],
    extra_context: Option<&str>,
    pending_recommendations: &[Recommendation],
) -> GenerationRequest {
    let mut user = format!(
        "Topic: {}\nTopic description: {}\nGrade level: {}\nGroup: {}\nSession duration: {} minutes\nTeaching methods: {}\n",
        topic.name,
        topic.description.as_deref().unwrap_or("(none provided)"),
        topic
            .grade_level
            .as_deref()
            .or(group.grade_level.as_deref())
            .unwrap_or("(unspecified)"),
        group.name,
        class.duration_minutes,
        if method_tags.is_empty() {
            "teacher's choice".to_string()
        } else {
            method_tags.join(", ")
        },
    );

    if let Some(context) = extra_context.or(class.pedagogical_context.as_deref()) {
        user.push_str("Additional pedagogical context: ");
        user.push_str(context);
        user.push('\n');
    }

    if !pending_recommendations.is_empty() {
        user.push_str("\nPending improvement recommendations from earlier diagnostics:\n");
        for rec in pending_recommendations {
            user.push_str(&format!("- [{}] {}: {}\n", rec.area, rec.title, rec.description));
        }
    }

    GenerationRequest {
        system: SYSTEM_INSTRUCTIONS.to_string(),
        user,
        temperature: 0.7,
        max_output_tokens: 2000,
        json_output: true,
    }
}

/// Parses a generated guide. A reply with no recognizable objectives or
/// structure is rejected rather than persisted as an empty version.
pub fn parse(text: &str) -> Result<GeneratedGuide, GeneratedPayloadError> {
    let guide: GeneratedGuide = parse_payload(text)?;
    if guide.objectives.is_empty() && guide.structure.is_empty() {
        return Err(GeneratedPayloadError::Shape(
            "guide has neither objectives nor an activity structure".to_string(),
        ));
    }
    Ok(guide)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_guide() {
        let text = r#"{
            "objectives": ["Explain photosynthesis", "Identify chloroplast function"],
            "structure": [
                {"duration_minutes": 10, "activity": "Warm-up", "description": "Recall prior knowledge"},
                {"duration_minutes": 30, "activity": "Guided practice", "description": "Leaf diagram labeling"}
            ],
            "guiding_questions": ["Why are leaves green?"]
        }"#;
        let guide = parse(text).unwrap();
        assert_eq!(guide.objectives.len(), 2);
        assert_eq!(guide.structure[1].duration_minutes, 30);
        assert_eq!(guide.guiding_questions.len(), 1);
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let text = r#"{"objectives": ["x"], "structure": [{"duration_minutes": 5, "activity": "Intro"}]}"#;
        let guide = parse(text).unwrap();
        assert_eq!(guide.structure[0].description, "");
    }

    #[test]
    fn rejects_empty_guide() {
        assert!(parse(r#"{"guiding_questions": ["only questions"]}"#).is_err());
    }
}
