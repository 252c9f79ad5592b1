//! services/api/src/generation/quiz.rs
//!
//! Prompt construction, parsing, and option normalization for quiz
//! generation: bulk per kind, full regeneration, and the per-question
//! mutations (swap, difficulty adjustment).

use serde::Deserialize;
use uuid::Uuid;

use classflow_core::domain::{
    GuideVersion, Question, QuestionKind, QuestionOption, QuizKind, Topic,
};
use classflow_core::ports::GenerationRequest;

use super::{parse_payload, GeneratedPayloadError};

/// Diagnostic quizzes are short: a quick pulse check before the lesson.
pub const PRE_QUESTION_COUNT: usize = 3;
pub const PRE_TIME_LIMIT_MINUTES: i32 = 5;
/// Summative quizzes are fixed at ten questions.
pub const POST_QUESTION_COUNT: usize = 10;
pub const POST_TIME_LIMIT_MINUTES: i32 = 15;

const MIN_OPTIONS: usize = 4;

const PRE_SYSTEM: &str = r#"You are writing a short diagnostic quiz taken BEFORE a lesson, to measure what students already know.

Produce a JSON object with exactly these keys:
- "title": a short quiz title.
- "reading": a reading passage of 150 to 250 words introducing the topic at the students' level. Every question must be answerable from the passage plus basic recall.
- "questions": an array of exactly 3 questions. Each question is {"prompt": string, "kind": "multiple_choice", "options": [4 or more answer strings], "correct_option": zero-based index of the right answer, "feedback": short justification}.

Focus on theory recall. All questions are multiple choice."#;

const POST_SYSTEM: &str = r#"You are writing a summative quiz taken AFTER a lesson, to measure what students learned.

Produce a JSON object with exactly these keys:
- "title": a short quiz title.
- "questions": an array of exactly 10 questions mixing the two kinds:
  - multiple choice: {"prompt": string, "kind": "multiple_choice", "options": [4 or more answer strings], "correct_option": zero-based index, "feedback": short justification}
  - open response: {"prompt": string, "kind": "open_response", "expected_answer": a model answer, "feedback": short justification}

No reading passage. Focus on analysis and application of the lesson content, not bare recall."#;

const SINGLE_SWAP_SYSTEM: &str = r#"You are replacing one question in an existing quiz with a brand-new question on the same topic, at a comparable difficulty, that does not duplicate the prompt you are shown.

Produce a JSON object for the single replacement question:
- multiple choice: {"prompt": string, "kind": "multiple_choice", "options": [4 or more answer strings], "correct_option": zero-based index, "feedback": short justification}
- open response: {"prompt": string, "kind": "open_response", "expected_answer": a model answer, "feedback": short justification}"#;

const SINGLE_DIFFICULTY_SYSTEM: &str = r#"You are rewriting one quiz question to shift its difficulty while preserving what it measures. Keep the same learning intent and question kind; rewrite the prompt and, for multiple choice, produce a fresh set of options.

Produce a JSON object for the single rewritten question:
- multiple choice: {"prompt": string, "kind": "multiple_choice", "options": [4 or more answer strings], "correct_option": zero-based index, "feedback": short justification}
- open response: {"prompt": string, "kind": "open_response", "expected_answer": a model answer, "feedback": short justification}"#;

/// Per-question actions supported by `modify_single_question`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionAction {
    Swap,
    AdjustDifficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easier,
    Harder,
}

/// The raw question shape reported by the service, before normalization.
#[derive(Debug, Deserialize)]
pub struct RawQuestion {
    pub prompt: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_option: Option<usize>,
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawQuiz {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    reading: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

/// A parsed and normalized quiz, ready to persist.
#[derive(Debug)]
pub struct ParsedQuiz {
    pub title: Option<String>,
    pub reading: Option<String>,
    pub questions: Vec<Question>,
}

pub fn question_count(kind: QuizKind) -> usize {
    match kind {
        QuizKind::Pre => PRE_QUESTION_COUNT,
        QuizKind::Post => POST_QUESTION_COUNT,
    }
}

pub fn time_limit_minutes(kind: QuizKind) -> i32 {
    match kind {
        QuizKind::Pre => PRE_TIME_LIMIT_MINUTES,
        QuizKind::Post => POST_TIME_LIMIT_MINUTES,
    }
}

/// Builds the bulk-generation request for a quiz of the given kind.
pub fn request(kind: QuizKind, topic: &Topic, guide: Option<&GuideVersion>) -> GenerationRequest {
    let mut user = format!(
        "Topic: {}\nTopic description: {}\nGrade level: {}\n",
        topic.name,
        topic.description.as_deref().unwrap_or("(none provided)"),
        topic.grade_level.as_deref().unwrap_or("(unspecified)"),
    );

    if let Some(guide) = guide {
        user.push_str("\nLesson objectives:\n");
        for objective in &guide.objectives {
            user.push_str(&format!("- {objective}\n"));
        }
        if !guide.guiding_questions.is_empty() {
            user.push_str("\nGuiding questions used in class:\n");
            for question in &guide.guiding_questions {
                user.push_str(&format!("- {question}\n"));
            }
        }
    }

    GenerationRequest {
        system: match kind {
            QuizKind::Pre => PRE_SYSTEM.to_string(),
            QuizKind::Post => POST_SYSTEM.to_string(),
        },
        user,
        temperature: 0.7,
        max_output_tokens: 3000,
        json_output: true,
    }
}

const REGENERATE_SYSTEM: &str = r#"You are replacing the full question set of a short diagnostic quiz. The reading passage already exists and must not change; write brand-new questions answerable from it.

Produce a JSON object with exactly these keys:
- "questions": an array of exactly 3 questions, each {"prompt": string, "kind": "multiple_choice", "options": [4 or more answer strings], "correct_option": zero-based index of the right answer, "feedback": short justification}.

Focus on theory recall. All questions are multiple choice."#;

/// Builds the request that regenerates a diagnostic quiz's question set
/// against its existing reading passage.
pub fn regenerate_request(topic: &Topic, reading: &str) -> GenerationRequest {
    let user = format!(
        "Topic: {}\nGrade level: {}\n\nReading passage:\n{}\n",
        topic.name,
        topic.grade_level.as_deref().unwrap_or("(unspecified)"),
        reading,
    );
    GenerationRequest {
        system: REGENERATE_SYSTEM.to_string(),
        user,
        temperature: 0.7,
        max_output_tokens: 2000,
        json_output: true,
    }
}

/// Parses a regeneration reply: exactly the diagnostic question count, every
/// question carrying the quiz's current reading.
pub fn parse_regenerated(
    quiz_id: Uuid,
    reading: &str,
    text: &str,
) -> Result<Vec<Question>, GeneratedPayloadError> {
    let raw: RawQuiz = parse_payload(text)?;
    if raw.questions.len() < PRE_QUESTION_COUNT {
        return Err(GeneratedPayloadError::TooFewQuestions {
            got: raw.questions.len(),
            expected: PRE_QUESTION_COUNT,
        });
    }
    raw.questions
        .into_iter()
        .take(PRE_QUESTION_COUNT)
        .enumerate()
        .map(|(i, q)| normalize_question(q, quiz_id, (i + 1) as i32, Some(reading)))
        .collect()
}

/// Builds the request for replacing or re-levelling a single question.
pub fn single_question_request(
    action: QuestionAction,
    question: &Question,
    topic: &Topic,
    difficulty: Option<Difficulty>,
) -> GenerationRequest {
    let mut user = format!(
        "Topic: {}\nCurrent question prompt: {}\nQuestion kind: {}\n",
        topic.name,
        question.prompt,
        question.kind.as_str(),
    );
    if let Some(reading) = &question.reading {
        user.push_str(&format!("Reading passage the quiz uses:\n{reading}\n"));
    }
    if action == QuestionAction::AdjustDifficulty {
        let direction = match difficulty.unwrap_or(Difficulty::Easier) {
            Difficulty::Easier => "easier",
            Difficulty::Harder => "harder",
        };
        user.push_str(&format!("Make the question {direction}.\n"));
    }

    GenerationRequest {
        system: match action {
            QuestionAction::Swap => SINGLE_SWAP_SYSTEM.to_string(),
            QuestionAction::AdjustDifficulty => SINGLE_DIFFICULTY_SYSTEM.to_string(),
        },
        user,
        temperature: 0.7,
        max_output_tokens: 800,
        json_output: true,
    }
}

/// Parses a bulk quiz reply, clamping the question list to the exact count
/// the kind demands: excess questions are dropped, a shortfall fails the
/// whole parse so no partial quiz is ever persisted.
pub fn parse_quiz(
    kind: QuizKind,
    quiz_id: Uuid,
    text: &str,
) -> Result<ParsedQuiz, GeneratedPayloadError> {
    let raw: RawQuiz = parse_payload(text)?;

    let reading = match kind {
        QuizKind::Pre => Some(
            raw.reading
                .filter(|r| !r.trim().is_empty())
                .ok_or(GeneratedPayloadError::MissingReading)?,
        ),
        QuizKind::Post => None,
    };

    let expected = question_count(kind);
    if raw.questions.len() < expected {
        return Err(GeneratedPayloadError::TooFewQuestions {
            got: raw.questions.len(),
            expected,
        });
    }

    let questions = raw
        .questions
        .into_iter()
        .take(expected)
        .enumerate()
        .map(|(i, raw_question)| {
            normalize_question(raw_question, quiz_id, (i + 1) as i32, reading.as_deref())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedQuiz {
        title: raw.title,
        reading,
        questions,
    })
}

/// Parses a single-question reply (swap / difficulty adjustment).
pub fn parse_single_question(
    quiz_id: Uuid,
    seq: i32,
    reading: Option<&str>,
    text: &str,
) -> Result<Question, GeneratedPayloadError> {
    let raw: RawQuestion = parse_payload(text)?;
    normalize_question(raw, quiz_id, seq, reading)
}

/// Normalizes a raw question into the persisted shape: option labels become
/// stable `{id, label}` pairs and the reported correct index is resolved into
/// the matching option id. Open-response questions carry no options.
pub fn normalize_question(
    raw: RawQuestion,
    quiz_id: Uuid,
    seq: i32,
    reading: Option<&str>,
) -> Result<Question, GeneratedPayloadError> {
    let open_response = raw
        .kind
        .as_deref()
        .map(|k| k == "open_response")
        .unwrap_or(raw.options.is_empty());

    let (kind, options, answer) = if open_response {
        (
            QuestionKind::OpenResponse,
            Vec::new(),
            raw.expected_answer.unwrap_or_default(),
        )
    } else {
        if raw.options.len() < MIN_OPTIONS {
            return Err(GeneratedPayloadError::TooFewOptions {
                got: raw.options.len(),
            });
        }
        let options: Vec<QuestionOption> = raw
            .options
            .into_iter()
            .map(|label| QuestionOption {
                id: Uuid::new_v4().to_string(),
                label,
            })
            .collect();
        let index = raw.correct_option.ok_or_else(|| {
            GeneratedPayloadError::Shape("multiple-choice question has no correct_option".into())
        })?;
        let answer = options
            .get(index)
            .map(|o| o.id.clone())
            .ok_or(GeneratedPayloadError::CorrectIndexOutOfRange {
                index,
                len: options.len(),
            })?;
        (QuestionKind::MultipleChoice, options, answer)
    };

    Ok(Question {
        id: Uuid::new_v4(),
        quiz_id,
        seq,
        prompt: raw.prompt,
        kind,
        options,
        answer,
        feedback: raw.feedback,
        reading: reading.map(str::to_string),
    })
}
