//! crates/classflow_core/src/analysis.rs
//!
//! Pure statistics over completed quiz responses. The remediation and
//! feedback engines both start from these aggregates before asking the text
//! service for anything.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Question, QuizResponse, ResponseDetail};

/// Accuracy of one question across all completed responses.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionAccuracy {
    pub question_id: Uuid,
    pub prompt: String,
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

/// Aggregate view of a completed quiz used to drive remediation.
#[derive(Debug, Clone, Serialize)]
pub struct QuizStatistics {
    pub respondents: usize,
    pub average_percent: f64,
    pub per_question: Vec<QuestionAccuracy>,
}

/// One student's result on a quiz, used to drive per-student feedback.
#[derive(Debug, Clone, Serialize)]
pub struct StudentPerformance {
    pub student_id: Uuid,
    pub correct: usize,
    pub total: usize,
    pub percent_correct: f64,
    pub score: f64,
}

/// Computes aggregate and per-question accuracy across completed responses.
///
/// Questions keep their quiz order in `per_question`; a question nobody
/// answered reports zero totals rather than being dropped.
pub fn quiz_statistics(
    questions: &[Question],
    responses: &[QuizResponse],
    details: &[ResponseDetail],
) -> QuizStatistics {
    let mut correct_by_question: HashMap<Uuid, (usize, usize)> = HashMap::new();
    for detail in details {
        let entry = correct_by_question.entry(detail.question_id).or_default();
        entry.1 += 1;
        if detail.is_correct {
            entry.0 += 1;
        }
    }

    let per_question = questions
        .iter()
        .map(|q| {
            let (correct, total) = correct_by_question.get(&q.id).copied().unwrap_or((0, 0));
            QuestionAccuracy {
                question_id: q.id,
                prompt: q.prompt.clone(),
                correct,
                total,
                accuracy: ratio(correct, total),
            }
        })
        .collect();

    let average_percent = if responses.is_empty() {
        0.0
    } else {
        responses.iter().map(|r| r.percent_correct).sum::<f64>() / responses.len() as f64
    };

    QuizStatistics {
        respondents: responses.len(),
        average_percent,
        per_question,
    }
}

/// Computes per-student correctness counts from response detail rows.
pub fn student_performance(
    responses: &[QuizResponse],
    details: &[ResponseDetail],
) -> Vec<StudentPerformance> {
    let mut counts_by_response: HashMap<Uuid, (usize, usize)> = HashMap::new();
    for detail in details {
        let entry = counts_by_response.entry(detail.response_id).or_default();
        entry.1 += 1;
        if detail.is_correct {
            entry.0 += 1;
        }
    }

    responses
        .iter()
        .map(|r| {
            let (correct, total) = counts_by_response.get(&r.id).copied().unwrap_or((0, 0));
            StudentPerformance {
                student_id: r.student_id,
                correct,
                total,
                percent_correct: r.percent_correct,
                score: r.score,
            }
        })
        .collect()
}

fn ratio(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}
