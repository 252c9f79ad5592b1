//! services/api/src/web/feedback.rs
//!
//! Multi-audience feedback generation from summative-quiz results. The
//! fan-out is sequential and best-effort: every generated note is persisted
//! as soon as it exists, a failed request is recorded and skipped, and the
//! response reports partial counts so the caller can retry only what failed.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use classflow_core::analysis::{quiz_statistics, student_performance, StudentPerformance};
use classflow_core::domain::{FanoutOutcome, Feedback, FeedbackAudience, QuizKind, Teacher, Topic};
use classflow_core::ports::GenerationRequest;
use classflow_core::workflow::{ensure_allowed, WorkflowOp};

use crate::error::ApiError;
use crate::generation::feedback as feedback_gen;
use crate::web::principal::{owned_class, resolve_teacher};
use crate::web::remediation::QuizStatsPayload;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateFeedbackRequest {
    pub class_id: Uuid,
    pub post_quiz_id: Uuid,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct FeedbackBreakdown {
    pub student: usize,
    pub teacher_individual: usize,
    pub teacher_group: usize,
    pub guardian: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackFailurePayload {
    pub label: String,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateFeedbackResponse {
    pub generated_count: usize,
    pub breakdown_by_kind: FeedbackBreakdown,
    pub group_stats: QuizStatsPayload,
    pub failed: Vec<FeedbackFailurePayload>,
}

//=========================================================================================
// Workflow Operation
//=========================================================================================

/// One unit of the fan-out: generate, parse (with placeholder fallback), and
/// persist a single feedback row. Returns the audience on success so the
/// caller can tally the breakdown.
async fn generate_one(
    state: &AppState,
    class_id: Uuid,
    quiz_id: Uuid,
    audience: FeedbackAudience,
    student_id: Option<Uuid>,
    request: &GenerationRequest,
) -> Result<FeedbackAudience, ApiError> {
    let generation = state.feedback_llm.generate(request).await?;
    let content = feedback_gen::parse_content(&generation.text);

    state
        .db
        .insert_feedback(Feedback {
            id: Uuid::new_v4(),
            class_id,
            quiz_id,
            audience,
            student_id,
            content,
            created_at: Utc::now(),
        })
        .await?;

    Ok(audience)
}

/// Generates the four feedback categories from the summative quiz's completed
/// responses: three notes per responding student plus one group note.
pub async fn generate_feedback(
    state: &AppState,
    teacher: &Teacher,
    req: GenerateFeedbackRequest,
) -> Result<GenerateFeedbackResponse, ApiError> {
    let class = owned_class(state, teacher, req.class_id).await?;

    let quiz = state.db.get_quiz(req.post_quiz_id).await?;
    if quiz.class_id != class.id {
        return Err(ApiError::NotFound(format!(
            "Quiz {} not found",
            req.post_quiz_id
        )));
    }
    if quiz.kind != QuizKind::Post {
        return Err(ApiError::Validation(
            "feedback is generated from the summative quiz".to_string(),
        ));
    }

    let next_state = ensure_allowed(class.state, WorkflowOp::GenerateFeedback)?;

    let responses = state.db.get_completed_responses(quiz.id).await?;
    if responses.is_empty() {
        return Err(ApiError::Validation(
            "no completed responses to generate feedback from".to_string(),
        ));
    }

    let questions = state.db.get_questions(quiz.id).await?;
    let mut details = Vec::new();
    for response in &responses {
        details.extend(state.db.get_response_details(response.id).await?);
    }
    let stats = quiz_statistics(&questions, &responses, &details);
    let performances = student_performance(&responses, &details);

    let topic = state.db.get_topic(class.topic_id).await?;
    let group = state.db.get_group(class.group_id).await?;
    let roster: HashMap<Uuid, String> = state
        .db
        .get_students_for_group(class.group_id)
        .await?
        .into_iter()
        .map(|s| (s.id, s.full_name))
        .collect();

    let mut outcome: FanoutOutcome<FeedbackAudience> = FanoutOutcome::default();

    // The per-student requests are issued sequentially and independently;
    // nothing already written is rolled back when a later request fails.
    for perf in &performances {
        let student_name = roster
            .get(&perf.student_id)
            .cloned()
            .unwrap_or_else(|| "the student".to_string());

        for (audience, request) in per_student_requests(&student_name, &topic, perf) {
            let label = format!("{}:{}", audience.as_str(), perf.student_id);
            match generate_one(
                state,
                class.id,
                quiz.id,
                audience,
                Some(perf.student_id),
                &request,
            )
            .await
            {
                Ok(audience) => outcome.record_success(audience),
                Err(e) => {
                    warn!(label = %label, error = %e, "feedback item failed, continuing batch");
                    outcome.record_failure(label, e);
                }
            }
        }
    }

    let group_request = feedback_gen::group_request(&group, &topic, &stats);
    match generate_one(
        state,
        class.id,
        quiz.id,
        FeedbackAudience::TeacherGroup,
        None,
        &group_request,
    )
    .await
    {
        Ok(audience) => outcome.record_success(audience),
        Err(e) => {
            warn!(error = %e, "group feedback failed, continuing");
            outcome.record_failure(FeedbackAudience::TeacherGroup.as_str(), e);
        }
    }

    state.db.update_class_state(class.id, next_state).await?;

    let mut breakdown = FeedbackBreakdown::default();
    for audience in &outcome.succeeded {
        match audience {
            FeedbackAudience::Student => breakdown.student += 1,
            FeedbackAudience::TeacherIndividual => breakdown.teacher_individual += 1,
            FeedbackAudience::TeacherGroup => breakdown.teacher_group += 1,
            FeedbackAudience::Guardian => breakdown.guardian += 1,
        }
    }

    info!(
        class_id = %class.id,
        quiz_id = %quiz.id,
        generated = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "feedback batch finished"
    );

    Ok(GenerateFeedbackResponse {
        generated_count: outcome.succeeded.len(),
        breakdown_by_kind: breakdown,
        group_stats: (&stats).into(),
        failed: outcome
            .failed
            .into_iter()
            .map(|f| FeedbackFailurePayload {
                label: f.label,
                error: f.error,
            })
            .collect(),
    })
}

fn per_student_requests(
    student_name: &str,
    topic: &Topic,
    perf: &StudentPerformance,
) -> [(FeedbackAudience, GenerationRequest); 3] {
    [
        (
            FeedbackAudience::Student,
            feedback_gen::student_request(student_name, topic, perf),
        ),
        (
            FeedbackAudience::TeacherIndividual,
            feedback_gen::teacher_individual_request(student_name, topic, perf),
        ),
        (
            FeedbackAudience::Guardian,
            feedback_gen::guardian_request(student_name, topic, perf),
        ),
    ]
}

//=========================================================================================
// Handler
//=========================================================================================

/// Generate multi-audience feedback from summative-quiz results.
#[utoipa::path(
    post,
    path = "/classes/feedback/generate",
    request_body = GenerateFeedbackRequest,
    responses(
        (status = 200, description = "Feedback batch finished (possibly partial)", body = GenerateFeedbackResponse),
        (status = 400, description = "No completed responses or wrong quiz kind"),
        (status = 404, description = "Class or quiz not found")
    )
)]
pub async fn generate_feedback_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<GenerateFeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = generate_feedback(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}
