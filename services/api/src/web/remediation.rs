//! services/api/src/web/remediation.rs
//!
//! The remediation loop: analyzing diagnostic-quiz responses into
//! recommendations, and folding accepted recommendations (plus optional
//! manual edits) into a new guide version.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use classflow_core::analysis::{quiz_statistics, QuizStatistics};
use classflow_core::domain::{
    ActivityBlock, GuideVersion, QuizKind, Recommendation, ResponseDetail, Teacher,
};
use classflow_core::workflow::{ensure_allowed, WorkflowError, WorkflowOp};

use crate::error::ApiError;
use crate::generation::remediation as remediation_gen;
use crate::web::principal::{owned_class, resolve_teacher};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessPreQuizRequest {
    pub class_id: Uuid,
    pub quiz_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionAccuracyPayload {
    pub question_id: Uuid,
    pub prompt: String,
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizStatsPayload {
    pub respondents: usize,
    pub average_percent: f64,
    pub per_question: Vec<QuestionAccuracyPayload>,
}

impl From<&QuizStatistics> for QuizStatsPayload {
    fn from(stats: &QuizStatistics) -> Self {
        QuizStatsPayload {
            respondents: stats.respondents,
            average_percent: stats.average_percent,
            per_question: stats
                .per_question
                .iter()
                .map(|q| QuestionAccuracyPayload {
                    question_id: q.question_id,
                    prompt: q.prompt.clone(),
                    correct: q.correct,
                    total: q.total,
                    accuracy: q.accuracy,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationPayload {
    pub recommendation_id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub area: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessPreQuizResponse {
    pub stats: QuizStatsPayload,
    pub recommendations: Vec<RecommendationPayload>,
    pub summary: String,
}

/// Manual replacements applied before any recommendation folding.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ManualEdits {
    pub objectives: Option<Vec<String>>,
    pub structure: Option<Vec<ManualActivityBlock>>,
    pub guiding_questions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualActivityBlock {
    pub duration_minutes: i32,
    pub activity: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyRecommendationsRequest {
    pub class_id: Uuid,
    #[serde(default)]
    pub recommendation_ids: Vec<Uuid>,
    pub manual_edits: Option<ManualEdits>,
    #[serde(default)]
    pub finalize: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyRecommendationsResponse {
    pub new_version_id: Uuid,
    pub version_number: i32,
    pub is_final: bool,
    pub class_state: String,
    pub applied_count: usize,
}

//=========================================================================================
// Workflow Operations
//=========================================================================================

async fn collect_details(
    state: &AppState,
    response_ids: impl Iterator<Item = Uuid>,
) -> Result<Vec<ResponseDetail>, ApiError> {
    let mut details = Vec::new();
    for response_id in response_ids {
        details.extend(state.db.get_response_details(response_id).await?);
    }
    Ok(details)
}

/// Analyzes completed diagnostic responses into unapplied recommendations.
/// Pure read-then-recommend: the guide itself is untouched.
pub async fn process_pre_quiz(
    state: &AppState,
    teacher: &Teacher,
    req: ProcessPreQuizRequest,
) -> Result<ProcessPreQuizResponse, ApiError> {
    let class = owned_class(state, teacher, req.class_id).await?;

    let quiz = state.db.get_quiz(req.quiz_id).await?;
    if quiz.class_id != class.id {
        return Err(ApiError::NotFound(format!("Quiz {} not found", req.quiz_id)));
    }
    if quiz.kind != QuizKind::Pre {
        return Err(ApiError::Validation(
            "only diagnostic quizzes can be analyzed for remediation".to_string(),
        ));
    }

    let next_state = ensure_allowed(class.state, WorkflowOp::AnalyzePreQuiz)?;

    let responses = state.db.get_completed_responses(quiz.id).await?;
    if responses.is_empty() {
        return Err(ApiError::Validation(
            "no completed responses to analyze".to_string(),
        ));
    }

    let questions = state.db.get_questions(quiz.id).await?;
    let details = collect_details(state, responses.iter().map(|r| r.id)).await?;
    let stats = quiz_statistics(&questions, &responses, &details);

    let guide = match class.active_guide_version {
        Some(version_id) => Some(state.db.get_guide_version(version_id).await?),
        None => None,
    };

    let request = remediation_gen::analysis_request(guide.as_ref(), &stats);
    let generation = state.llm.generate(&request).await?;
    let (raw_recommendations, summary) = remediation_gen::parse_analysis(&generation.text);

    let now = Utc::now();
    let rows: Vec<Recommendation> = raw_recommendations
        .into_iter()
        .map(|raw| Recommendation {
            id: Uuid::new_v4(),
            class_id: class.id,
            quiz_id: Some(quiz.id),
            title: raw.title,
            description: raw.description,
            priority: raw.priority,
            area: raw.area,
            applied: false,
            applied_version: None,
            created_at: now,
        })
        .collect();
    let rows = state.db.insert_recommendations(rows).await?;

    state.db.update_class_state(class.id, next_state).await?;

    info!(
        class_id = %class.id,
        quiz_id = %quiz.id,
        recommendations = rows.len(),
        "diagnostic responses analyzed"
    );

    Ok(ProcessPreQuizResponse {
        stats: (&stats).into(),
        recommendations: rows
            .iter()
            .map(|r| RecommendationPayload {
                recommendation_id: r.id,
                title: r.title.clone(),
                description: r.description.clone(),
                priority: r.priority.clone(),
                area: r.area.clone(),
            })
            .collect(),
        summary,
    })
}

/// Folds selected recommendations and/or manual edits into a new guide
/// version, optionally locking it as the final guide.
pub async fn apply_recommendations(
    state: &AppState,
    teacher: &Teacher,
    req: ApplyRecommendationsRequest,
) -> Result<ApplyRecommendationsResponse, ApiError> {
    let class = owned_class(state, teacher, req.class_id).await?;

    let op = if req.finalize {
        WorkflowOp::FinalizeGuide
    } else {
        WorkflowOp::ApplyRecommendations
    };
    let next_state = ensure_allowed(class.state, op)?;

    let base_version_id = class
        .active_guide_version
        .ok_or(WorkflowError::NoActiveGuide)?;
    let base = state.db.get_guide_version(base_version_id).await?;

    // Manual edits are direct replacements layered onto the base version.
    let edits = req.manual_edits.unwrap_or_default();
    let mut objectives = edits.objectives.unwrap_or_else(|| base.objectives.clone());
    let mut structure: Vec<ActivityBlock> = match edits.structure {
        Some(blocks) => blocks
            .into_iter()
            .map(|b| ActivityBlock {
                duration_minutes: b.duration_minutes,
                activity: b.activity,
                description: b.description,
            })
            .collect(),
        None => base.structure.clone(),
    };
    let mut guiding_questions = edits
        .guiding_questions
        .unwrap_or_else(|| base.guiding_questions.clone());

    // Only not-yet-applied recommendations belonging to this class are folded.
    let selected = if req.recommendation_ids.is_empty() {
        Vec::new()
    } else {
        state
            .db
            .get_recommendations_by_ids(&req.recommendation_ids)
            .await?
    };
    for rec in &selected {
        if rec.class_id != class.id {
            return Err(ApiError::NotFound(format!(
                "Recommendation {} not found",
                rec.id
            )));
        }
    }
    let to_apply: Vec<Recommendation> =
        selected.into_iter().filter(|r| !r.applied).collect();

    if !to_apply.is_empty() {
        let structure_lines: Vec<String> = structure
            .iter()
            .map(|b| format!("{} min: {} ({})", b.duration_minutes, b.activity, b.description))
            .collect();
        let request = remediation_gen::rewrite_request(
            class.duration_minutes,
            &objectives,
            &structure_lines,
            &guiding_questions,
            &to_apply,
        );
        let generation = state.llm.generate(&request).await?;
        let rewritten = remediation_gen::parse_rewrite(&generation.text)?;
        objectives = rewritten.objectives;
        structure = rewritten.structure;
        guiding_questions = rewritten.guiding_questions;
    }

    let version_number = state.db.latest_guide_version_number(class.id).await? + 1;
    let version = state
        .db
        .create_guide_version(GuideVersion {
            id: Uuid::new_v4(),
            class_id: class.id,
            version_number,
            objectives,
            structure,
            guiding_questions,
            generation_context: base.generation_context.clone(),
            approved: false,
            approved_at: None,
            approved_by: None,
            is_final: req.finalize,
            created_at: Utc::now(),
        })
        .await?;

    if !to_apply.is_empty() {
        let ids: Vec<Uuid> = to_apply.iter().map(|r| r.id).collect();
        state
            .db
            .mark_recommendations_applied(&ids, version.id)
            .await?;
    }

    state
        .db
        .set_active_guide_version(class.id, version.id)
        .await?;
    state.db.update_class_state(class.id, next_state).await?;

    info!(
        class_id = %class.id,
        version = version.version_number,
        applied = to_apply.len(),
        finalize = req.finalize,
        "recommendations folded into new guide version"
    );

    Ok(ApplyRecommendationsResponse {
        new_version_id: version.id,
        version_number: version.version_number,
        is_final: version.is_final,
        class_state: next_state.to_string(),
        applied_count: to_apply.len(),
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Analyze completed diagnostic responses into recommendations.
#[utoipa::path(
    post,
    path = "/classes/pre-quiz/analyze",
    request_body = ProcessPreQuizRequest,
    responses(
        (status = 200, description = "Analysis complete", body = ProcessPreQuizResponse),
        (status = 400, description = "No completed responses or wrong quiz kind"),
        (status = 404, description = "Class or quiz not found")
    )
)]
pub async fn process_pre_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ProcessPreQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = process_pre_quiz(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Fold selected recommendations into a new guide version.
#[utoipa::path(
    post,
    path = "/classes/recommendations/apply",
    request_body = ApplyRecommendationsRequest,
    responses(
        (status = 200, description = "New guide version created", body = ApplyRecommendationsResponse),
        (status = 400, description = "Workflow failure or no active guide"),
        (status = 404, description = "Class or recommendation not found"),
        (status = 409, description = "Concurrent version creation")
    )
)]
pub async fn apply_recommendations_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ApplyRecommendationsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = apply_recommendations(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}
