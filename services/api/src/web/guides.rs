//! services/api/src/web/guides.rs
//!
//! Lesson-guide generation and approval. Versions are immutable once created;
//! regeneration and remediation both append a new version and repoint the
//! class.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use classflow_core::domain::{GuideVersion, QuizKind, Teacher};
use classflow_core::workflow::{ensure_allowed, WorkflowOp};

use crate::error::ApiError;
use crate::generation::guide as guide_gen;
use crate::web::principal::{owned_class, resolve_teacher};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateGuideRequest {
    pub class_id: Uuid,
    #[serde(default)]
    pub method_tags: Vec<String>,
    pub extra_context: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityBlockPayload {
    pub duration_minutes: i32,
    pub activity: String,
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateGuideResponse {
    pub objectives: Vec<String>,
    pub structure: Vec<ActivityBlockPayload>,
    pub guiding_questions: Vec<String>,
    pub version_id: Uuid,
    pub version_number: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveGuideRequest {
    pub class_id: Uuid,
    pub version_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApproveGuideResponse {
    pub approved_version: i32,
    pub class_state: String,
    pub has_pre_quiz: bool,
}

//=========================================================================================
// Workflow Operations
//=========================================================================================

/// Generates a new guide version for the class and makes it active.
pub async fn generate_guide(
    state: &AppState,
    teacher: &Teacher,
    req: GenerateGuideRequest,
) -> Result<GenerateGuideResponse, ApiError> {
    let class = owned_class(state, teacher, req.class_id).await?;
    ensure_allowed(class.state, WorkflowOp::GenerateGuide)?;

    let topic = state.db.get_topic(class.topic_id).await?;
    let group = state.db.get_group(class.group_id).await?;

    // Selection for this generation; falls back to the tags chosen at step 1.
    let method_tags = if req.method_tags.is_empty() {
        class.method_tags.clone()
    } else {
        req.method_tags.clone()
    };

    let pending = state.db.get_unapplied_recommendations(class.id).await?;

    let request = guide_gen::request(
        &class,
        &topic,
        &group,
        &method_tags,
        req.extra_context.as_deref(),
        &pending,
    );
    let generation = state.llm.generate(&request).await?;
    let guide = guide_gen::parse(&generation.text)?;

    let version_number = state.db.latest_guide_version_number(class.id).await? + 1;
    let version = state
        .db
        .create_guide_version(GuideVersion {
            id: Uuid::new_v4(),
            class_id: class.id,
            version_number,
            objectives: guide.objectives,
            structure: guide.structure,
            guiding_questions: guide.guiding_questions,
            generation_context: req.extra_context,
            approved: false,
            approved_at: None,
            approved_by: None,
            is_final: false,
            created_at: Utc::now(),
        })
        .await?;

    state
        .db
        .set_active_guide_version(class.id, version.id)
        .await?;
    let next_state = WorkflowOp::GenerateGuide.target_state();
    state.db.update_class_state(class.id, next_state).await?;

    info!(
        class_id = %class.id,
        version = version.version_number,
        model = %generation.model,
        "guide version generated"
    );

    Ok(GenerateGuideResponse {
        objectives: version.objectives.clone(),
        structure: version
            .structure
            .iter()
            .map(|b| ActivityBlockPayload {
                duration_minutes: b.duration_minutes,
                activity: b.activity.clone(),
                description: b.description.clone(),
            })
            .collect(),
        guiding_questions: version.guiding_questions.clone(),
        version_id: version.id,
        version_number: version.version_number,
    })
}

/// Approves a guide version and makes it the class's active version.
pub async fn approve_guide(
    state: &AppState,
    teacher: &Teacher,
    req: ApproveGuideRequest,
) -> Result<ApproveGuideResponse, ApiError> {
    let class = owned_class(state, teacher, req.class_id).await?;
    let next_state = ensure_allowed(class.state, WorkflowOp::ApproveGuide)?;

    let version = state.db.get_guide_version(req.version_id).await?;
    if version.class_id != class.id {
        return Err(ApiError::NotFound(format!(
            "Guide version {} not found",
            req.version_id
        )));
    }

    state
        .db
        .approve_guide_version(version.id, teacher.id, Utc::now())
        .await?;

    // Idempotent when the approved version is already active.
    if class.active_guide_version != Some(version.id) {
        state
            .db
            .set_active_guide_version(class.id, version.id)
            .await?;
    }
    state.db.update_class_state(class.id, next_state).await?;

    // The diagnostic quiz is a distinct teacher-triggered step; report
    // whether one already exists so the client can route accordingly.
    let has_pre_quiz = state
        .db
        .find_quiz_for_class(class.id, QuizKind::Pre)
        .await?
        .is_some();

    Ok(ApproveGuideResponse {
        approved_version: version.version_number,
        class_state: next_state.to_string(),
        has_pre_quiz,
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Generate a lesson guide for a class.
#[utoipa::path(
    post,
    path = "/classes/guide/generate",
    request_body = GenerateGuideRequest,
    responses(
        (status = 200, description = "Guide version created", body = GenerateGuideResponse),
        (status = 400, description = "Workflow or validation failure"),
        (status = 404, description = "Class not found or not owned by the caller"),
        (status = 409, description = "Concurrent version creation")
    )
)]
pub async fn generate_guide_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<GenerateGuideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = generate_guide(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Approve a guide version.
#[utoipa::path(
    post,
    path = "/classes/guide/approve",
    request_body = ApproveGuideRequest,
    responses(
        (status = 200, description = "Guide approved", body = ApproveGuideResponse),
        (status = 400, description = "Workflow failure"),
        (status = 404, description = "Class or version not found")
    )
)]
pub async fn approve_guide_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ApproveGuideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = approve_guide(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}
