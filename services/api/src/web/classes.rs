//! services/api/src/web/classes.rs
//!
//! Step-1 context: creating a class session (from a curriculum topic or as an
//! ad-hoc extraordinary session) and the minimal read surface the workflow
//! client needs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use classflow_core::domain::{ClassSession, QuizKind, Teacher, Topic};
use classflow_core::workflow::ClassState;

use crate::error::ApiError;
use crate::web::principal::{owned_class, resolve_teacher};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Inline topic definition for an ad-hoc (extraordinary) session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdHocTopic {
    pub name: String,
    pub description: Option<String>,
    pub grade_level: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClassRequest {
    /// Curriculum topic reference; mutually exclusive with `ad_hoc_topic`.
    pub topic_id: Option<Uuid>,
    /// Ad-hoc topic; the created topic is flagged extraordinary.
    pub ad_hoc_topic: Option<AdHocTopic>,
    /// Guide template, only meaningful for curriculum topics.
    pub template_id: Option<Uuid>,
    pub group_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub duration_minutes: i32,
    #[serde(default)]
    pub method_tags: Vec<String>,
    pub pedagogical_context: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateClassResponse {
    pub class_id: Uuid,
    pub topic_id: Uuid,
    pub extraordinary: bool,
    pub class_state: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuideSummaryPayload {
    pub version_id: Uuid,
    pub version_number: i32,
    pub approved: bool,
    pub is_final: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassDetailResponse {
    pub class_id: Uuid,
    pub topic_id: Uuid,
    pub topic_name: String,
    pub extraordinary: bool,
    pub group_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub duration_minutes: i32,
    pub method_tags: Vec<String>,
    pub class_state: String,
    pub current_guide: Option<GuideSummaryPayload>,
    pub has_pre_quiz: bool,
    pub has_post_quiz: bool,
}

//=========================================================================================
// Workflow Operations
//=========================================================================================

/// Creates a class session from the teacher's step-1 context.
pub async fn create_class(
    state: &AppState,
    teacher: &Teacher,
    req: CreateClassRequest,
) -> Result<CreateClassResponse, ApiError> {
    if req.duration_minutes <= 0 {
        return Err(ApiError::Validation(
            "duration_minutes must be positive".to_string(),
        ));
    }

    let (topic, template_id) = match (req.topic_id, req.ad_hoc_topic) {
        (Some(topic_id), None) => (state.db.get_topic(topic_id).await?, req.template_id),
        (None, Some(ad_hoc)) => {
            let topic = state
                .db
                .create_topic(Topic {
                    id: Uuid::new_v4(),
                    name: ad_hoc.name,
                    description: ad_hoc.description,
                    grade_level: ad_hoc.grade_level,
                    extraordinary: true,
                })
                .await?;
            // Ad-hoc sessions never reference a guide template.
            (topic, None)
        }
        _ => {
            return Err(ApiError::Validation(
                "provide exactly one of topic_id or ad_hoc_topic".to_string(),
            ))
        }
    };

    // The group must exist before a class can point at it.
    state.db.get_group(req.group_id).await?;

    let now = Utc::now();
    let class = state
        .db
        .create_class(ClassSession {
            id: Uuid::new_v4(),
            teacher_id: teacher.id,
            topic_id: topic.id,
            group_id: req.group_id,
            scheduled_date: req.scheduled_date,
            duration_minutes: req.duration_minutes,
            method_tags: req.method_tags,
            pedagogical_context: req.pedagogical_context,
            state: ClassState::Draft,
            active_guide_version: None,
            template_id,
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok(CreateClassResponse {
        class_id: class.id,
        topic_id: topic.id,
        extraordinary: topic.extraordinary,
        class_state: class.state.to_string(),
    })
}

/// Loads the class detail view: state, current guide, and which quizzes exist.
pub async fn class_detail(
    state: &AppState,
    teacher: &Teacher,
    class_id: Uuid,
) -> Result<ClassDetailResponse, ApiError> {
    let class = owned_class(state, teacher, class_id).await?;
    let topic = state.db.get_topic(class.topic_id).await?;

    let current_guide = match class.active_guide_version {
        Some(version_id) => {
            let version = state.db.get_guide_version(version_id).await?;
            Some(GuideSummaryPayload {
                version_id: version.id,
                version_number: version.version_number,
                approved: version.approved,
                is_final: version.is_final,
            })
        }
        None => None,
    };

    let has_pre_quiz = state
        .db
        .find_quiz_for_class(class.id, QuizKind::Pre)
        .await?
        .is_some();
    let has_post_quiz = state
        .db
        .find_quiz_for_class(class.id, QuizKind::Post)
        .await?
        .is_some();

    Ok(ClassDetailResponse {
        class_id: class.id,
        topic_id: topic.id,
        topic_name: topic.name,
        extraordinary: topic.extraordinary,
        group_id: class.group_id,
        scheduled_date: class.scheduled_date,
        duration_minutes: class.duration_minutes,
        method_tags: class.method_tags,
        class_state: class.state.to_string(),
        current_guide,
        has_pre_quiz,
        has_post_quiz,
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Create a class session from step-1 context.
#[utoipa::path(
    post,
    path = "/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = CreateClassResponse),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Missing or invalid principal")
    )
)]
pub async fn create_class_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = create_class(&state, &teacher, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Class detail: state, current guide version, quiz flags.
#[utoipa::path(
    get,
    path = "/classes/{class_id}",
    params(("class_id" = Uuid, Path, description = "Class identifier")),
    responses(
        (status = 200, description = "Class detail", body = ClassDetailResponse),
        (status = 404, description = "Class not found or not owned by the caller")
    )
)]
pub async fn class_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = class_detail(&state, &teacher, class_id).await?;
    Ok(Json(response))
}
