//! services/api/src/web/quizzes.rs
//!
//! The assessment engine's web surface: bulk quiz generation, publication,
//! reading/question edits, full regeneration, and per-question mutations.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use classflow_core::domain::{
    ClassSession, Question, QuestionKind, QuestionOption, Quiz, QuizKind, QuizState, Teacher,
};
use classflow_core::workflow::{
    check_quiz_generation, ensure_allowed, GuardContext, WorkflowOp,
};

use crate::error::ApiError;
use crate::generation::quiz as quiz_gen;
use crate::generation::quiz::{Difficulty, QuestionAction};
use crate::web::principal::{owned_class, resolve_teacher};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateQuizRequest {
    pub class_id: Uuid,
    /// "pre" or "post".
    #[schema(value_type = String)]
    pub kind: QuizKind,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptionPayload {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionPayload {
    pub question_id: Uuid,
    pub seq: i32,
    pub prompt: String,
    pub kind: String,
    pub options: Vec<OptionPayload>,
    pub answer: String,
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateQuizResponse {
    pub quiz_id: Uuid,
    pub reading: Option<String>,
    pub questions: Vec<QuestionPayload>,
    pub time_limit: i32,
    #[schema(value_type = String)]
    pub kind: QuizKind,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishQuizRequest {
    pub quiz_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublishQuizResponse {
    pub quiz_id: Uuid,
    pub sent_at: chrono::DateTime<Utc>,
    pub class_state: String,
    #[schema(value_type = String)]
    pub kind: QuizKind,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditReadingRequest {
    pub quiz_id: Uuid,
    pub reading: String,
}

/// Direct field overwrites for one question. Absent fields are left alone.
/// Options keep their stable id when one is supplied; a new id is minted for
/// freshly added options.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditQuestionRequest {
    pub question_id: Uuid,
    pub prompt: Option<String>,
    pub options: Option<Vec<EditOptionPayload>>,
    pub answer: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditOptionPayload {
    pub id: Option<String>,
    pub label: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegenerateQuestionsRequest {
    pub quiz_id: Uuid,
    pub class_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegenerateQuestionsResponse {
    pub quiz_id: Uuid,
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ModifyQuestionRequest {
    pub quiz_id: Uuid,
    pub question_id: Uuid,
    /// "swap" or "adjust_difficulty".
    #[schema(value_type = String)]
    pub action: QuestionAction,
    /// "easier" or "harder"; only read for difficulty adjustment.
    #[schema(value_type = Option<String>)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModifyQuestionResponse {
    pub updated_question: QuestionPayload,
}

fn question_payload(question: &Question) -> QuestionPayload {
    QuestionPayload {
        question_id: question.id,
        seq: question.seq,
        prompt: question.prompt.clone(),
        kind: question.kind.as_str().to_string(),
        options: question
            .options
            .iter()
            .map(|o| OptionPayload {
                id: o.id.clone(),
                label: o.label.clone(),
            })
            .collect(),
        answer: question.answer.clone(),
        feedback: question.feedback.clone(),
    }
}

/// Loads a quiz and verifies, through its class, that the caller owns it.
async fn owned_quiz(
    state: &AppState,
    teacher: &Teacher,
    quiz_id: Uuid,
) -> Result<(Quiz, ClassSession), ApiError> {
    let quiz = state.db.get_quiz(quiz_id).await.map_err(|e| match e {
        classflow_core::ports::PortError::NotFound(_) => {
            ApiError::NotFound(format!("Quiz {quiz_id} not found"))
        }
        other => other.into(),
    })?;
    let class = state.db.get_class(quiz.class_id).await?;
    if class.teacher_id != teacher.id {
        return Err(ApiError::NotFound(format!("Quiz {quiz_id} not found")));
    }
    Ok((quiz, class))
}

fn require_editable(quiz: &Quiz) -> Result<(), ApiError> {
    if !quiz.state.publishable() {
        return Err(ApiError::Conflict(format!(
            "quiz {} is already published and can no longer be edited",
            quiz.id
        )));
    }
    Ok(())
}

//=========================================================================================
// Workflow Operations
//=========================================================================================

/// Generates a quiz of the given kind for the class, enforcing the
/// guide-approval guards (bypassed for extraordinary topics).
pub async fn generate_quiz(
    state: &AppState,
    teacher: &Teacher,
    req: GenerateQuizRequest,
) -> Result<GenerateQuizResponse, ApiError> {
    let class = owned_class(state, teacher, req.class_id).await?;
    let topic = state.db.get_topic(class.topic_id).await?;

    let guide = match class.active_guide_version {
        Some(version_id) => Some(state.db.get_guide_version(version_id).await?),
        None => None,
    };

    let ctx = GuardContext {
        extraordinary_topic: topic.extraordinary,
        guide_approved: guide.as_ref().map(|g| g.approved).unwrap_or(false),
        guide_final: guide.as_ref().map(|g| g.is_final).unwrap_or(false),
    };
    check_quiz_generation(req.kind, class.state, &ctx)?;

    if state
        .db
        .find_quiz_for_class(class.id, req.kind)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "a {} quiz already exists for this class",
            req.kind.as_str()
        )));
    }

    let request = quiz_gen::request(req.kind, &topic, guide.as_ref());
    let generation = state.llm.generate(&request).await?;

    let quiz_id = Uuid::new_v4();
    let parsed = quiz_gen::parse_quiz(req.kind, quiz_id, &generation.text)?;

    let title = parsed.title.unwrap_or_else(|| match req.kind {
        QuizKind::Pre => format!("{}: diagnostic check", topic.name),
        QuizKind::Post => format!("{}: summative assessment", topic.name),
    });

    let quiz = state
        .db
        .create_quiz_with_questions(
            Quiz {
                id: quiz_id,
                class_id: class.id,
                kind: req.kind,
                title,
                state: QuizState::Draft,
                time_limit_minutes: quiz_gen::time_limit_minutes(req.kind),
                reading: parsed.reading.clone(),
                published_at: None,
                created_at: Utc::now(),
            },
            parsed.questions.clone(),
        )
        .await?;

    let op = match req.kind {
        QuizKind::Pre => WorkflowOp::GeneratePreQuiz,
        QuizKind::Post => WorkflowOp::GeneratePostQuiz,
    };
    state
        .db
        .update_class_state(class.id, op.target_state())
        .await?;

    info!(
        class_id = %class.id,
        quiz_id = %quiz.id,
        kind = req.kind.as_str(),
        questions = parsed.questions.len(),
        "quiz generated"
    );

    Ok(GenerateQuizResponse {
        quiz_id: quiz.id,
        reading: quiz.reading,
        questions: parsed.questions.iter().map(question_payload).collect(),
        time_limit: quiz.time_limit_minutes,
        kind: quiz.kind,
    })
}

/// Publishes a quiz. The second call for the same quiz conflicts and the
/// publish timestamp never changes after the first.
pub async fn publish_quiz(
    state: &AppState,
    teacher: &Teacher,
    req: PublishQuizRequest,
) -> Result<PublishQuizResponse, ApiError> {
    let (quiz, class) = owned_quiz(state, teacher, req.quiz_id).await?;

    if !quiz.state.publishable() {
        return Err(ApiError::Conflict(format!(
            "quiz {} is already published",
            quiz.id
        )));
    }

    let op = match quiz.kind {
        QuizKind::Pre => WorkflowOp::PublishPreQuiz,
        QuizKind::Post => WorkflowOp::PublishPostQuiz,
    };
    let next_state = ensure_allowed(class.state, op)?;

    let sent_at = Utc::now();
    state.db.mark_quiz_published(quiz.id, sent_at).await?;
    state.db.update_class_state(class.id, next_state).await?;

    // Notifying students is the delivery surface's concern, not ours.
    info!(quiz_id = %quiz.id, kind = quiz.kind.as_str(), "quiz published");

    Ok(PublishQuizResponse {
        quiz_id: quiz.id,
        sent_at,
        class_state: next_state.to_string(),
        kind: quiz.kind,
    })
}

/// Overwrites the reading passage of a diagnostic quiz.
pub async fn edit_reading(
    state: &AppState,
    teacher: &Teacher,
    req: EditReadingRequest,
) -> Result<(), ApiError> {
    let (quiz, _) = owned_quiz(state, teacher, req.quiz_id).await?;
    if quiz.kind != QuizKind::Pre {
        return Err(ApiError::Validation(
            "only diagnostic quizzes carry a reading passage".to_string(),
        ));
    }
    require_editable(&quiz)?;
    if req.reading.trim().is_empty() {
        return Err(ApiError::Validation("reading must not be empty".to_string()));
    }
    state.db.update_quiz_reading(quiz.id, &req.reading).await?;
    Ok(())
}

/// Direct field overwrite of one question.
pub async fn edit_question(
    state: &AppState,
    teacher: &Teacher,
    req: EditQuestionRequest,
) -> Result<QuestionPayload, ApiError> {
    let mut question = state.db.get_question(req.question_id).await?;
    let (quiz, _) = owned_quiz(state, teacher, question.quiz_id).await?;
    require_editable(&quiz)?;

    if let Some(prompt) = req.prompt {
        question.prompt = prompt;
    }
    if let Some(options) = req.options {
        if question.kind == QuestionKind::OpenResponse {
            return Err(ApiError::Validation(
                "open-response questions have no options".to_string(),
            ));
        }
        if options.len() < 4 {
            return Err(ApiError::Validation(
                "multiple-choice questions require at least 4 options".to_string(),
            ));
        }
        question.options = options
            .into_iter()
            .map(|o| QuestionOption {
                id: o.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                label: o.label,
            })
            .collect();
    }
    if let Some(answer) = req.answer {
        question.answer = answer;
    }
    if let Some(feedback) = req.feedback {
        question.feedback = Some(feedback);
    }

    if question.kind == QuestionKind::MultipleChoice {
        let hits = question
            .options
            .iter()
            .filter(|o| o.id == question.answer)
            .count();
        if hits != 1 {
            return Err(ApiError::Validation(
                "answer must match exactly one option id".to_string(),
            ));
        }
    }

    state.db.update_question(&question).await?;
    Ok(question_payload(&question))
}

/// Deletes and regenerates the full question set of a diagnostic quiz
/// against its current reading passage.
pub async fn regenerate_all_questions(
    state: &AppState,
    teacher: &Teacher,
    req: RegenerateQuestionsRequest,
) -> Result<RegenerateQuestionsResponse, ApiError> {
    let class = owned_class(state, teacher, req.class_id).await?;
    let (quiz, _) = owned_quiz(state, teacher, req.quiz_id).await?;
    if quiz.class_id != class.id {
        return Err(ApiError::NotFound(format!("Quiz {} not found", req.quiz_id)));
    }
    if quiz.kind != QuizKind::Pre {
        return Err(ApiError::Validation(
            "only diagnostic quizzes support full regeneration".to_string(),
        ));
    }
    require_editable(&quiz)?;

    let reading = quiz.reading.clone().ok_or_else(|| {
        ApiError::Validation("quiz has no reading passage to regenerate against".to_string())
    })?;
    let topic = state.db.get_topic(class.topic_id).await?;

    let request = quiz_gen::regenerate_request(&topic, &reading);
    let generation = state.llm.generate(&request).await?;
    let questions = quiz_gen::parse_regenerated(quiz.id, &reading, &generation.text)?;

    let questions = state.db.replace_questions(quiz.id, questions).await?;

    info!(quiz_id = %quiz.id, "diagnostic questions regenerated");

    Ok(RegenerateQuestionsResponse {
        quiz_id: quiz.id,
        questions: questions.iter().map(question_payload).collect(),
    })
}

/// Swaps or re-levels a single question. The question keeps its id, quiz, and
/// position; options and the correct answer are regenerated wholesale.
pub async fn modify_single_question(
    state: &AppState,
    teacher: &Teacher,
    req: ModifyQuestionRequest,
) -> Result<ModifyQuestionResponse, ApiError> {
    let (quiz, class) = owned_quiz(state, teacher, req.quiz_id).await?;
    require_editable(&quiz)?;

    let existing = state.db.get_question(req.question_id).await?;
    if existing.quiz_id != quiz.id {
        return Err(ApiError::NotFound(format!(
            "Question {} not found",
            req.question_id
        )));
    }

    let topic = state.db.get_topic(class.topic_id).await?;
    let request =
        quiz_gen::single_question_request(req.action, &existing, &topic, req.difficulty);
    let generation = state.llm.generate(&request).await?;

    let mut replacement = quiz_gen::parse_single_question(
        quiz.id,
        existing.seq,
        existing.reading.as_deref(),
        &generation.text,
    )?;
    replacement.id = existing.id;

    state.db.update_question(&replacement).await?;

    Ok(ModifyQuestionResponse {
        updated_question: question_payload(&replacement),
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Generate a diagnostic or summative quiz.
#[utoipa::path(
    post,
    path = "/quizzes/generate",
    request_body = GenerateQuizRequest,
    responses(
        (status = 200, description = "Quiz generated", body = GenerateQuizResponse),
        (status = 400, description = "Guard or validation failure"),
        (status = 404, description = "Class not found or not owned by the caller"),
        (status = 409, description = "A quiz of this kind already exists")
    )
)]
pub async fn generate_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = generate_quiz(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Publish a quiz to its class.
#[utoipa::path(
    post,
    path = "/quizzes/publish",
    request_body = PublishQuizRequest,
    responses(
        (status = 200, description = "Quiz published", body = PublishQuizResponse),
        (status = 404, description = "Quiz not found"),
        (status = 409, description = "Quiz already published")
    )
)]
pub async fn publish_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<PublishQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = publish_quiz(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Overwrite the reading passage of a diagnostic quiz.
#[utoipa::path(
    post,
    path = "/quizzes/reading",
    request_body = EditReadingRequest,
    responses(
        (status = 204, description = "Reading updated"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn edit_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<EditReadingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    edit_reading(&state, &teacher, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Overwrite fields of one question.
#[utoipa::path(
    post,
    path = "/questions/edit",
    request_body = EditQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionPayload),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn edit_question_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<EditQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = edit_question(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Regenerate the full question set of a diagnostic quiz.
#[utoipa::path(
    post,
    path = "/quizzes/questions/regenerate",
    request_body = RegenerateQuestionsRequest,
    responses(
        (status = 200, description = "Questions regenerated", body = RegenerateQuestionsResponse),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn regenerate_questions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<RegenerateQuestionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = regenerate_all_questions(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Swap or adjust the difficulty of a single question.
#[utoipa::path(
    post,
    path = "/questions/modify",
    request_body = ModifyQuestionRequest,
    responses(
        (status = 200, description = "Question replaced", body = ModifyQuestionResponse),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Quiz or question not found")
    )
)]
pub async fn modify_question_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ModifyQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = resolve_teacher(&state, user_id).await?;
    let response = modify_single_question(&state, &teacher, req).await?;
    Ok((StatusCode::OK, Json(response)))
}
