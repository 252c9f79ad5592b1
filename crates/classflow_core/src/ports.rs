//! crates/classflow_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the workflow's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or text-generation APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ClassSession, Feedback, GuideVersion, Question, Quiz, QuizKind, QuizResponse, Recommendation,
    ResponseDetail, Student, StudentGroup, Teacher, Topic,
};
use crate::workflow::ClassState;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all storage-port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Generative Text Service Port
//=========================================================================================

/// A request against the external text-generation capability.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// When set, the adapter instructs the model to emit a single JSON
    /// object. The returned text is still untrusted and must be parsed
    /// defensively by the caller.
    pub json_output: bool,
}

/// Generated text plus model/usage metadata.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// The typed error taxonomy of the generation client. Only `RateLimited` and
/// `Transport` are retryable; everything else propagates immediately.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service rate limited the request")]
    RateLimited,
    #[error("generation service quota exhausted")]
    InsufficientQuota,
    #[error("generation service rejected the credentials")]
    Unauthorized,
    #[error("generation service rejected the request: {0}")]
    BadRequest(String),
    #[error("transport failure talking to the generation service: {0}")]
    Transport(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::RateLimited | GenerationError::Transport(_))
    }
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Generates text for the given request, retrying rate-limit and
    /// transport failures with bounded backoff inside the adapter.
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerationError>;
}

//=========================================================================================
// Database Service Port
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Principal Resolution ---
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn get_teacher_by_user_id(&self, user_id: Uuid) -> PortResult<Teacher>;

    // --- Reference Data ---
    async fn get_topic(&self, topic_id: Uuid) -> PortResult<Topic>;

    /// Creates an ad-hoc topic for an extraordinary class.
    async fn create_topic(&self, topic: Topic) -> PortResult<Topic>;

    async fn get_group(&self, group_id: Uuid) -> PortResult<StudentGroup>;

    async fn get_students_for_group(&self, group_id: Uuid) -> PortResult<Vec<Student>>;

    // --- Class Management ---
    async fn create_class(&self, class: ClassSession) -> PortResult<ClassSession>;

    async fn get_class(&self, class_id: Uuid) -> PortResult<ClassSession>;

    async fn update_class_state(&self, class_id: Uuid, state: ClassState) -> PortResult<()>;

    async fn set_active_guide_version(&self, class_id: Uuid, version_id: Uuid) -> PortResult<()>;

    // --- Guide Versions ---
    /// Inserts a new version. A duplicate (class, version_number) pair from a
    /// concurrent writer maps to `PortError::Conflict`.
    async fn create_guide_version(&self, version: GuideVersion) -> PortResult<GuideVersion>;

    async fn get_guide_version(&self, version_id: Uuid) -> PortResult<GuideVersion>;

    /// Highest version number recorded for the class, 0 when none exist.
    async fn latest_guide_version_number(&self, class_id: Uuid) -> PortResult<i32>;

    async fn approve_guide_version(
        &self,
        version_id: Uuid,
        approved_by: Uuid,
        approved_at: DateTime<Utc>,
    ) -> PortResult<()>;

    // --- Quizzes and Questions ---
    /// Persists the quiz and its questions in a single transaction: either
    /// the full set of rows lands or nothing does.
    async fn create_quiz_with_questions(
        &self,
        quiz: Quiz,
        questions: Vec<Question>,
    ) -> PortResult<Quiz>;

    async fn get_quiz(&self, quiz_id: Uuid) -> PortResult<Quiz>;

    async fn find_quiz_for_class(&self, class_id: Uuid, kind: QuizKind)
        -> PortResult<Option<Quiz>>;

    /// Atomically flips the quiz to published. Returns
    /// `PortError::Conflict` when the quiz is already published, leaving the
    /// original publish timestamp untouched.
    async fn mark_quiz_published(&self, quiz_id: Uuid, at: DateTime<Utc>) -> PortResult<()>;

    /// Overwrites the quiz reading passage and its denormalized copy on every
    /// question of the quiz.
    async fn update_quiz_reading(&self, quiz_id: Uuid, reading: &str) -> PortResult<()>;

    async fn get_questions(&self, quiz_id: Uuid) -> PortResult<Vec<Question>>;

    async fn get_question(&self, question_id: Uuid) -> PortResult<Question>;

    async fn update_question(&self, question: &Question) -> PortResult<()>;

    /// Deletes the quiz's questions and inserts the replacements in one
    /// transaction.
    async fn replace_questions(
        &self,
        quiz_id: Uuid,
        questions: Vec<Question>,
    ) -> PortResult<Vec<Question>>;

    // --- Responses (read-only here) ---
    async fn get_completed_responses(&self, quiz_id: Uuid) -> PortResult<Vec<QuizResponse>>;

    async fn get_response_details(&self, response_id: Uuid) -> PortResult<Vec<ResponseDetail>>;

    // --- Recommendations ---
    async fn insert_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> PortResult<Vec<Recommendation>>;

    async fn get_recommendations_by_ids(&self, ids: &[Uuid]) -> PortResult<Vec<Recommendation>>;

    async fn get_unapplied_recommendations(&self, class_id: Uuid)
        -> PortResult<Vec<Recommendation>>;

    async fn mark_recommendations_applied(
        &self,
        ids: &[Uuid],
        version_id: Uuid,
    ) -> PortResult<()>;

    // --- Feedback ---
    async fn insert_feedback(&self, feedback: Feedback) -> PortResult<()>;
}
