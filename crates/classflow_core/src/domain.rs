//! crates/classflow_core/src/domain.rs
//!
//! Defines the pure, core data structures for the class preparation and
//! assessment workflow. These structs are independent of any database or
//! transport format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::ClassState;

/// A teacher record, resolved from the authenticated principal.
///
/// Rows are created by the external administration surface; this subsystem
/// only reads them to establish ownership of classes.
#[derive(Debug, Clone)]
pub struct Teacher {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
}

/// A curriculum topic, or an ad-hoc one created together with an
/// extraordinary class. The `extraordinary` flag exempts the owning class
/// from the guide-approval guards throughout the workflow.
#[derive(Debug, Clone)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub grade_level: Option<String>,
    pub extraordinary: bool,
}

/// A group of students a class is taught to.
#[derive(Debug, Clone)]
pub struct StudentGroup {
    pub id: Uuid,
    pub name: String,
    pub grade_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Student {
    pub id: Uuid,
    pub group_id: Uuid,
    pub full_name: String,
}

/// One scheduled or extraordinary teaching session, the workflow's root
/// entity. Every workflow step loads it, validates its `state`, and persists
/// a new state on success.
#[derive(Debug, Clone)]
pub struct ClassSession {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub topic_id: Uuid,
    pub group_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub duration_minutes: i32,
    pub method_tags: Vec<String>,
    pub pedagogical_context: Option<String>,
    pub state: ClassState,
    /// Points at the currently active guide version, once one exists.
    pub active_guide_version: Option<Uuid>,
    /// Null for extraordinary/ad-hoc topics.
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A timed block inside a guide's activity structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityBlock {
    pub duration_minutes: i32,
    pub activity: String,
    #[serde(default)]
    pub description: String,
}

/// An immutable-once-created snapshot of a lesson guide. Corrections always
/// produce a new version; only the approval fields are ever written after
/// creation.
#[derive(Debug, Clone)]
pub struct GuideVersion {
    pub id: Uuid,
    pub class_id: Uuid,
    pub version_number: i32,
    pub objectives: Vec<String>,
    pub structure: Vec<ActivityBlock>,
    pub guiding_questions: Vec<String>,
    pub generation_context: Option<String>,
    pub approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub is_final: bool,
    pub created_at: DateTime<Utc>,
}

/// Evaluation kind of a quiz: diagnostic before the lesson, summative after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    Pre,
    Post,
}

impl QuizKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizKind::Pre => "pre",
            QuizKind::Post => "post",
        }
    }
}

impl std::str::FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(QuizKind::Pre),
            "post" => Ok(QuizKind::Post),
            other => Err(format!("unknown quiz kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Draft,
    Approved,
    Published,
    Closed,
}

impl QuizState {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizState::Draft => "draft",
            QuizState::Approved => "approved",
            QuizState::Published => "published",
            QuizState::Closed => "closed",
        }
    }

    /// Publishing is only legal before the quiz has gone out.
    pub fn publishable(&self) -> bool {
        matches!(self, QuizState::Draft | QuizState::Approved)
    }
}

impl std::str::FromStr for QuizState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuizState::Draft),
            "approved" => Ok(QuizState::Approved),
            "published" => Ok(QuizState::Published),
            "closed" => Ok(QuizState::Closed),
            other => Err(format!("unknown quiz state '{other}'")),
        }
    }
}

/// One assessment instance tied to a class.
#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: Uuid,
    pub class_id: Uuid,
    pub kind: QuizKind,
    pub title: String,
    pub state: QuizState,
    pub time_limit_minutes: i32,
    /// Shared reading passage; only diagnostic quizzes carry one.
    pub reading: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    OpenResponse,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::OpenResponse => "open_response",
        }
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(QuestionKind::MultipleChoice),
            "open_response" => Ok(QuestionKind::OpenResponse),
            other => Err(format!("unknown question kind '{other}'")),
        }
    }
}

/// A normalized answer option. The `id` is assigned once at creation and
/// survives later edits to the label, so stored responses stay resolvable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
}

/// A question belonging to one quiz, ordered by `seq`.
///
/// For multiple-choice questions `answer` holds the id of the correct option;
/// for open-response questions it holds the expected free-text answer and the
/// option list is empty.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub seq: i32,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<QuestionOption>,
    pub answer: String,
    pub feedback: Option<String>,
    /// Denormalized copy of the quiz reading passage (diagnostic quizzes).
    pub reading: Option<String>,
}

/// A student's submission to a quiz. Read-only from this subsystem's
/// perspective; rows are produced by the student-facing surface.
#[derive(Debug, Clone)]
pub struct QuizResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub completed: bool,
    pub score: f64,
    pub percent_correct: f64,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ResponseDetail {
    pub id: Uuid,
    pub response_id: Uuid,
    pub question_id: Uuid,
    pub submitted_value: Option<String>,
    pub is_correct: bool,
    pub time_spent_seconds: Option<i32>,
}

/// A suggested guide change derived from diagnostic-quiz analysis. Created
/// unapplied; flipping `applied` (and linking the version it was folded into)
/// is the only mutation.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub id: Uuid,
    pub class_id: Uuid,
    pub quiz_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub area: String,
    pub applied: bool,
    pub applied_version: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The audience a generated feedback note is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAudience {
    Student,
    TeacherIndividual,
    TeacherGroup,
    Guardian,
}

impl FeedbackAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackAudience::Student => "student",
            FeedbackAudience::TeacherIndividual => "teacher_individual",
            FeedbackAudience::TeacherGroup => "teacher_group",
            FeedbackAudience::Guardian => "guardian",
        }
    }
}

impl std::str::FromStr for FeedbackAudience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(FeedbackAudience::Student),
            "teacher_individual" => Ok(FeedbackAudience::TeacherIndividual),
            "teacher_group" => Ok(FeedbackAudience::TeacherGroup),
            "guardian" => Ok(FeedbackAudience::Guardian),
            other => Err(format!("unknown feedback audience '{other}'")),
        }
    }
}

/// A generated feedback note tied to a class and its summative quiz.
/// Immutable once created; regenerating produces new rows.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub id: Uuid,
    pub class_id: Uuid,
    pub quiz_id: Uuid,
    pub audience: FeedbackAudience,
    /// Set for the per-student audiences, absent for group feedback.
    pub student_id: Option<Uuid>,
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a best-effort fan-out batch: what was written and what failed.
/// A failure partway through never rolls back earlier items; callers can
/// retry only the failed subset.
#[derive(Debug)]
pub struct FanoutOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<FanoutFailure>,
}

impl<T> Default for FanoutOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// One failed item in a fan-out batch, labeled well enough to retry.
#[derive(Debug, Clone, Serialize)]
pub struct FanoutFailure {
    pub label: String,
    pub error: String,
}

impl<T> FanoutOutcome<T> {
    pub fn record_success(&mut self, item: T) {
        self.succeeded.push(item);
    }

    pub fn record_failure(&mut self, label: impl Into<String>, error: impl std::fmt::Display) {
        self.failed.push(FanoutFailure {
            label: label.into(),
            error: error.to_string(),
        });
    }
}
