//! crates/classflow_core/src/workflow.rs
//!
//! The class workflow state machine. A class moves through an explicit
//! enumerated state; every mutating operation names itself as a
//! [`WorkflowOp`] and is validated against one central transition table
//! instead of ad-hoc state checks scattered across handlers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::QuizKind;

/// The lifecycle states of a class session.
///
/// `Scheduled` and `InSession` are administrative states that overlap the
/// guide/quiz portion of the timeline; the preparation operations accept them
/// as starting points just like their workflow counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassState {
    Draft,
    GuideGenerating,
    GuideEditing,
    GuideApproved,
    PreQuizGenerating,
    PreQuizSent,
    AnalyzingPreQuiz,
    ModifyingGuide,
    FinalGuide,
    PostQuizGenerating,
    PostQuizSent,
    AnalyzingResults,
    Completed,
    Scheduled,
    InSession,
}

impl ClassState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassState::Draft => "draft",
            ClassState::GuideGenerating => "guide_generating",
            ClassState::GuideEditing => "guide_editing",
            ClassState::GuideApproved => "guide_approved",
            ClassState::PreQuizGenerating => "pre_quiz_generating",
            ClassState::PreQuizSent => "pre_quiz_sent",
            ClassState::AnalyzingPreQuiz => "analyzing_pre_quiz",
            ClassState::ModifyingGuide => "modifying_guide",
            ClassState::FinalGuide => "final_guide",
            ClassState::PostQuizGenerating => "post_quiz_generating",
            ClassState::PostQuizSent => "post_quiz_sent",
            ClassState::AnalyzingResults => "analyzing_results",
            ClassState::Completed => "completed",
            ClassState::Scheduled => "scheduled",
            ClassState::InSession => "in_session",
        }
    }
}

impl fmt::Display for ClassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClassState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" | "new" => Ok(ClassState::Draft),
            "guide_generating" => Ok(ClassState::GuideGenerating),
            "guide_editing" => Ok(ClassState::GuideEditing),
            "guide_approved" => Ok(ClassState::GuideApproved),
            "pre_quiz_generating" => Ok(ClassState::PreQuizGenerating),
            "pre_quiz_sent" => Ok(ClassState::PreQuizSent),
            "analyzing_pre_quiz" => Ok(ClassState::AnalyzingPreQuiz),
            "modifying_guide" => Ok(ClassState::ModifyingGuide),
            "final_guide" => Ok(ClassState::FinalGuide),
            "post_quiz_generating" => Ok(ClassState::PostQuizGenerating),
            "post_quiz_sent" => Ok(ClassState::PostQuizSent),
            "analyzing_results" => Ok(ClassState::AnalyzingResults),
            "completed" => Ok(ClassState::Completed),
            "scheduled" => Ok(ClassState::Scheduled),
            "in_session" => Ok(ClassState::InSession),
            other => Err(format!("unknown class state '{other}'")),
        }
    }
}

/// The workflow operations that read or advance a class's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOp {
    GenerateGuide,
    ApproveGuide,
    GeneratePreQuiz,
    PublishPreQuiz,
    AnalyzePreQuiz,
    ApplyRecommendations,
    FinalizeGuide,
    GeneratePostQuiz,
    PublishPostQuiz,
    GenerateFeedback,
    /// Tail transition driven by the external class-validation collaborator.
    CloseClass,
}

impl WorkflowOp {
    /// The state a class lands in when the operation succeeds.
    pub fn target_state(&self) -> ClassState {
        match self {
            WorkflowOp::GenerateGuide => ClassState::GuideEditing,
            WorkflowOp::ApproveGuide => ClassState::GuideApproved,
            WorkflowOp::GeneratePreQuiz => ClassState::PreQuizGenerating,
            WorkflowOp::PublishPreQuiz => ClassState::PreQuizSent,
            WorkflowOp::AnalyzePreQuiz => ClassState::AnalyzingPreQuiz,
            WorkflowOp::ApplyRecommendations => ClassState::ModifyingGuide,
            WorkflowOp::FinalizeGuide => ClassState::FinalGuide,
            WorkflowOp::GeneratePostQuiz => ClassState::PostQuizGenerating,
            WorkflowOp::PublishPostQuiz => ClassState::PostQuizSent,
            WorkflowOp::GenerateFeedback => ClassState::AnalyzingResults,
            WorkflowOp::CloseClass => ClassState::Completed,
        }
    }

    /// The states the operation may start from. Several steps are re-entrant:
    /// a guide can be regenerated while editing, recommendations can be
    /// applied repeatedly while the guide is being modified.
    fn allowed_from(&self) -> &'static [ClassState] {
        match self {
            WorkflowOp::GenerateGuide => &[
                ClassState::Draft,
                ClassState::Scheduled,
                ClassState::GuideGenerating,
                ClassState::GuideEditing,
            ],
            WorkflowOp::ApproveGuide => &[ClassState::GuideEditing, ClassState::GuideGenerating],
            WorkflowOp::GeneratePreQuiz => &[
                ClassState::GuideApproved,
                ClassState::PreQuizGenerating,
                ClassState::Scheduled,
                ClassState::InSession,
            ],
            WorkflowOp::PublishPreQuiz => &[ClassState::PreQuizGenerating],
            WorkflowOp::AnalyzePreQuiz => &[ClassState::PreQuizSent, ClassState::InSession],
            WorkflowOp::ApplyRecommendations | WorkflowOp::FinalizeGuide => {
                &[ClassState::AnalyzingPreQuiz, ClassState::ModifyingGuide]
            }
            WorkflowOp::GeneratePostQuiz => &[
                ClassState::FinalGuide,
                ClassState::PostQuizGenerating,
                ClassState::InSession,
            ],
            WorkflowOp::PublishPostQuiz => &[ClassState::PostQuizGenerating],
            WorkflowOp::GenerateFeedback => &[ClassState::PostQuizSent],
            WorkflowOp::CloseClass => &[ClassState::AnalyzingResults],
        }
    }
}

impl fmt::Display for WorkflowOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowOp::GenerateGuide => "generate_guide",
            WorkflowOp::ApproveGuide => "approve_guide",
            WorkflowOp::GeneratePreQuiz => "generate_pre_quiz",
            WorkflowOp::PublishPreQuiz => "publish_pre_quiz",
            WorkflowOp::AnalyzePreQuiz => "analyze_pre_quiz",
            WorkflowOp::ApplyRecommendations => "apply_recommendations",
            WorkflowOp::FinalizeGuide => "finalize_guide",
            WorkflowOp::GeneratePostQuiz => "generate_post_quiz",
            WorkflowOp::PublishPostQuiz => "publish_post_quiz",
            WorkflowOp::GenerateFeedback => "generate_feedback",
            WorkflowOp::CloseClass => "close_class",
        };
        f.write_str(name)
    }
}

/// Errors raised by transition validation and quiz-generation guards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("operation '{op}' is not allowed while the class is in state '{state}'")]
    InvalidTransition { op: WorkflowOp, state: ClassState },

    #[error("guide must be approved before generating the diagnostic quiz")]
    GuideNotApproved,

    #[error("guide must be marked final before generating the summative quiz")]
    GuideNotFinal,

    #[error("class has no active guide version")]
    NoActiveGuide,
}

/// Checks whether `op` may run while the class sits in `from` and would move
/// it to `to`. The single source of truth for workflow ordering.
pub fn can_transition(from: ClassState, to: ClassState, op: WorkflowOp) -> bool {
    op.target_state() == to && op.allowed_from().contains(&from)
}

/// Validates that `op` may start from `state`, returning the state the class
/// should advance to.
pub fn ensure_allowed(state: ClassState, op: WorkflowOp) -> Result<ClassState, WorkflowError> {
    let target = op.target_state();
    if can_transition(state, target, op) {
        Ok(target)
    } else {
        Err(WorkflowError::InvalidTransition { op, state })
    }
}

/// The capability snapshot evaluated by the quiz-generation guards.
///
/// `extraordinary_topic` is injected explicitly (rather than re-read from the
/// topic inside the guard) so the bypass is auditable and testable on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardContext {
    pub extraordinary_topic: bool,
    pub guide_approved: bool,
    pub guide_final: bool,
}

/// Guards quiz generation per the workflow rules:
/// a diagnostic quiz requires an approved guide, a summative quiz requires a
/// final guide, and an extraordinary/temporary topic bypasses the guard
/// entirely, including the state-ordering requirement.
pub fn check_quiz_generation(
    kind: QuizKind,
    state: ClassState,
    ctx: &GuardContext,
) -> Result<(), WorkflowError> {
    if ctx.extraordinary_topic {
        return Ok(());
    }
    let op = match kind {
        QuizKind::Pre => WorkflowOp::GeneratePreQuiz,
        QuizKind::Post => WorkflowOp::GeneratePostQuiz,
    };
    ensure_allowed(state, op)?;
    match kind {
        QuizKind::Pre if !ctx.guide_approved => Err(WorkflowError::GuideNotApproved),
        QuizKind::Post if !ctx.guide_final => Err(WorkflowError::GuideNotFinal),
        _ => Ok(()),
    }
}
