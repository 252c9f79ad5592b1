pub mod analysis;
pub mod domain;
pub mod ports;
pub mod workflow;

pub use domain::{
    ActivityBlock, ClassSession, FanoutFailure, FanoutOutcome, Feedback, FeedbackAudience,
    GuideVersion, Question, QuestionKind, QuestionOption, Quiz, QuizKind, QuizResponse, QuizState,
    Recommendation, ResponseDetail, Student, StudentGroup, Teacher, Topic,
};
pub use ports::{
    DatabaseService, Generation, GenerationError, GenerationRequest, PortError, PortResult,
    TextGenerationService,
};
pub use workflow::{
    can_transition, check_quiz_generation, ensure_allowed, ClassState, GuardContext, WorkflowError,
    WorkflowOp,
};
