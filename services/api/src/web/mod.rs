//! services/api/src/web/mod.rs
//!
//! The web surface: handlers per workflow component, shared state, the auth
//! middleware, and the master OpenAPI definition.

pub mod classes;
pub mod feedback;
pub mod guides;
pub mod middleware;
pub mod principal;
pub mod quizzes;
pub mod remediation;
pub mod state;

pub use middleware::require_auth;

use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        classes::create_class_handler,
        classes::class_detail_handler,
        guides::generate_guide_handler,
        guides::approve_guide_handler,
        quizzes::generate_quiz_handler,
        quizzes::publish_quiz_handler,
        quizzes::edit_reading_handler,
        quizzes::edit_question_handler,
        quizzes::regenerate_questions_handler,
        quizzes::modify_question_handler,
        remediation::process_pre_quiz_handler,
        remediation::apply_recommendations_handler,
        feedback::generate_feedback_handler,
    ),
    components(
        schemas(
            classes::AdHocTopic,
            classes::CreateClassRequest,
            classes::CreateClassResponse,
            classes::GuideSummaryPayload,
            classes::ClassDetailResponse,
            guides::GenerateGuideRequest,
            guides::GenerateGuideResponse,
            guides::ActivityBlockPayload,
            guides::ApproveGuideRequest,
            guides::ApproveGuideResponse,
            quizzes::GenerateQuizRequest,
            quizzes::GenerateQuizResponse,
            quizzes::OptionPayload,
            quizzes::QuestionPayload,
            quizzes::PublishQuizRequest,
            quizzes::PublishQuizResponse,
            quizzes::EditReadingRequest,
            quizzes::EditQuestionRequest,
            quizzes::EditOptionPayload,
            quizzes::RegenerateQuestionsRequest,
            quizzes::RegenerateQuestionsResponse,
            quizzes::ModifyQuestionRequest,
            quizzes::ModifyQuestionResponse,
            remediation::ProcessPreQuizRequest,
            remediation::ProcessPreQuizResponse,
            remediation::QuizStatsPayload,
            remediation::QuestionAccuracyPayload,
            remediation::RecommendationPayload,
            remediation::ManualEdits,
            remediation::ManualActivityBlock,
            remediation::ApplyRecommendationsRequest,
            remediation::ApplyRecommendationsResponse,
            feedback::GenerateFeedbackRequest,
            feedback::GenerateFeedbackResponse,
            feedback::FeedbackBreakdown,
            feedback::FeedbackFailurePayload,
        )
    ),
    tags(
        (name = "Class Workflow API", description = "Class preparation and assessment workflow endpoints.")
    )
)]
pub struct ApiDoc;
