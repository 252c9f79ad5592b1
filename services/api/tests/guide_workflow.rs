//! End-to-end coverage of guide generation, approval, and the remediation
//! fold, driven through the in-memory ports.

mod common;

use common::{analysis_reply, guide_reply, rewrite_reply, test_state, MockDb, MockLlm};

use api_lib::error::ApiError;
use api_lib::web::guides::{
    approve_guide, generate_guide, ApproveGuideRequest, GenerateGuideRequest,
};
use api_lib::web::remediation::{
    apply_recommendations, process_pre_quiz, ApplyRecommendationsRequest, ManualEdits,
    ProcessPreQuizRequest,
};
use classflow_core::domain::{QuizKind, QuizState};
use classflow_core::workflow::ClassState;

#[tokio::test]
async fn generate_guide_creates_version_and_advances_state() {
    let db = MockDb::new();
    let llm = MockLlm::new();
    let teacher = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, _) = db.seed_group_with_students(0);
    let class = db.seed_class(&teacher, &topic, &group, ClassState::Draft);

    llm.push_text(guide_reply());
    let state = test_state(db.clone(), llm);

    let response = generate_guide(
        &state,
        &teacher,
        GenerateGuideRequest {
            class_id: class.id,
            method_tags: vec!["inquiry".to_string()],
            extra_context: Some("Focus on vocabulary".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.version_number, 1);
    assert_eq!(response.objectives.len(), 2);
    assert_eq!(db.class_state(class.id), ClassState::GuideEditing);

    // The active pointer references a version belonging to this class.
    let stored = db.class(class.id);
    let version = db.guide_version(stored.active_guide_version.unwrap());
    assert_eq!(version.class_id, class.id);
    assert!(!version.approved);
}

#[tokio::test]
async fn regeneration_yields_strictly_increasing_versions() {
    let db = MockDb::new();
    let llm = MockLlm::new();
    let teacher = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, _) = db.seed_group_with_students(0);
    let class = db.seed_class(&teacher, &topic, &group, ClassState::Draft);
    let state = test_state(db.clone(), llm.clone());

    let mut numbers = Vec::new();
    for _ in 0..3 {
        llm.push_text(guide_reply());
        let response = generate_guide(
            &state,
            &teacher,
            GenerateGuideRequest {
                class_id: class.id,
                method_tags: Vec::new(),
                extra_context: None,
            },
        )
        .await
        .unwrap();
        numbers.push(response.version_number);
    }

    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn generate_guide_for_foreign_class_is_not_found() {
    let db = MockDb::new();
    let llm = MockLlm::new();
    let owner = db.seed_teacher();
    let intruder = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, _) = db.seed_group_with_students(0);
    let class = db.seed_class(&owner, &topic, &group, ClassState::Draft);
    let state = test_state(db.clone(), llm);

    let err = generate_guide(
        &state,
        &intruder,
        GenerateGuideRequest {
            class_id: class.id,
            method_tags: Vec::new(),
            extra_context: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn approve_guide_marks_version_and_reports_pre_quiz() {
    let db = MockDb::new();
    let llm = MockLlm::new();
    let teacher = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, _) = db.seed_group_with_students(0);
    let class = db.seed_class(&teacher, &topic, &group, ClassState::GuideEditing);
    let version = db.seed_guide_version(class.id, 1, false, false);
    let state = test_state(db.clone(), llm);

    let response = approve_guide(
        &state,
        &teacher,
        ApproveGuideRequest {
            class_id: class.id,
            version_id: version.id,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.approved_version, 1);
    assert_eq!(response.class_state, "guide_approved");
    assert!(!response.has_pre_quiz);
    assert_eq!(db.class_state(class.id), ClassState::GuideApproved);

    let stored = db.guide_version(version.id);
    assert!(stored.approved);
    assert!(stored.approved_at.is_some());
    assert_eq!(stored.approved_by, Some(teacher.id));
}

#[tokio::test]
async fn approve_rejects_version_of_another_class() {
    let db = MockDb::new();
    let llm = MockLlm::new();
    let teacher = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, _) = db.seed_group_with_students(0);
    let class_a = db.seed_class(&teacher, &topic, &group, ClassState::GuideEditing);
    let class_b = db.seed_class(&teacher, &topic, &group, ClassState::GuideEditing);
    let foreign_version = db.seed_guide_version(class_b.id, 1, false, false);
    let state = test_state(db.clone(), llm);

    let err = approve_guide(
        &state,
        &teacher,
        ApproveGuideRequest {
            class_id: class_a.id,
            version_id: foreign_version.id,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn apply_recommendations_finalize_locks_the_guide() {
    let db = MockDb::new();
    let llm = MockLlm::new();
    let teacher = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, students) = db.seed_group_with_students(2);
    let class = db.seed_class(&teacher, &topic, &group, ClassState::PreQuizSent);
    db.seed_guide_version(class.id, 1, true, false);
    let quiz = db.seed_quiz(class.id, QuizKind::Pre, QuizState::Published);
    db.seed_completed_response(quiz.id, students[0].id, &[true, false, false]);
    db.seed_completed_response(quiz.id, students[1].id, &[true, true, false]);

    let state = test_state(db.clone(), llm.clone());

    // Analyze first so there are recommendations to fold in.
    llm.push_text(analysis_reply());
    let analysis = process_pre_quiz(
        &state,
        &teacher,
        ProcessPreQuizRequest {
            class_id: class.id,
            quiz_id: quiz.id,
        },
    )
    .await
    .unwrap();
    assert_eq!(analysis.recommendations.len(), 2);
    assert_eq!(db.class_state(class.id), ClassState::AnalyzingPreQuiz);

    let ids: Vec<_> = analysis
        .recommendations
        .iter()
        .map(|r| r.recommendation_id)
        .collect();

    llm.push_text(rewrite_reply());
    let response = apply_recommendations(
        &state,
        &teacher,
        ApplyRecommendationsRequest {
            class_id: class.id,
            recommendation_ids: ids.clone(),
            manual_edits: None,
            finalize: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.version_number, 2);
    assert!(response.is_final);
    assert_eq!(response.class_state, "final_guide");
    assert_eq!(response.applied_count, 2);
    assert_eq!(db.class_state(class.id), ClassState::FinalGuide);

    let version = db.guide_version(response.new_version_id);
    assert!(version.is_final);
    assert_eq!(version.class_id, class.id);

    // Folded recommendations are flagged and linked to the new version.
    for id in ids {
        let rec = db.recommendation(id);
        assert!(rec.applied);
        assert_eq!(rec.applied_version, Some(response.new_version_id));
    }
}

#[tokio::test]
async fn manual_edits_without_recommendations_skip_the_rewrite_call() {
    let db = MockDb::new();
    let llm = MockLlm::new();
    let teacher = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, _) = db.seed_group_with_students(0);
    let class = db.seed_class(&teacher, &topic, &group, ClassState::AnalyzingPreQuiz);
    db.seed_guide_version(class.id, 1, true, false);

    // Nothing queued on the mock: any generation call would fail the test.
    let state = test_state(db.clone(), llm);

    let response = apply_recommendations(
        &state,
        &teacher,
        ApplyRecommendationsRequest {
            class_id: class.id,
            recommendation_ids: Vec::new(),
            manual_edits: Some(ManualEdits {
                objectives: Some(vec!["Hand-written objective".to_string()]),
                structure: None,
                guiding_questions: None,
            }),
            finalize: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.version_number, 2);
    assert!(!response.is_final);
    assert_eq!(response.applied_count, 0);
    assert_eq!(db.class_state(class.id), ClassState::ModifyingGuide);

    let version = db.guide_version(response.new_version_id);
    assert_eq!(version.objectives, vec!["Hand-written objective".to_string()]);
    // Untouched fields carry over from the base version.
    assert_eq!(version.structure.len(), 1);
}

#[tokio::test]
async fn concurrent_version_writers_get_a_conflict() {
    let db = MockDb::new();
    let teacher = db.seed_teacher();
    let topic = db.seed_topic(false);
    let (group, _) = db.seed_group_with_students(0);
    let class = db.seed_class(&teacher, &topic, &group, ClassState::Draft);

    // Both writers read latest=0 and race to insert version 1; the unique
    // (class, version) pair lets exactly one win.
    let first = db.seed_guide_version(class.id, 0, false, false);
    let mut a = first.clone();
    a.id = uuid::Uuid::new_v4();
    a.version_number = 1;
    let mut b = a.clone();
    b.id = uuid::Uuid::new_v4();

    use classflow_core::ports::{DatabaseService, PortError};
    let (ra, rb) = tokio::join!(db.create_guide_version(a), db.create_guide_version(b));
    let results = [ra, rb];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(PortError::Conflict(_)))));
}
