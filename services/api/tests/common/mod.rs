//! Shared test fixtures: in-memory implementations of the `DatabaseService`
//! and `TextGenerationService` ports, seeding helpers, and canned generation
//! replies.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use api_lib::config::Config;
use api_lib::web::state::AppState;
use classflow_core::domain::{
    ActivityBlock, ClassSession, Feedback, GuideVersion, Question, QuestionKind, QuestionOption,
    Quiz, QuizKind, QuizResponse, QuizState, Recommendation, ResponseDetail, Student, StudentGroup,
    Teacher, Topic,
};
use classflow_core::ports::{
    DatabaseService, Generation, GenerationError, GenerationRequest, PortError, PortResult,
    TextGenerationService,
};
use classflow_core::workflow::ClassState;

//=========================================================================================
// In-memory DatabaseService
//=========================================================================================

#[derive(Default)]
struct Inner {
    auth_sessions: HashMap<String, Uuid>,
    teachers: Vec<Teacher>,
    topics: HashMap<Uuid, Topic>,
    groups: HashMap<Uuid, StudentGroup>,
    students: HashMap<Uuid, Student>,
    classes: HashMap<Uuid, ClassSession>,
    guide_versions: HashMap<Uuid, GuideVersion>,
    quizzes: HashMap<Uuid, Quiz>,
    questions: HashMap<Uuid, Question>,
    responses: HashMap<Uuid, QuizResponse>,
    details: Vec<ResponseDetail>,
    recommendations: HashMap<Uuid, Recommendation>,
    feedback: Vec<Feedback>,
}

#[derive(Default)]
pub struct MockDb {
    inner: Mutex<Inner>,
}

impl MockDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // --- Seeding ---

    pub fn seed_teacher(&self) -> Teacher {
        let teacher = Teacher {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: "Alex Rivera".to_string(),
        };
        self.inner.lock().unwrap().teachers.push(teacher.clone());
        teacher
    }

    pub fn seed_topic(&self, extraordinary: bool) -> Topic {
        let topic = Topic {
            id: Uuid::new_v4(),
            name: "Photosynthesis".to_string(),
            description: Some("How plants turn light into energy".to_string()),
            grade_level: Some("7th grade".to_string()),
            extraordinary,
        };
        self.inner
            .lock()
            .unwrap()
            .topics
            .insert(topic.id, topic.clone());
        topic
    }

    pub fn seed_group_with_students(&self, count: usize) -> (StudentGroup, Vec<Student>) {
        let group = StudentGroup {
            id: Uuid::new_v4(),
            name: "7-B".to_string(),
            grade_level: Some("7th grade".to_string()),
        };
        let students: Vec<Student> = (0..count)
            .map(|i| Student {
                id: Uuid::new_v4(),
                group_id: group.id,
                full_name: format!("Student {}", i + 1),
            })
            .collect();
        let mut inner = self.inner.lock().unwrap();
        inner.groups.insert(group.id, group.clone());
        for student in &students {
            inner.students.insert(student.id, student.clone());
        }
        (group, students)
    }

    pub fn seed_class(
        &self,
        teacher: &Teacher,
        topic: &Topic,
        group: &StudentGroup,
        state: ClassState,
    ) -> ClassSession {
        let now = Utc::now();
        let class = ClassSession {
            id: Uuid::new_v4(),
            teacher_id: teacher.id,
            topic_id: topic.id,
            group_id: group.id,
            scheduled_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            duration_minutes: 60,
            method_tags: vec!["socratic".to_string(), "group-work".to_string()],
            pedagogical_context: Some("First exposure to the topic".to_string()),
            state,
            active_guide_version: None,
            template_id: None,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .unwrap()
            .classes
            .insert(class.id, class.clone());
        class
    }

    pub fn seed_guide_version(
        &self,
        class_id: Uuid,
        version_number: i32,
        approved: bool,
        is_final: bool,
    ) -> GuideVersion {
        let version = GuideVersion {
            id: Uuid::new_v4(),
            class_id,
            version_number,
            objectives: vec!["Explain the light reactions".to_string()],
            structure: vec![ActivityBlock {
                duration_minutes: 60,
                activity: "Guided inquiry".to_string(),
                description: "Leaf observation stations".to_string(),
            }],
            guiding_questions: vec!["Why are leaves green?".to_string()],
            generation_context: None,
            approved,
            approved_at: approved.then(Utc::now),
            approved_by: None,
            is_final,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.guide_versions.insert(version.id, version.clone());
        if let Some(class) = inner.classes.get_mut(&class_id) {
            class.active_guide_version = Some(version.id);
        }
        version
    }

    pub fn seed_quiz(&self, class_id: Uuid, kind: QuizKind, state: QuizState) -> Quiz {
        let quiz = Quiz {
            id: Uuid::new_v4(),
            class_id,
            kind,
            title: "Seeded quiz".to_string(),
            state,
            time_limit_minutes: if kind == QuizKind::Pre { 5 } else { 15 },
            reading: (kind == QuizKind::Pre).then(|| "A seeded reading passage.".to_string()),
            published_at: (state == QuizState::Published).then(Utc::now),
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.quizzes.insert(quiz.id, quiz.clone());
        drop(inner);

        for seq in 1..=3 {
            self.seed_question(quiz.id, seq);
        }
        quiz
    }

    pub fn seed_question(&self, quiz_id: Uuid, seq: i32) -> Question {
        let options: Vec<QuestionOption> = ["Red", "Green", "Blue", "Yellow"]
            .iter()
            .map(|label| QuestionOption {
                id: Uuid::new_v4().to_string(),
                label: label.to_string(),
            })
            .collect();
        let question = Question {
            id: Uuid::new_v4(),
            quiz_id,
            seq,
            prompt: format!("Seeded question {seq}"),
            kind: QuestionKind::MultipleChoice,
            answer: options[1].id.clone(),
            options,
            feedback: None,
            reading: None,
        };
        self.inner
            .lock()
            .unwrap()
            .questions
            .insert(question.id, question.clone());
        question
    }

    pub fn seed_completed_response(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
        correct_flags: &[bool],
    ) -> QuizResponse {
        let questions = {
            let inner = self.inner.lock().unwrap();
            let mut qs: Vec<Question> = inner
                .questions
                .values()
                .filter(|q| q.quiz_id == quiz_id)
                .cloned()
                .collect();
            qs.sort_by_key(|q| q.seq);
            qs
        };

        let correct = correct_flags.iter().filter(|c| **c).count();
        let percent = if correct_flags.is_empty() {
            0.0
        } else {
            correct as f64 / correct_flags.len() as f64 * 100.0
        };
        let response = QuizResponse {
            id: Uuid::new_v4(),
            quiz_id,
            student_id,
            completed: true,
            score: percent / 10.0,
            percent_correct: percent,
            submitted_at: Some(Utc::now()),
        };

        let mut inner = self.inner.lock().unwrap();
        inner.responses.insert(response.id, response.clone());
        for (question, is_correct) in questions.iter().zip(correct_flags) {
            inner.details.push(ResponseDetail {
                id: Uuid::new_v4(),
                response_id: response.id,
                question_id: question.id,
                submitted_value: Some("submitted".to_string()),
                is_correct: *is_correct,
                time_spent_seconds: Some(25),
            });
        }
        response
    }

    pub fn seed_recommendation(&self, class_id: Uuid, quiz_id: Option<Uuid>) -> Recommendation {
        let rec = Recommendation {
            id: Uuid::new_v4(),
            class_id,
            quiz_id,
            title: "Review prerequisites".to_string(),
            description: "Most students missed the vocabulary questions".to_string(),
            priority: "high".to_string(),
            area: "prerequisites".to_string(),
            applied: false,
            applied_version: None,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .recommendations
            .insert(rec.id, rec.clone());
        rec
    }

    // --- Inspection ---

    pub fn class_state(&self, class_id: Uuid) -> ClassState {
        self.inner.lock().unwrap().classes[&class_id].state
    }

    pub fn class(&self, class_id: Uuid) -> ClassSession {
        self.inner.lock().unwrap().classes[&class_id].clone()
    }

    pub fn guide_version(&self, version_id: Uuid) -> GuideVersion {
        self.inner.lock().unwrap().guide_versions[&version_id].clone()
    }

    pub fn quiz(&self, quiz_id: Uuid) -> Quiz {
        self.inner.lock().unwrap().quizzes[&quiz_id].clone()
    }

    pub fn quiz_count(&self) -> usize {
        self.inner.lock().unwrap().quizzes.len()
    }

    pub fn questions_for(&self, quiz_id: Uuid) -> Vec<Question> {
        let inner = self.inner.lock().unwrap();
        let mut questions: Vec<Question> = inner
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.seq);
        questions
    }

    pub fn recommendations_for(&self, class_id: Uuid) -> Vec<Recommendation> {
        self.inner
            .lock()
            .unwrap()
            .recommendations
            .values()
            .filter(|r| r.class_id == class_id)
            .cloned()
            .collect()
    }

    pub fn recommendation(&self, id: Uuid) -> Recommendation {
        self.inner.lock().unwrap().recommendations[&id].clone()
    }

    pub fn feedback_rows(&self) -> Vec<Feedback> {
        self.inner.lock().unwrap().feedback.clone()
    }
}

#[async_trait]
impl DatabaseService for MockDb {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.inner
            .lock()
            .unwrap()
            .auth_sessions
            .get(session_id)
            .copied()
            .ok_or(PortError::Unauthorized)
    }

    async fn get_teacher_by_user_id(&self, user_id: Uuid) -> PortResult<Teacher> {
        self.inner
            .lock()
            .unwrap()
            .teachers
            .iter()
            .find(|t| t.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Teacher for user {user_id} not found")))
    }

    async fn get_topic(&self, topic_id: Uuid) -> PortResult<Topic> {
        self.inner
            .lock()
            .unwrap()
            .topics
            .get(&topic_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Topic {topic_id} not found")))
    }

    async fn create_topic(&self, topic: Topic) -> PortResult<Topic> {
        self.inner
            .lock()
            .unwrap()
            .topics
            .insert(topic.id, topic.clone());
        Ok(topic)
    }

    async fn get_group(&self, group_id: Uuid) -> PortResult<StudentGroup> {
        self.inner
            .lock()
            .unwrap()
            .groups
            .get(&group_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Group {group_id} not found")))
    }

    async fn get_students_for_group(&self, group_id: Uuid) -> PortResult<Vec<Student>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .students
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn create_class(&self, class: ClassSession) -> PortResult<ClassSession> {
        self.inner
            .lock()
            .unwrap()
            .classes
            .insert(class.id, class.clone());
        Ok(class)
    }

    async fn get_class(&self, class_id: Uuid) -> PortResult<ClassSession> {
        self.inner
            .lock()
            .unwrap()
            .classes
            .get(&class_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Class {class_id} not found")))
    }

    async fn update_class_state(&self, class_id: Uuid, state: ClassState) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let class = inner
            .classes
            .get_mut(&class_id)
            .ok_or_else(|| PortError::NotFound(format!("Class {class_id} not found")))?;
        class.state = state;
        class.updated_at = Utc::now();
        Ok(())
    }

    async fn set_active_guide_version(&self, class_id: Uuid, version_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let class = inner
            .classes
            .get_mut(&class_id)
            .ok_or_else(|| PortError::NotFound(format!("Class {class_id} not found")))?;
        class.active_guide_version = Some(version_id);
        Ok(())
    }

    async fn create_guide_version(&self, version: GuideVersion) -> PortResult<GuideVersion> {
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner.guide_versions.values().any(|v| {
            v.class_id == version.class_id && v.version_number == version.version_number
        });
        if duplicate {
            return Err(PortError::Conflict(format!(
                "guide version {} for class {} already exists",
                version.version_number, version.class_id
            )));
        }
        inner.guide_versions.insert(version.id, version.clone());
        Ok(version)
    }

    async fn get_guide_version(&self, version_id: Uuid) -> PortResult<GuideVersion> {
        self.inner
            .lock()
            .unwrap()
            .guide_versions
            .get(&version_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Guide version {version_id} not found")))
    }

    async fn latest_guide_version_number(&self, class_id: Uuid) -> PortResult<i32> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .guide_versions
            .values()
            .filter(|v| v.class_id == class_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0))
    }

    async fn approve_guide_version(
        &self,
        version_id: Uuid,
        approved_by: Uuid,
        approved_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let version = inner
            .guide_versions
            .get_mut(&version_id)
            .ok_or_else(|| PortError::NotFound(format!("Guide version {version_id} not found")))?;
        version.approved = true;
        version.approved_at = Some(approved_at);
        version.approved_by = Some(approved_by);
        Ok(())
    }

    async fn create_quiz_with_questions(
        &self,
        quiz: Quiz,
        questions: Vec<Question>,
    ) -> PortResult<Quiz> {
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner
            .quizzes
            .values()
            .any(|q| q.class_id == quiz.class_id && q.kind == quiz.kind);
        if duplicate {
            return Err(PortError::Conflict(format!(
                "a {} quiz already exists for class {}",
                quiz.kind.as_str(),
                quiz.class_id
            )));
        }
        inner.quizzes.insert(quiz.id, quiz.clone());
        for question in questions {
            inner.questions.insert(question.id, question);
        }
        Ok(quiz)
    }

    async fn get_quiz(&self, quiz_id: Uuid) -> PortResult<Quiz> {
        self.inner
            .lock()
            .unwrap()
            .quizzes
            .get(&quiz_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Quiz {quiz_id} not found")))
    }

    async fn find_quiz_for_class(
        &self,
        class_id: Uuid,
        kind: QuizKind,
    ) -> PortResult<Option<Quiz>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .quizzes
            .values()
            .find(|q| q.class_id == class_id && q.kind == kind)
            .cloned())
    }

    async fn mark_quiz_published(&self, quiz_id: Uuid, at: DateTime<Utc>) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let quiz = inner
            .quizzes
            .get_mut(&quiz_id)
            .ok_or_else(|| PortError::NotFound(format!("Quiz {quiz_id} not found")))?;
        if quiz.published_at.is_some() {
            return Err(PortError::Conflict(format!(
                "quiz {quiz_id} is already published"
            )));
        }
        quiz.state = QuizState::Published;
        quiz.published_at = Some(at);
        Ok(())
    }

    async fn update_quiz_reading(&self, quiz_id: Uuid, reading: &str) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let quiz = inner
            .quizzes
            .get_mut(&quiz_id)
            .ok_or_else(|| PortError::NotFound(format!("Quiz {quiz_id} not found")))?;
        quiz.reading = Some(reading.to_string());
        for question in inner.questions.values_mut() {
            if question.quiz_id == quiz_id {
                question.reading = Some(reading.to_string());
            }
        }
        Ok(())
    }

    async fn get_questions(&self, quiz_id: Uuid) -> PortResult<Vec<Question>> {
        Ok(self.questions_for(quiz_id))
    }

    async fn get_question(&self, question_id: Uuid) -> PortResult<Question> {
        self.inner
            .lock()
            .unwrap()
            .questions
            .get(&question_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Question {question_id} not found")))
    }

    async fn update_question(&self, question: &Question) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.questions.contains_key(&question.id) {
            return Err(PortError::NotFound(format!(
                "Question {} not found",
                question.id
            )));
        }
        inner.questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn replace_questions(
        &self,
        quiz_id: Uuid,
        questions: Vec<Question>,
    ) -> PortResult<Vec<Question>> {
        let mut inner = self.inner.lock().unwrap();
        inner.questions.retain(|_, q| q.quiz_id != quiz_id);
        for question in &questions {
            inner.questions.insert(question.id, question.clone());
        }
        Ok(questions)
    }

    async fn get_completed_responses(&self, quiz_id: Uuid) -> PortResult<Vec<QuizResponse>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .responses
            .values()
            .filter(|r| r.quiz_id == quiz_id && r.completed)
            .cloned()
            .collect())
    }

    async fn get_response_details(&self, response_id: Uuid) -> PortResult<Vec<ResponseDetail>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .details
            .iter()
            .filter(|d| d.response_id == response_id)
            .cloned()
            .collect())
    }

    async fn insert_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> PortResult<Vec<Recommendation>> {
        let mut inner = self.inner.lock().unwrap();
        for rec in &recommendations {
            inner.recommendations.insert(rec.id, rec.clone());
        }
        Ok(recommendations)
    }

    async fn get_recommendations_by_ids(&self, ids: &[Uuid]) -> PortResult<Vec<Recommendation>> {
        let inner = self.inner.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| inner.recommendations.get(id).cloned())
            .collect())
    }

    async fn get_unapplied_recommendations(
        &self,
        class_id: Uuid,
    ) -> PortResult<Vec<Recommendation>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .recommendations
            .values()
            .filter(|r| r.class_id == class_id && !r.applied)
            .cloned()
            .collect())
    }

    async fn mark_recommendations_applied(
        &self,
        ids: &[Uuid],
        version_id: Uuid,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for id in ids {
            if let Some(rec) = inner.recommendations.get_mut(id) {
                if !rec.applied {
                    rec.applied = true;
                    rec.applied_version = Some(version_id);
                }
            }
        }
        Ok(())
    }

    async fn insert_feedback(&self, feedback: Feedback) -> PortResult<()> {
        self.inner.lock().unwrap().feedback.push(feedback);
        Ok(())
    }
}

//=========================================================================================
// Scripted TextGenerationService
//=========================================================================================

#[derive(Default)]
pub struct MockLlm {
    queue: Mutex<VecDeque<Result<String, GenerationError>>>,
}

impl MockLlm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.queue.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn push_error(&self, error: GenerationError) {
        self.queue.lock().unwrap().push_back(Err(error));
    }
}

#[async_trait]
impl TextGenerationService for MockLlm {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Generation, GenerationError> {
        match self.queue.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(Generation {
                text,
                model: "mock-model".to_string(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }),
            Some(Err(error)) => Err(error),
            None => Err(GenerationError::Transport(
                "mock generation queue exhausted".to_string(),
            )),
        }
    }
}

//=========================================================================================
// State Construction and Canned Replies
//=========================================================================================

pub fn test_state(db: Arc<MockDb>, llm: Arc<MockLlm>) -> AppState {
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        openai_api_key: None,
        generation_model: "mock-model".to_string(),
        feedback_model: "mock-model".to_string(),
    };
    AppState {
        db,
        config: Arc::new(config),
        llm: llm.clone(),
        feedback_llm: llm,
    }
}

fn mc_question_json(prompt: &str) -> String {
    format!(
        r#"{{"prompt": "{prompt}", "kind": "multiple_choice",
            "options": ["Chlorophyll", "Hemoglobin", "Keratin", "Melanin"],
            "correct_option": 0, "feedback": "Chlorophyll absorbs light."}}"#
    )
}

fn open_question_json(prompt: &str) -> String {
    format!(
        r#"{{"prompt": "{prompt}", "kind": "open_response",
            "expected_answer": "Plants convert light energy into glucose.",
            "feedback": "Look for energy conversion."}}"#
    )
}

pub fn guide_reply() -> String {
    r#"{
        "objectives": ["Describe the inputs of photosynthesis", "Relate light to plant growth"],
        "structure": [
            {"duration_minutes": 15, "activity": "Warm-up discussion", "description": "What do plants eat?"},
            {"duration_minutes": 30, "activity": "Leaf lab", "description": "Observe leaves under light"},
            {"duration_minutes": 15, "activity": "Exit ticket", "description": "One-sentence summary"}
        ],
        "guiding_questions": ["Why are leaves green?", "Where does the sugar go?"]
    }"#
    .to_string()
}

pub fn pre_quiz_reply() -> String {
    let questions: Vec<String> = (1..=3)
        .map(|i| mc_question_json(&format!("Diagnostic question {i}")))
        .collect();
    format!(
        r#"{{"title": "Photosynthesis warm-up", "reading": "{}", "questions": [{}]}}"#,
        "Plants capture sunlight with a green pigment. ".repeat(25).trim(),
        questions.join(",")
    )
}

pub fn post_quiz_reply(count: usize) -> String {
    let questions: Vec<String> = (1..=count)
        .map(|i| {
            if i % 3 == 0 {
                open_question_json(&format!("Apply concept {i}"))
            } else {
                mc_question_json(&format!("Summative question {i}"))
            }
        })
        .collect();
    format!(
        r#"{{"title": "Photosynthesis mastery", "questions": [{}]}}"#,
        questions.join(",")
    )
}

pub fn analysis_reply() -> String {
    r#"{
        "recommendations": [
            {"title": "Reteach vocabulary", "description": "Both students missed the pigment question", "priority": "high", "area": "prerequisites"},
            {"title": "Add a diagram activity", "description": "Visual learners struggled", "priority": "medium", "area": "structure"}
        ],
        "summary": "The group starts with weak vocabulary but decent intuition."
    }"#
    .to_string()
}

pub fn rewrite_reply() -> String {
    r#"{
        "objectives": ["Define the key vocabulary", "Describe the inputs of photosynthesis"],
        "structure": [
            {"duration_minutes": 10, "activity": "Vocabulary review", "description": "Card matching"},
            {"duration_minutes": 35, "activity": "Leaf lab", "description": "Observe leaves under light"},
            {"duration_minutes": 15, "activity": "Exit ticket", "description": "One-sentence summary"}
        ],
        "guiding_questions": ["What does chlorophyll do?", "Where does the sugar go?"]
    }"#
    .to_string()
}

pub fn feedback_reply() -> String {
    r#"{
        "strengths": ["Strong grasp of vocabulary"],
        "growth_areas": ["Applying concepts to new plants"],
        "motivational_message": "You are building a solid foundation.",
        "suggestions": ["Re-read the leaf lab notes"]
    }"#
    .to_string()
}

pub fn single_question_reply(prompt: &str) -> String {
    mc_question_json(prompt)
}
