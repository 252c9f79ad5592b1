//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use classflow_core::domain::{
    ActivityBlock, ClassSession, Feedback, GuideVersion, Question, QuestionOption, Quiz, QuizKind,
    QuizResponse, Recommendation, ResponseDetail, Student, StudentGroup, Teacher, Topic,
};
use classflow_core::ports::{DatabaseService, PortError, PortResult};
use classflow_core::workflow::ClassState;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(what: &str, id: impl std::fmt::Display) -> impl FnOnce(sqlx::Error) -> PortError {
    let msg = format!("{what} {id} not found");
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(msg),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct TeacherRecord {
    id: Uuid,
    user_id: Uuid,
    full_name: String,
}
impl TeacherRecord {
    fn to_domain(self) -> Teacher {
        Teacher {
            id: self.id,
            user_id: self.user_id,
            full_name: self.full_name,
        }
    }
}

#[derive(FromRow)]
struct TopicRecord {
    id: Uuid,
    name: String,
    description: Option<String>,
    grade_level: Option<String>,
    extraordinary: bool,
}
impl TopicRecord {
    fn to_domain(self) -> Topic {
        Topic {
            id: self.id,
            name: self.name,
            description: self.description,
            grade_level: self.grade_level,
            extraordinary: self.extraordinary,
        }
    }
}

#[derive(FromRow)]
struct GroupRecord {
    id: Uuid,
    name: String,
    grade_level: Option<String>,
}
impl GroupRecord {
    fn to_domain(self) -> StudentGroup {
        StudentGroup {
            id: self.id,
            name: self.name,
            grade_level: self.grade_level,
        }
    }
}

#[derive(FromRow)]
struct StudentRecord {
    id: Uuid,
    group_id: Uuid,
    full_name: String,
}
impl StudentRecord {
    fn to_domain(self) -> Student {
        Student {
            id: self.id,
            group_id: self.group_id,
            full_name: self.full_name,
        }
    }
}

#[derive(FromRow)]
struct ClassRecord {
    id: Uuid,
    teacher_id: Uuid,
    topic_id: Uuid,
    group_id: Uuid,
    scheduled_date: NaiveDate,
    duration_minutes: i32,
    method_tags: Vec<String>,
    pedagogical_context: Option<String>,
    state: String,
    active_guide_version: Option<Uuid>,
    template_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl ClassRecord {
    fn to_domain(self) -> PortResult<ClassSession> {
        let state = self
            .state
            .parse::<ClassState>()
            .map_err(PortError::Unexpected)?;
        Ok(ClassSession {
            id: self.id,
            teacher_id: self.teacher_id,
            topic_id: self.topic_id,
            group_id: self.group_id,
            scheduled_date: self.scheduled_date,
            duration_minutes: self.duration_minutes,
            method_tags: self.method_tags,
            pedagogical_context: self.pedagogical_context,
            state,
            active_guide_version: self.active_guide_version,
            template_id: self.template_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct GuideVersionRecord {
    id: Uuid,
    class_id: Uuid,
    version_number: i32,
    objectives: Json<Vec<String>>,
    structure: Json<Vec<ActivityBlock>>,
    guiding_questions: Json<Vec<String>>,
    generation_context: Option<String>,
    approved: bool,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<Uuid>,
    is_final: bool,
    created_at: DateTime<Utc>,
}
impl GuideVersionRecord {
    fn to_domain(self) -> GuideVersion {
        GuideVersion {
            id: self.id,
            class_id: self.class_id,
            version_number: self.version_number,
            objectives: self.objectives.0,
            structure: self.structure.0,
            guiding_questions: self.guiding_questions.0,
            generation_context: self.generation_context,
            approved: self.approved,
            approved_at: self.approved_at,
            approved_by: self.approved_by,
            is_final: self.is_final,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct QuizRecord {
    id: Uuid,
    class_id: Uuid,
    kind: String,
    title: String,
    state: String,
    time_limit_minutes: i32,
    reading: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}
impl QuizRecord {
    fn to_domain(self) -> PortResult<Quiz> {
        Ok(Quiz {
            id: self.id,
            class_id: self.class_id,
            kind: self.kind.parse().map_err(PortError::Unexpected)?,
            title: self.title,
            state: self.state.parse().map_err(PortError::Unexpected)?,
            time_limit_minutes: self.time_limit_minutes,
            reading: self.reading,
            published_at: self.published_at,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct QuestionRecord {
    id: Uuid,
    quiz_id: Uuid,
    seq: i32,
    prompt: String,
    kind: String,
    options: Json<Vec<QuestionOption>>,
    answer: String,
    feedback: Option<String>,
    reading: Option<String>,
}
impl QuestionRecord {
    fn to_domain(self) -> PortResult<Question> {
        Ok(Question {
            id: self.id,
            quiz_id: self.quiz_id,
            seq: self.seq,
            prompt: self.prompt,
            kind: self.kind.parse().map_err(PortError::Unexpected)?,
            options: self.options.0,
            answer: self.answer,
            feedback: self.feedback,
            reading: self.reading,
        })
    }
}

#[derive(FromRow)]
struct ResponseRecord {
    id: Uuid,
    quiz_id: Uuid,
    student_id: Uuid,
    completed: bool,
    score: f64,
    percent_correct: f64,
    submitted_at: Option<DateTime<Utc>>,
}
impl ResponseRecord {
    fn to_domain(self) -> QuizResponse {
        QuizResponse {
            id: self.id,
            quiz_id: self.quiz_id,
            student_id: self.student_id,
            completed: self.completed,
            score: self.score,
            percent_correct: self.percent_correct,
            submitted_at: self.submitted_at,
        }
    }
}

#[derive(FromRow)]
struct DetailRecord {
    id: Uuid,
    response_id: Uuid,
    question_id: Uuid,
    submitted_value: Option<String>,
    is_correct: bool,
    time_spent_seconds: Option<i32>,
}
impl DetailRecord {
    fn to_domain(self) -> ResponseDetail {
        ResponseDetail {
            id: self.id,
            response_id: self.response_id,
            question_id: self.question_id,
            submitted_value: self.submitted_value,
            is_correct: self.is_correct,
            time_spent_seconds: self.time_spent_seconds,
        }
    }
}

#[derive(FromRow)]
struct RecommendationRecord {
    id: Uuid,
    class_id: Uuid,
    quiz_id: Option<Uuid>,
    title: String,
    description: String,
    priority: String,
    area: String,
    applied: bool,
    applied_version: Option<Uuid>,
    created_at: DateTime<Utc>,
}
impl RecommendationRecord {
    fn to_domain(self) -> Recommendation {
        Recommendation {
            id: self.id,
            class_id: self.class_id,
            quiz_id: self.quiz_id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            area: self.area,
            applied: self.applied,
            applied_version: self.applied_version,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(|(user_id,)| user_id).ok_or(PortError::Unauthorized)
    }

    async fn get_teacher_by_user_id(&self, user_id: Uuid) -> PortResult<Teacher> {
        let record = sqlx::query_as::<_, TeacherRecord>(
            "SELECT id, user_id, full_name FROM teachers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Teacher for user", user_id))?;
        Ok(record.to_domain())
    }

    async fn get_topic(&self, topic_id: Uuid) -> PortResult<Topic> {
        let record = sqlx::query_as::<_, TopicRecord>(
            "SELECT id, name, description, grade_level, extraordinary FROM topics WHERE id = $1",
        )
        .bind(topic_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Topic", topic_id))?;
        Ok(record.to_domain())
    }

    async fn create_topic(&self, topic: Topic) -> PortResult<Topic> {
        sqlx::query(
            "INSERT INTO topics (id, name, description, grade_level, extraordinary) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(topic.id)
        .bind(&topic.name)
        .bind(&topic.description)
        .bind(&topic.grade_level)
        .bind(topic.extraordinary)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(topic)
    }

    async fn get_group(&self, group_id: Uuid) -> PortResult<StudentGroup> {
        let record = sqlx::query_as::<_, GroupRecord>(
            "SELECT id, name, grade_level FROM student_groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Group", group_id))?;
        Ok(record.to_domain())
    }

    async fn get_students_for_group(&self, group_id: Uuid) -> PortResult<Vec<Student>> {
        let records = sqlx::query_as::<_, StudentRecord>(
            "SELECT id, group_id, full_name FROM students WHERE group_id = $1 ORDER BY full_name",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_class(&self, class: ClassSession) -> PortResult<ClassSession> {
        sqlx::query(
            "INSERT INTO class_sessions \
             (id, teacher_id, topic_id, group_id, scheduled_date, duration_minutes, \
              method_tags, pedagogical_context, state, active_guide_version, template_id, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(class.id)
        .bind(class.teacher_id)
        .bind(class.topic_id)
        .bind(class.group_id)
        .bind(class.scheduled_date)
        .bind(class.duration_minutes)
        .bind(&class.method_tags)
        .bind(&class.pedagogical_context)
        .bind(class.state.as_str())
        .bind(class.active_guide_version)
        .bind(class.template_id)
        .bind(class.created_at)
        .bind(class.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(class)
    }

    async fn get_class(&self, class_id: Uuid) -> PortResult<ClassSession> {
        let record = sqlx::query_as::<_, ClassRecord>(
            "SELECT id, teacher_id, topic_id, group_id, scheduled_date, duration_minutes, \
             method_tags, pedagogical_context, state, active_guide_version, template_id, \
             created_at, updated_at \
             FROM class_sessions WHERE id = $1",
        )
        .bind(class_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Class", class_id))?;
        record.to_domain()
    }

    async fn update_class_state(&self, class_id: Uuid, state: ClassState) -> PortResult<()> {
        sqlx::query("UPDATE class_sessions SET state = $1, updated_at = now() WHERE id = $2")
            .bind(state.as_str())
            .bind(class_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn set_active_guide_version(&self, class_id: Uuid, version_id: Uuid) -> PortResult<()> {
        sqlx::query(
            "UPDATE class_sessions SET active_guide_version = $1, updated_at = now() WHERE id = $2",
        )
        .bind(version_id)
        .bind(class_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn create_guide_version(&self, version: GuideVersion) -> PortResult<GuideVersion> {
        // UNIQUE(class_id, version_number) turns a concurrent writer into a
        // clean conflict instead of a duplicate version.
        sqlx::query(
            "INSERT INTO guide_versions \
             (id, class_id, version_number, objectives, structure, guiding_questions, \
              generation_context, approved, approved_at, approved_by, is_final, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(version.id)
        .bind(version.class_id)
        .bind(version.version_number)
        .bind(Json(&version.objectives))
        .bind(Json(&version.structure))
        .bind(Json(&version.guiding_questions))
        .bind(&version.generation_context)
        .bind(version.approved)
        .bind(version.approved_at)
        .bind(version.approved_by)
        .bind(version.is_final)
        .bind(version.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => PortError::Conflict(format!(
                "guide version {} for class {} already exists",
                version.version_number, version.class_id
            )),
            _ => unexpected(e),
        })?;
        Ok(version)
    }

    async fn get_guide_version(&self, version_id: Uuid) -> PortResult<GuideVersion> {
        let record = sqlx::query_as::<_, GuideVersionRecord>(
            "SELECT id, class_id, version_number, objectives, structure, guiding_questions, \
             generation_context, approved, approved_at, approved_by, is_final, created_at \
             FROM guide_versions WHERE id = $1",
        )
        .bind(version_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Guide version", version_id))?;
        Ok(record.to_domain())
    }

    async fn latest_guide_version_number(&self, class_id: Uuid) -> PortResult<i32> {
        let (max,): (Option<i32>,) = sqlx::query_as(
            "SELECT MAX(version_number) FROM guide_versions WHERE class_id = $1",
        )
        .bind(class_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(max.unwrap_or(0))
    }

    async fn approve_guide_version(
        &self,
        version_id: Uuid,
        approved_by: Uuid,
        approved_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            "UPDATE guide_versions SET approved = TRUE, approved_at = $1, approved_by = $2 \
             WHERE id = $3",
        )
        .bind(approved_at)
        .bind(approved_by)
        .bind(version_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn create_quiz_with_questions(
        &self,
        quiz: Quiz,
        questions: Vec<Question>,
    ) -> PortResult<Quiz> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO quizzes \
             (id, class_id, kind, title, state, time_limit_minutes, reading, published_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(quiz.id)
        .bind(quiz.class_id)
        .bind(quiz.kind.as_str())
        .bind(&quiz.title)
        .bind(quiz.state.as_str())
        .bind(quiz.time_limit_minutes)
        .bind(&quiz.reading)
        .bind(quiz.published_at)
        .bind(quiz.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => PortError::Conflict(format!(
                "a {} quiz already exists for class {}",
                quiz.kind.as_str(),
                quiz.class_id
            )),
            _ => unexpected(e),
        })?;

        for question in &questions {
            insert_question(&mut tx, question).await?;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(quiz)
    }

    async fn get_quiz(&self, quiz_id: Uuid) -> PortResult<Quiz> {
        let record = sqlx::query_as::<_, QuizRecord>(
            "SELECT id, class_id, kind, title, state, time_limit_minutes, reading, \
             published_at, created_at FROM quizzes WHERE id = $1",
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Quiz", quiz_id))?;
        record.to_domain()
    }

    async fn find_quiz_for_class(
        &self,
        class_id: Uuid,
        kind: QuizKind,
    ) -> PortResult<Option<Quiz>> {
        let record = sqlx::query_as::<_, QuizRecord>(
            "SELECT id, class_id, kind, title, state, time_limit_minutes, reading, \
             published_at, created_at FROM quizzes WHERE class_id = $1 AND kind = $2",
        )
        .bind(class_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn mark_quiz_published(&self, quiz_id: Uuid, at: DateTime<Utc>) -> PortResult<()> {
        // Guarded update: the publish timestamp is written exactly once.
        let result = sqlx::query(
            "UPDATE quizzes SET state = 'published', published_at = $1 \
             WHERE id = $2 AND published_at IS NULL",
        )
        .bind(at)
        .bind(quiz_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::Conflict(format!(
                "quiz {quiz_id} is already published"
            )));
        }
        Ok(())
    }

    async fn update_quiz_reading(&self, quiz_id: Uuid, reading: &str) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query("UPDATE quizzes SET reading = $1 WHERE id = $2")
            .bind(reading)
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("UPDATE questions SET reading = $1 WHERE quiz_id = $2")
            .bind(reading)
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn get_questions(&self, quiz_id: Uuid) -> PortResult<Vec<Question>> {
        let records = sqlx::query_as::<_, QuestionRecord>(
            "SELECT id, quiz_id, seq, prompt, kind, options, answer, feedback, reading \
             FROM questions WHERE quiz_id = $1 ORDER BY seq ASC",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_question(&self, question_id: Uuid) -> PortResult<Question> {
        let record = sqlx::query_as::<_, QuestionRecord>(
            "SELECT id, quiz_id, seq, prompt, kind, options, answer, feedback, reading \
             FROM questions WHERE id = $1",
        )
        .bind(question_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Question", question_id))?;
        record.to_domain()
    }

    async fn update_question(&self, question: &Question) -> PortResult<()> {
        sqlx::query(
            "UPDATE questions SET prompt = $1, kind = $2, options = $3, answer = $4, \
             feedback = $5, reading = $6 WHERE id = $7",
        )
        .bind(&question.prompt)
        .bind(question.kind.as_str())
        .bind(Json(&question.options))
        .bind(&question.answer)
        .bind(&question.feedback)
        .bind(&question.reading)
        .bind(question.id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn replace_questions(
        &self,
        quiz_id: Uuid,
        questions: Vec<Question>,
    ) -> PortResult<Vec<Question>> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        for question in &questions {
            insert_question(&mut tx, question).await?;
        }
        tx.commit().await.map_err(unexpected)?;
        Ok(questions)
    }

    async fn get_completed_responses(&self, quiz_id: Uuid) -> PortResult<Vec<QuizResponse>> {
        let records = sqlx::query_as::<_, ResponseRecord>(
            "SELECT id, quiz_id, student_id, completed, score, percent_correct, submitted_at \
             FROM quiz_responses WHERE quiz_id = $1 AND completed = TRUE",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_response_details(&self, response_id: Uuid) -> PortResult<Vec<ResponseDetail>> {
        let records = sqlx::query_as::<_, DetailRecord>(
            "SELECT id, response_id, question_id, submitted_value, is_correct, time_spent_seconds \
             FROM response_details WHERE response_id = $1",
        )
        .bind(response_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> PortResult<Vec<Recommendation>> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        for rec in &recommendations {
            sqlx::query(
                "INSERT INTO recommendations \
                 (id, class_id, quiz_id, title, description, priority, area, applied, \
                  applied_version, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(rec.id)
            .bind(rec.class_id)
            .bind(rec.quiz_id)
            .bind(&rec.title)
            .bind(&rec.description)
            .bind(&rec.priority)
            .bind(&rec.area)
            .bind(rec.applied)
            .bind(rec.applied_version)
            .bind(rec.created_at)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }
        tx.commit().await.map_err(unexpected)?;
        Ok(recommendations)
    }

    async fn get_recommendations_by_ids(&self, ids: &[Uuid]) -> PortResult<Vec<Recommendation>> {
        let records = sqlx::query_as::<_, RecommendationRecord>(
            "SELECT id, class_id, quiz_id, title, description, priority, area, applied, \
             applied_version, created_at FROM recommendations WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_unapplied_recommendations(
        &self,
        class_id: Uuid,
    ) -> PortResult<Vec<Recommendation>> {
        let records = sqlx::query_as::<_, RecommendationRecord>(
            "SELECT id, class_id, quiz_id, title, description, priority, area, applied, \
             applied_version, created_at \
             FROM recommendations WHERE class_id = $1 AND applied = FALSE ORDER BY created_at",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn mark_recommendations_applied(
        &self,
        ids: &[Uuid],
        version_id: Uuid,
    ) -> PortResult<()> {
        sqlx::query(
            "UPDATE recommendations SET applied = TRUE, applied_version = $1 \
             WHERE id = ANY($2) AND applied = FALSE",
        )
        .bind(version_id)
        .bind(ids.to_vec())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_feedback(&self, feedback: Feedback) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO feedback (id, class_id, quiz_id, audience, student_id, content, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(feedback.id)
        .bind(feedback.class_id)
        .bind(feedback.quiz_id)
        .bind(feedback.audience.as_str())
        .bind(feedback.student_id)
        .bind(Json(&feedback.content))
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }
}

async fn insert_question(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    question: &Question,
) -> PortResult<()> {
    sqlx::query(
        "INSERT INTO questions (id, quiz_id, seq, prompt, kind, options, answer, feedback, reading) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(question.id)
    .bind(question.quiz_id)
    .bind(question.seq)
    .bind(&question.prompt)
    .bind(question.kind.as_str())
    .bind(Json(&question.options))
    .bind(&question.answer)
    .bind(&question.feedback)
    .bind(&question.reading)
    .execute(&mut **tx)
    .await
    .map_err(unexpected)?;
    Ok(())
}
